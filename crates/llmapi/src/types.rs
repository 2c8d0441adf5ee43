use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::providers::openai::models::{ResponsesRequest, ResponsesResponse};

#[derive(Clone, Debug)]
pub struct LLMClient {
    pub(crate) api_key: String,
    pub(crate) endpoint: String,
    pub(crate) default_model: String,
}

impl LLMClient {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            default_model: default_model.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn responses_url(&self) -> String {
        format!("{}/responses", self.endpoint.trim_end_matches('/'))
    }
}

pub type ResponsesFuture =
    Pin<Box<dyn Future<Output = anyhow::Result<ResponsesResponse>> + Send + 'static>>;

/// One call to the Responses endpoint. Cloned freely; every clone shares the
/// same underlying transport.
pub type ResponsesFn = Arc<dyn Fn(ResponsesRequest) -> ResponsesFuture + Send + Sync>;
