use std::sync::Arc;

use futures::stream::{self, StreamExt};
use llmapi::{LLMClient, ResponsesFn, ResponsesRequest};

use crate::commands::acquire::acquire_image;
use crate::commands::interpret::{
    ItemContext, acquisition_failure, api_failure, interpret_response, log_acquisition_failure,
};
use crate::commands::prompts::PromptCatalog;
use crate::config::NodeConfig;
use crate::debug_log::{DebugLog, FileDebugLog};
use crate::error::{NodeOperationError, PhotoEditError};
use crate::models::{InputItem, OpenAiCredentials, OutputItem, ParameterSource};

/// The photo edit node: one output item per input item, in input order.
pub struct PhotoEditNode {
    config: NodeConfig,
    client: LLMClient,
    dispatch: ResponsesFn,
    debug_log: Arc<dyn DebugLog>,
}

impl PhotoEditNode {
    /// Node talking to the configured OpenAI endpoint and logging to files in
    /// `config.log_dir`.
    pub fn new(config: NodeConfig, credentials: &OpenAiCredentials) -> Result<Self, PhotoEditError> {
        let client = client_for(&config, credentials)?;
        let dispatch = llmapi::responses(client.clone());
        let debug_log = Arc::new(FileDebugLog::new(config.log_dir.clone()));
        Ok(Self {
            config,
            client,
            dispatch,
            debug_log,
        })
    }

    /// Node with a caller-supplied transport and log sink.
    pub fn with_parts(
        config: NodeConfig,
        credentials: &OpenAiCredentials,
        dispatch: ResponsesFn,
        debug_log: Arc<dyn DebugLog>,
    ) -> Result<Self, PhotoEditError> {
        let client = client_for(&config, credentials)?;
        Ok(Self {
            config,
            client,
            dispatch,
            debug_log,
        })
    }

    pub async fn execute<P>(
        &self,
        items: &[InputItem],
        params: &P,
    ) -> Result<Vec<OutputItem>, NodeOperationError>
    where
        P: ParameterSource + ?Sized,
    {
        tracing::info!(
            items = items.len(),
            concurrency = self.config.max_concurrent_requests,
            "executing photo edit"
        );

        let mut results = stream::iter(items.iter().enumerate())
            .map(|(item_index, item)| self.process_item(item_index, item, params))
            .buffered(self.config.max_concurrent_requests.max(1));

        let mut outputs = Vec::with_capacity(items.len());
        while let Some(result) = results.next().await {
            outputs.push(result?);
        }
        Ok(outputs)
    }

    async fn process_item<P>(
        &self,
        item_index: usize,
        item: &InputItem,
        params: &P,
    ) -> Result<OutputItem, NodeOperationError>
    where
        P: ParameterSource + ?Sized,
    {
        let params = params.parameters(item_index);
        let (_, prompt) = PromptCatalog::global().resolve(&params.style);
        let ctx = ItemContext {
            item_index,
            style: &params.style,
            prompt,
            image_source: &params.image_source,
        };

        let debug_log = self.debug_log.as_ref();
        let image = match acquire_image(item_index, item, &params, &self.config, debug_log).await {
            Ok(image) => image,
            Err(source) if self.config.continue_on_fail => {
                return Ok(acquisition_failure(&ctx, &source, &self.config, debug_log).await);
            }
            Err(source) => {
                log_acquisition_failure(&ctx, &source, &self.config, debug_log).await;
                tracing::error!(item = item_index, "stopping run");
                return Err(NodeOperationError { item_index, source });
            }
        };

        let request = ResponsesRequest::image_edit(self.client.default_model(), prompt, image.data_uri);

        let output = match (self.dispatch)(request).await {
            Ok(response) => interpret_response(&ctx, &response, &self.config, debug_log).await,
            Err(err) => {
                api_failure(&ctx, &err, &self.client.responses_url(), &self.config, debug_log).await
            }
        };
        Ok(output)
    }
}

fn client_for(config: &NodeConfig, credentials: &OpenAiCredentials) -> Result<LLMClient, PhotoEditError> {
    let api_key = credentials.api_key.trim();
    if api_key.is_empty() {
        return Err(PhotoEditError::configuration("OpenAI API key is required"));
    }

    Ok(LLMClient::new(api_key, config.base_url.as_str(), config.model.as_str()))
}
