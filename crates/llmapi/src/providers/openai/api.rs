use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use std::sync::Arc;

use crate::types::{LLMClient, ResponsesFn, ResponsesFuture};

use super::models::{ResponsesRequest, ResponsesResponse};

const ERROR_BODY_PREVIEW: usize = 512;

pub fn responses(client: LLMClient) -> ResponsesFn {
    let http_client = Client::new();
    Arc::new(move |request: ResponsesRequest| -> ResponsesFuture {
        let client = client.clone();
        let http_client = http_client.clone();
        Box::pin(async move { send_responses_request(&http_client, &client, &request).await })
    })
}

pub async fn send_responses_request(
    http_client: &Client,
    client: &LLMClient,
    request: &ResponsesRequest,
) -> Result<ResponsesResponse> {
    let url = client.responses_url();

    let response = http_client
        .post(&url)
        .bearer_auth(client.api_key())
        .header("Content-Type", "application/json")
        .json(request)
        .send()
        .await
        .with_context(|| format!("OpenAI responses request failed ({url})"))?;

    let status = response.status();
    let response_text = response
        .text()
        .await
        .context("Failed to read OpenAI responses body")?;

    if !status.is_success() {
        return Err(anyhow!(
            "OpenAI responses failed: status {} body {}",
            status,
            preview(&response_text)
        ));
    }

    serde_json::from_str(&response_text).with_context(|| {
        format!(
            "Failed to decode OpenAI responses JSON: {}",
            preview(&response_text)
        )
    })
}

fn preview(body: &str) -> String {
    body.chars().take(ERROR_BODY_PREVIEW).collect()
}
