use std::collections::BTreeMap;

use chrono::Utc;
use llmapi::utils::decode_base64;
use llmapi::{ImageGenerationCall, MessageOutput, OutputEntry, ResponsesResponse};
use serde_json::{Value, json};

use crate::config::NodeConfig;
use crate::constants::{DEFAULT_IMAGE_MIME, OUTPUT_BINARY_PROPERTY};
use crate::debug_log::DebugLog;
use crate::error::PhotoEditError;
use crate::models::{BinaryData, OutputItem, PairedItem};

/// What the interpreter needs to know about the item being answered.
#[derive(Debug, Clone, Copy)]
pub struct ItemContext<'a> {
    pub item_index: usize,
    pub style: &'a str,
    pub prompt: &'a str,
    pub image_source: &'a str,
}

impl ItemContext<'_> {
    fn failure(&self, error: &PhotoEditError, extra: Value) -> OutputItem {
        let mut json = json!({
            "error": error.to_string(),
            "style": self.style,
            "success": false,
            "imageSource": self.image_source,
        });
        if let (Value::Object(map), Value::Object(extra)) = (&mut json, extra) {
            map.extend(extra);
        }
        OutputItem::failure(self.item_index, json)
    }
}

/// Maps a parsed provider reply to exactly one output item.
pub async fn interpret_response(
    ctx: &ItemContext<'_>,
    response: &ResponsesResponse,
    config: &NodeConfig,
    debug_log: &dyn DebugLog,
) -> OutputItem {
    let response_id = response.id.as_deref().unwrap_or("unknown");

    debug_log.write(
        &config.debug_log_file,
        json!({
            "executionIndex": ctx.item_index,
            "responseStructure": {
                "responseId": response.id,
                "model": response.model,
                "status": response.status,
                "outputLength": response.output_entries().len(),
                "outputTypes": response.output_types(),
            }
        }),
    )
    .await;

    if response.output_entries().is_empty() {
        tracing::warn!(item = ctx.item_index, response_id, "response has no output");
        debug_log.write(
            &config.debug_log_file,
            json!({
                "executionIndex": ctx.item_index,
                "error": "API response missing output array",
                "responseStructure": response,
            }),
        )
        .await;
        return ctx.failure(
            &PhotoEditError::MissingOutputData,
            json!({ "responseId": response_id }),
        );
    }

    let Some(call) = first_image_result(response) else {
        let output_types = response.output_types();
        tracing::warn!(item = ctx.item_index, response_id, ?output_types, "no image in response");
        debug_log.write(
            &config.debug_log_file,
            json!({
                "executionIndex": ctx.item_index,
                "error": "No image generation result found in response",
                "outputTypes": output_types,
            }),
        )
        .await;
        return ctx.failure(
            &PhotoEditError::NoImageGenerationResult {
                output_types: output_types.clone(),
            },
            json!({ "responseId": response.id, "outputTypes": output_types }),
        );
    };

    let bytes = match decode_base64(call.result.as_deref().unwrap_or_default()) {
        Ok(bytes) => bytes,
        Err(err) => {
            let error = PhotoEditError::ImageProcessing(format!("{err:#}"));
            debug_log.write(
                &config.debug_log_file,
                json!({
                    "executionIndex": ctx.item_index,
                    "error": error.to_string(),
                    "imageGenerationId": call.id,
                }),
            )
            .await;
            return ctx.failure(
                &error,
                json!({ "responseId": response.id, "errorType": error.kind() }),
            );
        }
    };

    let assistant_message = response
        .find_message()
        .and_then(MessageOutput::first_text)
        .unwrap_or_default();
    let file_name = format!(
        "edited_image_{}_{}.png",
        ctx.style,
        Utc::now().timestamp_millis()
    );

    tracing::info!(
        item = ctx.item_index,
        response_id,
        bytes = bytes.len(),
        "image generated"
    );
    debug_log.write(
        &config.debug_log_file,
        json!({
            "executionIndex": ctx.item_index,
            "message": "Successfully processed image",
            "imageSize": bytes.len(),
            "revised_prompt": call.revised_prompt,
        }),
    )
    .await;

    OutputItem {
        json: json!({
            "style": ctx.style,
            "prompt": ctx.prompt,
            "revised_prompt": call.revised_prompt.as_deref().unwrap_or_default(),
            "success": true,
            "imageSource": ctx.image_source,
            "responseId": response.id,
            "model": response.model,
            "imageGenerationId": call.id,
            "imageSize": call.size,
            "imageQuality": call.quality,
            "imageFormat": call.output_format,
            "usage": response.usage,
            "assistantMessage": assistant_message,
        }),
        binary: BTreeMap::from([(
            OUTPUT_BINARY_PROPERTY.to_string(),
            BinaryData::from_bytes(&bytes, file_name, DEFAULT_IMAGE_MIME),
        )]),
        paired_item: PairedItem {
            item: ctx.item_index,
        },
    }
}

fn first_image_result(response: &ResponsesResponse) -> Option<&ImageGenerationCall> {
    response.output_entries().iter().find_map(|entry| match entry {
        OutputEntry::ImageGenerationCall(call)
            if call.result.as_deref().is_some_and(|result| !result.trim().is_empty()) =>
        {
            Some(call)
        }
        _ => None,
    })
}

/// Transport, status or decode failure of the provider call.
pub async fn api_failure(
    ctx: &ItemContext<'_>,
    err: &anyhow::Error,
    request_url: &str,
    config: &NodeConfig,
    debug_log: &dyn DebugLog,
) -> OutputItem {
    let error = PhotoEditError::ApiRequestFailed(format!("{err:#}"));
    tracing::error!(item = ctx.item_index, url = request_url, error = %error, "api request failed");
    debug_log.write(
        &config.error_log_file,
        json!({
            "executionIndex": ctx.item_index,
            "error": error.to_string(),
            "errorStack": format!("{err:?}"),
            "requestUrl": request_url,
            "requestMethod": "POST",
        }),
    )
    .await;
    ctx.failure(&error, json!({ "errorType": error.kind() }))
}

pub async fn log_acquisition_failure(
    ctx: &ItemContext<'_>,
    error: &PhotoEditError,
    config: &NodeConfig,
    debug_log: &dyn DebugLog,
) {
    tracing::warn!(item = ctx.item_index, error = %error, "image acquisition failed");
    debug_log.write(
        &config.debug_log_file,
        json!({
            "executionIndex": ctx.item_index,
            "error": error.to_string(),
            "errorType": error.kind(),
            "imageSource": ctx.image_source,
        }),
    )
    .await;
}

/// Acquisition failure converted to an output item when the host continues
/// on failure.
pub async fn acquisition_failure(
    ctx: &ItemContext<'_>,
    error: &PhotoEditError,
    config: &NodeConfig,
    debug_log: &dyn DebugLog,
) -> OutputItem {
    log_acquisition_failure(ctx, error, config, debug_log).await;

    let extra = match error {
        PhotoEditError::MissingBinaryData { available, .. } => {
            json!({ "errorType": error.kind(), "availableProperties": available })
        }
        _ => json!({ "errorType": error.kind() }),
    };
    ctx.failure(error, extra)
}
