use llmapi::utils::{self, data_uri_mime, split_data_uri};
use serde_json::json;

use crate::config::NodeConfig;
use crate::constants::{BASE64_IMAGE_PREFIX, DEFAULT_IMAGE_MIME};
use crate::debug_log::DebugLog;
use crate::error::{PhotoEditError, Result};
use crate::fs_utils::resolve_mime_type;
use crate::models::{ImageSource, InputImage, InputItem, NodeParameters};

/// Resolves the item's source image into bytes plus a data URI.
pub async fn acquire_image(
    item_index: usize,
    item: &InputItem,
    params: &NodeParameters,
    config: &NodeConfig,
    debug_log: &dyn DebugLog,
) -> Result<InputImage> {
    let source: ImageSource = params.image_source.parse()?;

    let image = match source {
        ImageSource::Binary => from_binary(item, &params.binary_property_name)?,
        ImageSource::Base64 => from_base64_string(&params.base64_image)?,
    };

    tracing::debug!(
        item = item_index,
        source = source.as_str(),
        bytes = image.bytes.len(),
        "image loaded"
    );
    debug_log.write(
        &config.debug_log_file,
        json!({
            "executionIndex": item_index,
            "message": "Image loaded",
            "imageSource": source.as_str(),
            "mimeType": image.mime_type,
            "imageBytes": image.bytes.len(),
        }),
    )
    .await;

    Ok(image)
}

fn from_binary(item: &InputItem, property: &str) -> Result<InputImage> {
    let binary = item
        .binary
        .get(property)
        .ok_or_else(|| PhotoEditError::MissingBinaryData {
            property: property.to_string(),
            available: item.binary_property_names(),
        })?;

    let bytes = binary
        .to_bytes()
        .map_err(|err| PhotoEditError::ImageProcessing(format!("{err:#}")))?;
    ensure_not_empty(&bytes)?;

    let mime_type = resolve_mime_type(
        Some(binary.mime_type.as_str()),
        std::path::Path::new(binary.file_name.as_deref().unwrap_or_default()),
    );
    let data_uri = utils::to_data_uri(&mime_type, &utils::encode_byte_to_base64(&bytes));

    Ok(InputImage {
        bytes,
        mime_type,
        data_uri,
    })
}

fn from_base64_string(value: &str) -> Result<InputImage> {
    if !value.starts_with(BASE64_IMAGE_PREFIX) {
        return Err(PhotoEditError::InvalidBase64Prefix);
    }

    let (header, payload) = split_data_uri(value).ok_or(PhotoEditError::InvalidBase64Format)?;
    if payload.trim().is_empty() {
        return Err(PhotoEditError::InvalidBase64Format);
    }

    let bytes = utils::decode_base64(payload)
        .map_err(|err| PhotoEditError::ImageProcessing(format!("{err:#}")))?;
    ensure_not_empty(&bytes)?;

    // The request carries the decoded bytes, never the raw paste.
    let mime_type = data_uri_mime(header).unwrap_or(DEFAULT_IMAGE_MIME).to_string();
    let data_uri = utils::to_data_uri(&mime_type, &utils::encode_byte_to_base64(&bytes));

    Ok(InputImage {
        bytes,
        mime_type,
        data_uri,
    })
}

fn ensure_not_empty(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(PhotoEditError::ImageProcessing("image data is empty".to_string()));
    }
    Ok(())
}
