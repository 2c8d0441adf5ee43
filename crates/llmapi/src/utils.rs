use anyhow::{Context, Result};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD as BASE64_ENGINE};
use base64::engine::DecodePaddingMode;

/// Accepts payloads with or without `=` padding, as pasted by users.
const LENIENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

pub fn encode_byte_to_base64(bytes: &[u8]) -> String {
    BASE64_ENGINE.encode(bytes)
}

/// Decodes standard-alphabet base64, ignoring ASCII whitespace (line-wrapped
/// pastes) and missing padding.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    LENIENT_ENGINE
        .decode(compact)
        .context("Invalid base64 payload")
}

pub fn to_data_uri(mime_type: &str, data_b64: &str) -> String {
    format!("data:{mime_type};base64,{data_b64}")
}

/// Splits `data:<mime>;base64,<payload>` into header and payload. The payload
/// ends at the next comma, if any. Returns `None` when there is no comma at all.
pub fn split_data_uri(uri: &str) -> Option<(&str, &str)> {
    let (header, rest) = uri.split_once(',')?;
    let payload = rest.split(',').next().unwrap_or_default();
    Some((header, payload))
}

/// Mime type declared in a data URI header, e.g. `image/jpeg` for
/// `data:image/jpeg;base64`.
pub fn data_uri_mime(header: &str) -> Option<&str> {
    let rest = header.strip_prefix("data:")?;
    let mime = rest.split(';').next()?.trim();
    if mime.is_empty() { None } else { Some(mime) }
}
