use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use llmapi::utils;

use crate::constants::DEFAULT_BINARY_PROPERTY;
use crate::error::PhotoEditError;
use crate::fs_utils::default_extension_for_mime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleId {
    Chibi,
    PixelArt,
    Cartoon,
}

impl StyleId {
    pub const ALL: [StyleId; 3] = [StyleId::Chibi, StyleId::PixelArt, StyleId::Cartoon];

    pub fn as_str(self) -> &'static str {
        match self {
            StyleId::Chibi => "chibi",
            StyleId::PixelArt => "pixelart",
            StyleId::Cartoon => "cartoon",
        }
    }
}

impl FromStr for StyleId {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "chibi" => Ok(StyleId::Chibi),
            "pixelart" => Ok(StyleId::PixelArt),
            "cartoon" => Ok(StyleId::Cartoon),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSource {
    Binary,
    Base64,
}

impl ImageSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSource::Binary => "binary",
            ImageSource::Base64 => "base64",
        }
    }
}

impl FromStr for ImageSource {
    type Err = PhotoEditError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "binary" => Ok(ImageSource::Binary),
            "base64" => Ok(ImageSource::Base64),
            other => Err(PhotoEditError::UnknownImageSource(other.to_string())),
        }
    }
}

/// Raw parameter values as the host hands them over for one item.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeParameters {
    pub style: String,
    pub image_source: String,
    pub binary_property_name: String,
    pub base64_image: String,
}

impl Default for NodeParameters {
    fn default() -> Self {
        Self {
            style: StyleId::Chibi.as_str().to_string(),
            image_source: ImageSource::Binary.as_str().to_string(),
            binary_property_name: DEFAULT_BINARY_PROPERTY.to_string(),
            base64_image: String::new(),
        }
    }
}

impl NodeParameters {
    pub fn binary(style: impl Into<String>, binary_property_name: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            binary_property_name: binary_property_name.into(),
            ..Default::default()
        }
    }

    pub fn base64(style: impl Into<String>, base64_image: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            image_source: ImageSource::Base64.as_str().to_string(),
            base64_image: base64_image.into(),
            ..Default::default()
        }
    }
}

/// Where the node reads its per-item parameters from.
pub trait ParameterSource {
    fn parameters(&self, item_index: usize) -> NodeParameters;
}

impl ParameterSource for NodeParameters {
    fn parameters(&self, _item_index: usize) -> NodeParameters {
        self.clone()
    }
}

impl ParameterSource for Vec<NodeParameters> {
    fn parameters(&self, item_index: usize) -> NodeParameters {
        self.get(item_index).cloned().unwrap_or_default()
    }
}

impl ParameterSource for [NodeParameters] {
    fn parameters(&self, item_index: usize) -> NodeParameters {
        self.get(item_index).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiCredentials {
    pub api_key: String,
}

impl OpenAiCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }
}

/// A binary attachment. `data` holds the base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryData {
    pub data: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<usize>,
}

impl BinaryData {
    /// Wraps raw bytes the way the host stores attachments.
    pub fn from_bytes(bytes: &[u8], file_name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        let mime_type = mime_type.into();
        Self {
            data: utils::encode_byte_to_base64(bytes),
            file_extension: default_extension_for_mime(&mime_type),
            mime_type,
            file_name: Some(file_name.into()),
            file_size: Some(bytes.len()),
        }
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        utils::decode_base64(&self.data)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InputItem {
    #[serde(default)]
    pub json: Value,
    #[serde(default)]
    pub binary: BTreeMap<String, BinaryData>,
}

impl InputItem {
    pub fn with_binary(name: impl Into<String>, binary: BinaryData) -> Self {
        let mut item = Self::default();
        item.binary.insert(name.into(), binary);
        item
    }

    pub fn binary_property_names(&self) -> Vec<String> {
        self.binary.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PairedItem {
    pub item: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputItem {
    pub json: Value,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub binary: BTreeMap<String, BinaryData>,
    pub paired_item: PairedItem,
}

impl OutputItem {
    pub fn failure(item_index: usize, json: Value) -> Self {
        Self {
            json,
            binary: BTreeMap::new(),
            paired_item: PairedItem { item: item_index },
        }
    }

    pub fn is_success(&self) -> bool {
        self.json.get("success").and_then(Value::as_bool).unwrap_or(false)
    }
}

/// The resolved source image for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct InputImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub data_uri: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parameters_default_like_the_node_form() {
        let params: NodeParameters = serde_json::from_value(json!({})).unwrap();
        assert_eq!(params, NodeParameters::default());
        assert_eq!(params.style, "chibi");
        assert_eq!(params.image_source, "binary");
        assert_eq!(params.binary_property_name, "data");
        assert!(params.base64_image.is_empty());

        let params: NodeParameters = serde_json::from_value(json!({
            "style": "cartoon",
            "imageSource": "base64",
            "base64Image": "data:image/png;base64,QQ=="
        }))
        .unwrap();
        assert_eq!(params, NodeParameters::base64("cartoon", "data:image/png;base64,QQ=="));
    }

    #[test]
    fn style_and_source_parsing() {
        assert_eq!("pixelart".parse::<StyleId>(), Ok(StyleId::PixelArt));
        assert_eq!("PixelArt".parse::<StyleId>(), Err("PixelArt".to_string()));
        assert_eq!(" cartoon".parse::<StyleId>(), Err(" cartoon".to_string()));
        assert_eq!("watercolor".parse::<StyleId>(), Err("watercolor".to_string()));
        assert_eq!("base64".parse::<ImageSource>().unwrap(), ImageSource::Base64);
        let err = "url".parse::<ImageSource>().unwrap_err();
        assert_eq!(err.to_string(), "Unknown image source: url");
    }

    #[test]
    fn binary_data_round_trips_bytes() {
        let binary = BinaryData::from_bytes(b"PNGDATA", "edited.png", "image/png");
        assert_eq!(binary.file_extension.as_deref(), Some("png"));
        assert_eq!(binary.file_size, Some(7));
        assert_eq!(binary.to_bytes().unwrap(), b"PNGDATA");
    }

    #[test]
    fn per_item_parameters_fall_back_to_defaults() {
        let params = vec![NodeParameters::binary("cartoon", "photo")];
        assert_eq!(params.parameters(0).style, "cartoon");
        assert_eq!(params.parameters(3), NodeParameters::default());
    }
}
