use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const IMAGE_GENERATION_TOOL: &str = "image_generation";
pub const IMAGE_GENERATION_CALL: &str = "image_generation_call";
pub const MESSAGE_OUTPUT: &str = "message";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResponsesRequest {
    pub model: String,
    pub tools: Vec<ImageGenerationTool>,
    pub input: Vec<InputMessage>,
}

impl ResponsesRequest {
    /// A single user turn carrying the instruction and the source image, with
    /// the image generation tool enabled at low quality, 1024x1024.
    pub fn image_edit(
        model: impl Into<String>,
        prompt: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            tools: vec![ImageGenerationTool::default()],
            input: vec![InputMessage {
                role: "user".to_string(),
                content: vec![
                    InputContent::InputText {
                        text: prompt.into(),
                    },
                    InputContent::InputImage {
                        image_url: image_url.into(),
                    },
                ],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageGenerationTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub quality: String,
    pub size: String,
}

impl Default for ImageGenerationTool {
    fn default() -> Self {
        Self {
            kind: IMAGE_GENERATION_TOOL.to_string(),
            quality: "low".to_string(),
            size: "1024x1024".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InputMessage {
    pub role: String,
    pub content: Vec<InputContent>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputContent {
    InputText { text: String },
    InputImage { image_url: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponsesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<OutputEntry>>,
}

impl ResponsesResponse {
    pub fn output_entries(&self) -> &[OutputEntry] {
        self.output.as_deref().unwrap_or_default()
    }

    pub fn output_types(&self) -> Vec<String> {
        self.output_entries()
            .iter()
            .map(|entry| entry.kind().to_string())
            .collect()
    }

    pub fn find_image_generation(&self) -> Option<&ImageGenerationCall> {
        self.output_entries().iter().find_map(|entry| match entry {
            OutputEntry::ImageGenerationCall(call) => Some(call),
            _ => None,
        })
    }

    pub fn find_message(&self) -> Option<&MessageOutput> {
        self.output_entries().iter().find_map(|entry| match entry {
            OutputEntry::Message(message) => Some(message),
            _ => None,
        })
    }
}

/// One element of `output[]`, discriminated by its `type` field. Tags this
/// client does not understand are kept as `Other` instead of failing the
/// whole response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum OutputEntry {
    ImageGenerationCall(ImageGenerationCall),
    Message(MessageOutput),
    Other { kind: String, raw: Value },
}

impl OutputEntry {
    pub fn kind(&self) -> &str {
        match self {
            OutputEntry::ImageGenerationCall(_) => IMAGE_GENERATION_CALL,
            OutputEntry::Message(_) => MESSAGE_OUTPUT,
            OutputEntry::Other { kind, .. } => kind,
        }
    }
}

impl TryFrom<Value> for OutputEntry {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match kind.as_str() {
            IMAGE_GENERATION_CALL => serde_json::from_value(value).map(OutputEntry::ImageGenerationCall),
            MESSAGE_OUTPUT => serde_json::from_value(value).map(OutputEntry::Message),
            _ => Ok(OutputEntry::Other { kind, raw: value }),
        }
    }
}

impl From<OutputEntry> for Value {
    fn from(entry: OutputEntry) -> Self {
        let tagged = |kind: &str, body: Result<Value, serde_json::Error>| {
            let mut body = body.unwrap_or_default();
            if let Value::Object(map) = &mut body {
                map.insert("type".to_string(), Value::String(kind.to_string()));
            }
            body
        };

        match entry {
            OutputEntry::ImageGenerationCall(call) => {
                tagged(IMAGE_GENERATION_CALL, serde_json::to_value(call))
            }
            OutputEntry::Message(message) => tagged(MESSAGE_OUTPUT, serde_json::to_value(message)),
            OutputEntry::Other { raw, .. } => raw,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageGenerationCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Base64 image bytes. Omitted from serialized output to keep debug
    /// records small.
    #[serde(default, skip_serializing)]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revised_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

impl MessageOutput {
    pub fn first_text(&self) -> Option<&str> {
        self.content.first().and_then(|part| part.text.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}
