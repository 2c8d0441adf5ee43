use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhotoEditError {
    #[error("No binary data found with property name: {property}. Available properties: {}", available.join(", "))]
    MissingBinaryData {
        property: String,
        available: Vec<String>,
    },

    #[error("Base64 image must start with \"data:image/\" prefix (e.g., data:image/jpeg;base64,...)")]
    InvalidBase64Prefix,

    #[error("Invalid base64 format. Expected format: data:image/jpeg;base64,<base64-data>")]
    InvalidBase64Format,

    #[error("Error processing image: {0}")]
    ImageProcessing(String),

    #[error("Unknown image source: {0}")]
    UnknownImageSource(String),

    #[error("API response missing output data")]
    MissingOutputData,

    #[error("No image generation result found in API response")]
    NoImageGenerationResult { output_types: Vec<String> },

    #[error("{0}")]
    ApiRequestFailed(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PhotoEditError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingBinaryData { .. } => "MissingBinaryData",
            Self::InvalidBase64Prefix => "InvalidBase64Prefix",
            Self::InvalidBase64Format => "InvalidBase64Format",
            Self::ImageProcessing(_) => "ImageProcessingError",
            Self::UnknownImageSource(_) => "UnknownImageSource",
            Self::MissingOutputData => "MissingOutputData",
            Self::NoImageGenerationResult { .. } => "NoImageGenerationResult",
            Self::ApiRequestFailed(_) => "api_request_failed",
            Self::Configuration(_) => "ConfigurationError",
            Self::Io(_) => "IoError",
        }
    }

    /// Errors raised while locating the input image, before any request is
    /// built.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::MissingBinaryData { .. }
                | Self::InvalidBase64Prefix
                | Self::InvalidBase64Format
                | Self::ImageProcessing(_)
                | Self::UnknownImageSource(_)
        )
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}

/// Acquisition failure surfaced to the host when it does not continue on
/// failure.
#[derive(Debug, Error)]
#[error("Item {item_index}: {source}")]
pub struct NodeOperationError {
    pub item_index: usize,
    #[source]
    pub source: PhotoEditError,
}

pub type Result<T> = std::result::Result<T, PhotoEditError>;
