mod cli;
mod commands;
mod config;
mod constants;
mod debug_log;
mod error;
mod fs_utils;
mod models;

pub use cli::{run, Cli};
pub use commands::acquire::acquire_image;
pub use commands::edit::PhotoEditNode;
pub use commands::interpret::{acquisition_failure, api_failure, interpret_response, ItemContext};
pub use commands::prompts::PromptCatalog;

pub use config::NodeConfig;
pub use constants::{
    API_ERROR_LOG_FILE, DEBUG_LOG_FILE, DEFAULT_BINARY_PROPERTY, DEFAULT_IMAGE_MIME,
    DEFAULT_IMAGE_MODEL, DEFAULT_LOG_DIR, DEFAULT_OPENAI_ENDPOINT, OUTPUT_BINARY_PROPERTY,
};
pub use debug_log::{DebugLog, FileDebugLog, MemoryDebugLog, TimestampedRecord};
pub use error::{NodeOperationError, PhotoEditError, Result};

pub use models::{
    BinaryData, ImageSource, InputImage, InputItem, NodeParameters, OpenAiCredentials,
    OutputItem, PairedItem, ParameterSource, StyleId,
};
