pub mod providers;
pub mod types;
pub mod utils;

pub use providers::openai::{responses, send_responses_request};
pub use providers::openai::models::{
    ImageGenerationCall, ImageGenerationTool, InputContent, InputMessage, MessageContent,
    MessageOutput, OutputEntry, ResponsesRequest, ResponsesResponse,
};
pub use types::{LLMClient, ResponsesFn, ResponsesFuture};
