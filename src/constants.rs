pub const DEFAULT_IMAGE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_IMAGE_MIME: &str = "image/png";
pub const DEFAULT_BINARY_PROPERTY: &str = "data";
pub const OUTPUT_BINARY_PROPERTY: &str = "data";
pub const DEFAULT_LOG_DIR: &str = "/tmp";
pub const DEBUG_LOG_FILE: &str = "openai-photo-edit-debug.log";
pub const API_ERROR_LOG_FILE: &str = "openai-api-errors.log";
pub const LOG_RECORD_SEPARATOR: &str = "\n---\n";
pub const BASE64_IMAGE_PREFIX: &str = "data:image/";
