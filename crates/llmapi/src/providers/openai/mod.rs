mod api;
pub mod models;

pub use api::{responses, send_responses_request};
