pub mod acquire;
pub mod edit;
pub mod interpret;
pub mod prompts;
