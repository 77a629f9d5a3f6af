//! Bootstrap layer: runs before the chat session starts.
//!
//! - **logger**: tracing-subscriber initialisation.
//! - **workspace**: API key file and docs directory checks.

pub mod logger;
pub mod workspace;
