//! Application-wide error types.
//!
//! Per-turn failures of the answer provider live in [`crate::llm::AnswerError`];
//! everything here stops the program before the chat session starts.

use thiserror::Error;

use crate::llm::ProviderError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("workspace error: {0}")]
    Workspace(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = AppError::Config("missing field".into());
        assert!(e.to_string().contains("config error"));
        assert!(e.to_string().contains("missing field"));
    }

    #[test]
    fn workspace_error_display() {
        let e = AppError::Workspace("cannot create api_key.secret".into());
        assert!(e.to_string().contains("api_key.secret"));
    }

    #[test]
    fn provider_error_converts() {
        let e: AppError = ProviderError::UnknownProvider("openai".into()).into();
        assert!(e.to_string().contains("openai"));
    }
}
