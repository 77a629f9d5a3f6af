//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations. Each
//! provider answers one question against the document context per call;
//! the chat session owns the loop.
//!
//! Provider instances are immutable after construction: the API key is
//! held by the provider itself, not read from shared state.

pub mod prompt;
pub mod providers;
pub mod response;

use thiserror::Error;

// ── Errors ────────────────────────────────────────────────────────────────────

/// Construction-time failure (unknown provider name, HTTP client build).
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failure of a single `answer` call.
///
/// Content outcomes (safety block, truncation, …) are not errors: they are
/// rendered as text by [`response::Outcome`].
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Credential absent at call time; no request was sent.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// Body was not the expected JSON. `body` is the raw text received.
    #[error("invalid response JSON: {message}")]
    Parse { message: String, body: String },
}

/// Coarse class of an [`AnswerError`], used to pick the user-facing message
/// and the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Network,
    Parse,
    Unexpected,
}

impl AnswerError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AnswerError::Http { .. } | AnswerError::Transport(_) => ErrorClass::Network,
            AnswerError::Parse { .. } => ErrorClass::Parse,
            AnswerError::Configuration(_) => ErrorClass::Unexpected,
        }
    }

    /// HTTP status code, when the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AnswerError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body kept for diagnostics, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            AnswerError::Http { body, .. } | AnswerError::Parse { body, .. } => Some(body),
            _ => None,
        }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Adding a backend = new module + new variant + new `answer` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Gemini(providers::gemini::GeminiProvider),
}

impl LlmProvider {
    /// Answer `question` using only `context` as grounding.
    pub async fn answer(&self, context: &str, question: &str) -> Result<String, AnswerError> {
        match self {
            LlmProvider::Dummy(p) => p.answer(context, question).await,
            LlmProvider::Gemini(p) => p.answer(context, question).await,
        }
    }

    /// Short name shown in the console (`gemini> ...`).
    pub fn name(&self) -> &'static str {
        match self {
            LlmProvider::Dummy(_) => "dummy",
            LlmProvider::Gemini(_) => "gemini",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_and_transport_are_network_class() {
        let http = AnswerError::Http { status: 503, body: "unavailable".into() };
        assert_eq!(http.class(), ErrorClass::Network);
        assert_eq!(http.status(), Some(503));
        assert_eq!(http.raw_body(), Some("unavailable"));

        let transport = AnswerError::Transport("connection refused".into());
        assert_eq!(transport.class(), ErrorClass::Network);
        assert_eq!(transport.status(), None);
    }

    #[test]
    fn parse_keeps_raw_body() {
        let e = AnswerError::Parse { message: "EOF".into(), body: "{\"candidates\":".into() };
        assert_eq!(e.class(), ErrorClass::Parse);
        assert_eq!(e.raw_body(), Some("{\"candidates\":"));
    }

    #[test]
    fn configuration_is_unexpected_class() {
        let e = AnswerError::Configuration("missing API key".into());
        assert_eq!(e.class(), ErrorClass::Unexpected);
        assert!(e.to_string().contains("missing API key"));
    }
}
