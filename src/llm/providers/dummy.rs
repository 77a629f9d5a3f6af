//! Dummy provider: answers without touching the network.
//! Echoes the question by default, or returns a fixed reply. Counts calls so
//! the session loop can be checked end to end without an API key.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::llm::AnswerError;

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl DummyProvider {
    /// Provider that answers `[echo] <question>`.
    pub fn echo() -> Self {
        Self::default()
    }

    /// Provider that always answers `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self { reply: Some(reply.into()), calls: Arc::default() }
    }

    /// Number of `answer` calls so far, shared across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn answer(&self, _context: &str, question: &str) -> Result<String, AnswerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(match &self.reply {
            Some(reply) => reply.clone(),
            None => format!("[echo] {question}"),
        })
    }
}
