//! Console chat session: reads questions line by line, answers each one
//! against the fixed document context, prints the result.
//!
//! States: awaiting input → terminated. Exit words, end of input and the
//! shutdown token terminate cleanly. A failed turn is reported inline and
//! ends the session with the error, so the caller can exit with a status
//! matching its class; there is no retry.

use std::io::Write;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::llm::{AnswerError, ErrorClass, LlmProvider};

/// Why the session stopped without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    ExitWord,
    InputClosed,
    Interrupted,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Turn(#[from] AnswerError),

    #[error("console io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct ChatSession<'a> {
    provider: &'a LlmProvider,
    exit_words: &'a [String],
}

impl<'a> ChatSession<'a> {
    pub fn new(provider: &'a LlmProvider, exit_words: &'a [String]) -> Self {
        Self { provider, exit_words }
    }

    fn is_exit(&self, input: &str) -> bool {
        let input = input.to_lowercase();
        self.exit_words.iter().any(|w| w.to_lowercase() == input)
    }

    /// Run until an exit word, end of `input`, `shutdown`, or a failed turn.
    pub async fn run<R, W>(
        &self,
        context: &str,
        input: R,
        out: &mut W,
        shutdown: &CancellationToken,
    ) -> Result<SessionEnd, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let speaker = self.provider.name();

        loop {
            write!(out, "\nyou> ")?;
            out.flush()?;

            let line = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("session interrupted");
                    return Ok(SessionEnd::Interrupted);
                }

                line = lines.next_line() => line?,
            };

            let Some(line) = line else {
                info!("stdin closed");
                return Ok(SessionEnd::InputClosed);
            };

            let question = line.trim();
            if question.is_empty() {
                continue;
            }
            if self.is_exit(question) {
                debug!("exit word received");
                return Ok(SessionEnd::ExitWord);
            }

            writeln!(out, "{speaker} is thinking...")?;
            out.flush()?;
            debug!(question_len = question.len(), "dispatching question");

            let answer = tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    info!("session interrupted while waiting for an answer");
                    return Ok(SessionEnd::Interrupted);
                }

                answer = self.provider.answer(context, question) => answer,
            };

            match answer {
                Ok(answer) => writeln!(out, "\n{speaker}> {answer}")?,
                Err(e) => {
                    report_failure(out, &e)?;
                    return Err(e.into());
                }
            }
        }
    }
}

/// Print the class-specific message for a failed turn.
fn report_failure<W: Write>(out: &mut W, err: &AnswerError) -> std::io::Result<()> {
    match err.class() {
        ErrorClass::Network => {
            error!(error = %err, "network error during turn");
            writeln!(out, "\nNetwork error calling the Gemini API: {err}")?;
            if let Some(status) = err.status() {
                writeln!(out, "Status code: {status}")?;
            }
        }
        ErrorClass::Parse => {
            error!(error = %err, body = err.raw_body().unwrap_or_default(), "parse error during turn");
            writeln!(out, "\nError processing the Gemini JSON response: {err}")?;
        }
        ErrorClass::Unexpected => {
            warn!(error = %err, "unexpected error during turn");
            writeln!(out, "\nAn unexpected error occurred: {err}")?;
        }
    }
    out.flush()
}
