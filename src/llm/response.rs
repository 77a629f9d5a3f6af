//! `generateContent` response model and its classification.
//!
//! The provider may omit any field at any level, so every field defaults to
//! absent. Absence is not an error: it decides which fallback message the
//! user sees.

use std::fmt;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Candidate {
    pub content: Option<Content>,
    pub finish_reason: Option<String>,
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Content {
    pub parts: Option<Vec<Part>>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Part {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PromptFeedback {
    pub safety_ratings: Option<Vec<SafetyRating>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SafetyRating {
    pub category: Option<String>,
    pub probability: Option<String>,
}

/// Why a candidate stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    MaxTokens,
    Safety,
    Other(String),
}

impl FinishReason {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "STOP" => FinishReason::Stop,
            "MAX_TOKENS" => FinishReason::MaxTokens,
            "SAFETY" => FinishReason::Safety,
            other => FinishReason::Other(other.to_string()),
        }
    }
}

impl GenerateContentResponse {
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.as_ref().and_then(|c| c.first())
    }

    /// Text of the first part of the first candidate.
    pub fn first_text(&self) -> Option<&str> {
        self.first_candidate()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .first()?
            .text
            .as_deref()
    }

    pub fn has_candidates(&self) -> bool {
        self.candidates.as_ref().is_some_and(|c| !c.is_empty())
    }

    /// Category of the first prompt-level safety rating.
    pub fn prompt_block_category(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()?
            .safety_ratings
            .as_ref()?
            .first()?
            .category
            .as_deref()
    }
}

impl Candidate {
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason.as_deref().map(FinishReason::parse)
    }
}

/// Classified result of a successful HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Usable answer, already trimmed.
    Answer(String),
    SafetyBlocked,
    MaxTokens,
    UnexpectedFinish(String),
    PromptBlocked(String),
    NoText,
}

impl Outcome {
    pub fn is_answer(&self) -> bool {
        matches!(self, Outcome::Answer(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Answer(_) => "answer",
            Outcome::SafetyBlocked => "safety_blocked",
            Outcome::MaxTokens => "max_tokens",
            Outcome::UnexpectedFinish(_) => "unexpected_finish",
            Outcome::PromptBlocked(_) => "prompt_blocked",
            Outcome::NoText => "no_text",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Answer(text) => f.write_str(text),
            Outcome::SafetyBlocked => {
                f.write_str("The response was blocked for safety reasons under the current settings.")
            }
            Outcome::MaxTokens => {
                f.write_str("The generated response exceeded the maximum token limit.")
            }
            Outcome::UnexpectedFinish(reason) => {
                write!(f, "Generation stopped for an unexpected reason: {reason}.")
            }
            Outcome::PromptBlocked(category) => {
                write!(f, "The prompt was blocked for safety: {category}")
            }
            Outcome::NoText => {
                f.write_str("No text was found in the response, or its structure was unexpected.")
            }
        }
    }
}

/// Decide what to show for a decoded response. Order matters: finish-reason
/// diagnostics apply only without text, and prompt feedback only without
/// any candidate.
pub fn classify(response: &GenerateContentResponse) -> Outcome {
    if let Some(text) = response.first_text() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Outcome::Answer(trimmed.to_string());
        }
    }

    if let Some(reason) = response.first_candidate().and_then(Candidate::finish_reason) {
        match reason {
            FinishReason::Safety => return Outcome::SafetyBlocked,
            FinishReason::MaxTokens => return Outcome::MaxTokens,
            FinishReason::Other(raw) => return Outcome::UnexpectedFinish(raw),
            FinishReason::Stop => {}
        }
    }

    if !response.has_candidates() {
        if let Some(category) = response.prompt_block_category() {
            return Outcome::PromptBlocked(category.to_string());
        }
    }

    Outcome::NoText
}
