//! Google Gemini `generateContent` provider.
//!
//! One `answer` call = one POST. The request carries the grounded prompt plus
//! fixed sampling and safety settings; the response is decoded into
//! [`GenerateContentResponse`] and classified into either the answer text or
//! a diagnostic message. Request wire types are private to this module.

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, trace, warn};

use crate::llm::prompt;
use crate::llm::response::{GenerateContentResponse, classify};
use crate::llm::{AnswerError, ProviderError};

const TEMPERATURE: f64 = 0.7;
const TOP_K: u32 = 40;
const TOP_P: f64 = 0.95;

const SAFETY_CATEGORIES: [HarmCategory; 4] = [
    HarmCategory::Harassment,
    HarmCategory::HateSpeech,
    HarmCategory::SexuallyExplicit,
    HarmCategory::DangerousContent,
];

// ── Public provider ───────────────────────────────────────────────────────────

/// Adapter for `{api_base_url}/models/{model}:generateContent`.
///
/// Constructed once at startup and cheaply cloned (`reqwest::Client` is an
/// `Arc` internally). The API key is sent as the `key` query parameter.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_base_url: String,
    model: String,
    api_key: Option<String>,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(
        api_base_url: String,
        model: String,
        timeout_seconds: u64,
        api_key: Option<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Client(e.to_string()))?;

        let api_key = api_key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        Ok(Self { client, api_base_url, model, api_key })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_base_url, self.model)
    }

    /// Ask `question` against `context`. Transport, status and decoding
    /// failures are returned as errors; content outcomes are returned as text.
    pub async fn answer(&self, context: &str, question: &str) -> Result<String, AnswerError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AnswerError::Configuration("Gemini API key is not set".into()));
        };

        let payload = GenerateContentRequest::new(prompt::render(context, question));

        debug!(
            model = %self.model,
            context_len = context.len(),
            question_len = question.len(),
            "sending generateContent request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full generateContent payload");
        }

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // The URL carries the key; keep it out of messages.
                let e = e.without_url();
                error!(error = %e, timeout = e.is_timeout(), "generateContent request failed (transport)");
                AnswerError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "failed to read generateContent body");
            AnswerError::Transport(e.to_string())
        })?;

        if !status.is_success() {
            error!(%status, body = %body, "generateContent returned HTTP error");
            return Err(AnswerError::Http { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, body = %body, "failed to deserialize generateContent response");
            AnswerError::Parse { message: e.to_string(), body: body.clone() }
        })?;
        trace!(response = %body, "full generateContent response");

        let outcome = classify(&parsed);
        if outcome.is_answer() {
            debug!(kind = outcome.kind(), "received answer");
        } else {
            warn!(kind = outcome.kind(), "response carried no usable text");
        }
        Ok(outcome.to_string())
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl GenerateContentRequest {
    fn new(prompt: String) -> Self {
        Self {
            contents: vec![RequestContent { parts: vec![RequestPart { text: prompt }] }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                top_k: TOP_K,
                top_p: TOP_P,
            },
            safety_settings: SAFETY_CATEGORIES
                .into_iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: HarmBlockThreshold::BlockMediumAndAbove,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: HarmCategory,
    threshold: HarmBlockThreshold,
}

#[derive(Debug, Clone, Copy, Serialize)]
enum HarmCategory {
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum HarmBlockThreshold {
    BlockMediumAndAbove,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_matches_wire_contract() {
        let req = GenerateContentRequest::new("PROMPT".into());
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{ "parts": [{ "text": "PROMPT" }] }],
                "generationConfig": { "temperature": 0.7, "topK": 40, "topP": 0.95 },
                "safetySettings": [
                    { "category": "HARM_CATEGORY_HARASSMENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" },
                    { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": "BLOCK_MEDIUM_AND_ABOVE" }
                ]
            })
        );
    }

    #[test]
    fn endpoint_includes_model() {
        let p = GeminiProvider::new(
            "https://example.test/v1beta".into(),
            "gemini-1.5-flash-latest".into(),
            5,
            Some("k".into()),
        )
        .unwrap();
        assert_eq!(
            p.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn debug_redacts_key() {
        let p = GeminiProvider::new("http://x".into(), "m".into(), 5, Some("AIzaSecret".into())).unwrap();
        let dbg = format!("{p:?}");
        assert!(!dbg.contains("AIzaSecret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[tokio::test]
    async fn missing_key_is_configuration_error() {
        // Port 9 (discard): never contacted because the key check comes first.
        let p = GeminiProvider::new("http://127.0.0.1:9".into(), "m".into(), 1, Some("   ".into())).unwrap();
        let err = p.answer("ctx", "q").await.unwrap_err();
        assert!(matches!(err, AnswerError::Configuration(_)));
    }
}
