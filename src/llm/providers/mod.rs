//! LLM provider implementations.
//!
//! `build(config, api_key)` is the factory: called at startup.
//! Adding a new backend = new module + new match arm.

pub mod dummy;
pub mod gemini;

use crate::config::LlmConfig;
use crate::llm::{LlmProvider, ProviderError};

/// Construct a `LlmProvider` from config and the resolved API key.
///
/// A missing key is not rejected here: the Gemini provider reports it as a
/// configuration error on the first call, before any request is sent.
pub fn build(config: &LlmConfig, api_key: Option<String>) -> Result<LlmProvider, ProviderError> {
    match config.provider.as_str() {
        "dummy" => Ok(LlmProvider::Dummy(dummy::DummyProvider::echo())),
        "gemini" => {
            let g = &config.gemini;
            let p = gemini::GeminiProvider::new(
                g.api_base_url.clone(),
                g.model.clone(),
                g.timeout_seconds,
                api_key,
            )?;
            Ok(LlmProvider::Gemini(p))
        }
        _ => Err(ProviderError::UnknownProvider(config.provider.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::Path;

    #[test]
    fn builds_dummy() {
        let cfg = Config::test_default(Path::new("/tmp"));
        let p = build(&cfg.llm, None).unwrap();
        assert_eq!(p.name(), "dummy");
    }

    #[test]
    fn builds_gemini() {
        let mut cfg = Config::test_default(Path::new("/tmp"));
        cfg.llm.provider = "gemini".into();
        let p = build(&cfg.llm, Some("AIzaTestKey".into())).unwrap();
        assert_eq!(p.name(), "gemini");
    }

    #[test]
    fn unknown_provider_errors() {
        let mut cfg = Config::test_default(Path::new("/tmp"));
        cfg.llm.provider = "openai".into();
        let err = build(&cfg.llm, None).unwrap_err();
        assert!(matches!(err, ProviderError::UnknownProvider(name) if name == "openai"));
    }
}
