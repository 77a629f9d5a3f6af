//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory (or
//! the path given with `-f`), falls back to built-in defaults when no file
//! exists, then applies `PDFCHAT_DOCS_DIR` and `PDFCHAT_LOG_LEVEL`.
//! The API key is taken from `GEMINI_API_KEY` or the key file: never TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::bootstrap::logger;
use crate::error::AppError;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Gemini `generateContent` provider configuration (`[llm.gemini]`).
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root, without the `/models/...` suffix.
    pub api_base_url: String,
    pub model: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Active provider: `"gemini"` or `"dummy"`.
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub gemini: GeminiConfig,
}

/// Console session configuration (`[session]`).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Inputs that end the session, compared case-insensitively.
    pub exit_words: Vec<String>,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    /// Directory scanned (non-recursively) for `*.pdf` files.
    pub docs_dir: PathBuf,
    /// File holding the API key when `GEMINI_API_KEY` is not set.
    pub api_key_file: PathBuf,
    pub llm: LlmConfig,
    pub session: SessionConfig,
    /// API key from `GEMINI_API_KEY`. Filled from the key file later by
    /// the workspace bootstrap when absent.
    pub api_key: Option<String>,
}

impl Config {
    /// `true` when the active provider talks to the network and needs a key.
    pub fn requires_api_key(&self) -> bool {
        self.llm.provider != "dummy"
    }
}

/// Values that take precedence over the TOML file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub docs_dir: Option<String>,
    pub log_level: Option<String>,
    pub api_key: Option<String>,
}

impl Overrides {
    /// Collect overrides from `PDFCHAT_DOCS_DIR`, `PDFCHAT_LOG_LEVEL` and `GEMINI_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            docs_dir: env::var("PDFCHAT_DOCS_DIR").ok(),
            log_level: env::var("PDFCHAT_LOG_LEVEL").ok(),
            api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
        }
    }
}

/// Raw TOML shape: `serde` target before resolution.
#[derive(Deserialize, Default)]
struct RawConfig {
    #[serde(default)]
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    session: RawSession,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_docs_dir")]
    docs_dir: String,
    #[serde(default = "default_api_key_file")]
    api_key_file: String,
}

impl Default for RawApp {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            docs_dir: default_docs_dir(),
            api_key_file: default_api_key_file(),
        }
    }
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    gemini: RawGeminiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), gemini: RawGeminiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawGeminiConfig {
    #[serde(default = "default_gemini_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_gemini_model")]
    model: String,
    #[serde(default = "default_gemini_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawGeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_gemini_api_base_url(),
            model: default_gemini_model(),
            timeout_seconds: default_gemini_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawSession {
    #[serde(default = "default_exit_words")]
    exit_words: Vec<String>,
}

impl Default for RawSession {
    fn default() -> Self {
        Self { exit_words: default_exit_words() }
    }
}

fn default_log_level() -> String { "warn".to_string() }
fn default_docs_dir() -> String { "docs".to_string() }
fn default_api_key_file() -> String { "api_key.secret".to_string() }
fn default_llm_provider() -> String { "gemini".to_string() }
fn default_gemini_api_base_url() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_gemini_model() -> String { "gemini-1.5-flash-latest".to_string() }
fn default_gemini_timeout_seconds() -> u64 { 120 }
fn default_exit_words() -> Vec<String> { vec!["salir".to_string(), "exit".to_string()] }

/// Load config from `config_path`, or `config/default.toml`, then apply env overrides.
/// Without an explicit path and without the default file, built-in defaults are used.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let overrides = Overrides::from_env();

    if let Some(path) = config_path {
        return load_from(Path::new(path), &overrides);
    }

    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        load_from(default_path, &overrides)
    } else {
        validate(resolve(RawConfig::default(), &overrides), "built-in defaults")
    }
}

/// Internal loader: accepts an explicit path and overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(path: &Path, overrides: &Overrides) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    validate(resolve(parsed, overrides), &path.display().to_string())
}

/// Reject settings that would only fail later: an unknown log level or an
/// empty exit-word list.
fn validate(config: Config, origin: &str) -> Result<Config, AppError> {
    logger::parse_level(&config.log_level)
        .map_err(|e| AppError::Config(format!("[app].log_level in {origin}: {e}")))?;

    if config.session.exit_words.is_empty() {
        return Err(AppError::Config(format!(
            "[session].exit_words in {origin} must contain at least one word"
        )));
    }
    Ok(config)
}

fn resolve(parsed: RawConfig, overrides: &Overrides) -> Config {
    let app = parsed.app;
    let docs_dir = overrides.docs_dir.as_deref().unwrap_or(&app.docs_dir);
    let log_level = overrides.log_level.clone().unwrap_or(app.log_level);

    Config {
        log_level,
        docs_dir: expand_home(docs_dir),
        api_key_file: expand_home(&app.api_key_file),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            gemini: GeminiConfig {
                api_base_url: parsed.llm.gemini.api_base_url.trim_end_matches('/').to_string(),
                model: parsed.llm.gemini.model,
                timeout_seconds: parsed.llm.gemini.timeout_seconds,
            },
        },
        session: SessionConfig {
            exit_words: parsed
                .session
                .exit_words
                .into_iter()
                .map(|w| w.trim().to_string())
                .filter(|w| !w.is_empty())
                .collect(),
        },
        api_key: overrides.api_key.clone(),
    }
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

/// Safe `Config` for tests: dummy LLM, no API key, everything under `root`.
impl Config {
    pub fn test_default(root: &Path) -> Self {
        Self {
            log_level: "info".into(),
            docs_dir: root.join("docs"),
            api_key_file: root.join("api_key.secret"),
            llm: LlmConfig {
                provider: "dummy".into(),
                gemini: GeminiConfig {
                    api_base_url: "http://localhost:0/v1beta".into(),
                    model: "test-model".into(),
                    timeout_seconds: 1,
                },
            },
            session: SessionConfig { exit_words: default_exit_words() },
            api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[app]
docs_dir = "pdfs"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_basic_config() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.docs_dir, PathBuf::from("pdfs"));
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.api_key_file, PathBuf::from("api_key.secret"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let f = write_toml("");
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "gemini");
        assert_eq!(cfg.llm.gemini.model, "gemini-1.5-flash-latest");
        assert_eq!(cfg.llm.gemini.timeout_seconds, 120);
        assert_eq!(cfg.session.exit_words, vec!["salir", "exit"]);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn gemini_section_is_read() {
        let f = write_toml(
            r#"
[llm]
default = "dummy"

[llm.gemini]
api_base_url = "http://127.0.0.1:9999/v1beta/"
model = "gemini-2.0-flash"
timeout_seconds = 5
"#,
        );
        let cfg = load_from(f.path(), &Overrides::default()).unwrap();
        assert_eq!(cfg.llm.provider, "dummy");
        assert!(!cfg.requires_api_key());
        assert_eq!(cfg.llm.gemini.api_base_url, "http://127.0.0.1:9999/v1beta");
        assert_eq!(cfg.llm.gemini.model, "gemini-2.0-flash");
        assert_eq!(cfg.llm.gemini.timeout_seconds, 5);
    }

    #[test]
    fn blank_exit_words_rejected() {
        let f = write_toml("[session]\nexit_words = [\"  \"]\n");
        let err = load_from(f.path(), &Overrides::default()).unwrap_err();
        assert!(err.to_string().contains("exit_words"));
    }

    #[test]
    fn unknown_log_level_rejected() {
        let f = write_toml("[app]\nlog_level = \"verbose\"\n");
        let msg = load_from(f.path(), &Overrides::default()).unwrap_err().to_string();
        assert!(msg.contains("log_level"), "got: {msg}");
        assert!(msg.contains("verbose"), "got: {msg}");
    }

    #[test]
    fn log_level_override_is_validated() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = Overrides { log_level: Some("loud".into()), ..Overrides::default() };
        let msg = load_from(f.path(), &overrides).unwrap_err().to_string();
        assert!(msg.contains("loud"), "got: {msg}");
    }

    #[test]
    fn overrides_take_precedence() {
        let f = write_toml(MINIMAL_TOML);
        let overrides = Overrides {
            docs_dir: Some("/tmp/other-docs".into()),
            log_level: Some("debug".into()),
            api_key: Some("AIzaTestKey".into()),
        };
        let cfg = load_from(f.path(), &overrides).unwrap();
        assert_eq!(cfg.docs_dir, PathBuf::from("/tmp/other-docs"));
        assert_eq!(cfg.log_level, "debug");
        assert_eq!(cfg.api_key.as_deref(), Some("AIzaTestKey"));
    }

    #[test]
    fn malformed_toml_errors() {
        let f = write_toml("[app\ndocs_dir = ");
        let msg = load_from(f.path(), &Overrides::default()).unwrap_err().to_string();
        assert!(msg.contains("parse error"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), &Overrides::default());
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/pdfs");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with("pdfs"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }
}
