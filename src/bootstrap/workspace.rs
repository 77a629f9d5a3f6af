//! Workspace checks: API key file, docs directory, PDF discovery.
//!
//! First run creates what is missing and stops so the user can fill it in:
//!
//! ```text
//! ./
//! ├── api_key.secret   (empty on creation, mode 0600)
//! └── docs/            (drop PDFs here)
//! ```
//!
//! `GEMINI_API_KEY` replaces the key file entirely; the `dummy` provider
//! needs no key at all.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::corpus;
use crate::error::AppError;

/// Everything the session needs from the filesystem.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub api_key: Option<String>,
    pub pdf_files: Vec<PathBuf>,
}

/// Result of [`prepare`]. Every variant except `Ready` means "stop, the user
/// has something to do first", not an error.
#[derive(Debug)]
pub enum Setup {
    Ready(Workspace),
    KeyFileCreated(PathBuf),
    DocsDirCreated(PathBuf),
    KeyMissing(PathBuf),
    NoDocuments(PathBuf),
}

impl Setup {
    /// Instructions printed when setup stops early.
    pub fn message(&self) -> Option<String> {
        match self {
            Setup::Ready(_) => None,
            Setup::KeyFileCreated(path) => Some(format!(
                "Created '{}'. Put your Gemini API key in this file (or set GEMINI_API_KEY) and run again.",
                path.display()
            )),
            Setup::DocsDirCreated(path) => Some(format!(
                "Created docs directory '{}'. Copy your PDF files into it and run again.",
                path.display()
            )),
            Setup::KeyMissing(path) => Some(format!(
                "'{}' is empty. Add your Gemini API key to it (or set GEMINI_API_KEY).",
                path.display()
            )),
            Setup::NoDocuments(path) => {
                Some(format!("No PDF files found in '{}'.", path.display()))
            }
        }
    }
}

/// Check the workspace described by `config`, creating missing pieces.
pub fn prepare(config: &Config) -> Result<Setup, AppError> {
    let needs_key = config.requires_api_key() && config.api_key.is_none();

    if needs_key && !config.api_key_file.exists() {
        create_key_file(&config.api_key_file)?;
        info!(path = %config.api_key_file.display(), "created empty API key file");
        return Ok(Setup::KeyFileCreated(config.api_key_file.clone()));
    }

    if !config.docs_dir.is_dir() {
        fs::create_dir_all(&config.docs_dir).map_err(|e| {
            AppError::Workspace(format!(
                "cannot create docs directory {}: {e}",
                config.docs_dir.display()
            ))
        })?;
        info!(path = %config.docs_dir.display(), "created docs directory");
        return Ok(Setup::DocsDirCreated(config.docs_dir.clone()));
    }

    let pdf_files = corpus::find_pdf_files(&config.docs_dir);
    if pdf_files.is_empty() {
        return Ok(Setup::NoDocuments(config.docs_dir.clone()));
    }
    debug!(count = pdf_files.len(), "pdf files found");

    let api_key = if needs_key {
        match read_key_file(&config.api_key_file)? {
            Some(key) => Some(key),
            None => return Ok(Setup::KeyMissing(config.api_key_file.clone())),
        }
    } else {
        config.api_key.clone()
    };

    Ok(Setup::Ready(Workspace { api_key, pdf_files }))
}

/// Create an empty key file, owner-only on unix.
fn create_key_file(path: &Path) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Workspace(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    fs::write(path, "")
        .map_err(|e| AppError::Workspace(format!("cannot create {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            AppError::Workspace(format!("cannot set permissions on {}: {e}", path.display()))
        })?;
    }

    Ok(())
}

/// Read and trim the key. `None` when the file is blank.
fn read_key_file(path: &Path) -> Result<Option<String>, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Workspace(format!("cannot read {}: {e}", path.display())))?;
    let key = raw.trim();
    Ok((!key.is_empty()).then(|| key.to_string()))
}

// ── tests ─────────────────────────────────────────────────────────────────────
