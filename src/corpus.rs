//! Document corpus: PDF discovery and text extraction.
//!
//! Every PDF in the docs directory (top level only) is parsed with `lopdf`
//! on a blocking worker, one file at a time, and rendered with start/end
//! markers per document and a marker per page. Files that fail to parse are
//! logged and skipped; the combined text is the chat context.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("cannot open '{file}': {source}")]
    Open {
        file: String,
        #[source]
        source: lopdf::Error,
    },

    #[error("cannot extract page {page} of '{file}': {source}")]
    Page {
        file: String,
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("extraction worker for '{file}' failed: {reason}")]
    Worker { file: String, reason: String },
}

/// Text of one page, as extracted.
#[derive(Debug, Clone)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Counters reported after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub documents: usize,
    pub skipped: usize,
    pub chars: usize,
}

/// The combined context plus what went into it.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub text: String,
    pub stats: CorpusStats,
}

impl Corpus {
    /// `true` when nothing usable was extracted.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// List `*.pdf` files directly inside `dir` (extension matched
/// case-insensitively), sorted by path. Unreadable directories yield an
/// empty list.
pub fn find_pdf_files(dir: &Path) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "cannot list docs directory");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_pdf(path))
        .collect();
    files.sort();
    files
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Display name used in markers and logs.
pub fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render one document with its markers.
pub fn render_document(name: &str, pages: &[PageText]) -> String {
    let mut out = format!("--- DOCUMENT START: {name} ---\n");
    for page in pages {
        out.push_str(&format!("--- Page {} ---\n", page.number));
        out.push_str(&page.text);
        if !page.text.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&format!("--- DOCUMENT END: {name} ---\n"));
    out
}

/// Parse one PDF and render it. Blocking: run on a worker thread.
///
/// Only a file that cannot be opened is an error. A page whose text cannot
/// be extracted is logged and rendered empty.
pub fn extract_document(path: &Path) -> Result<String, CorpusError> {
    let file = file_label(path);
    let document = lopdf::Document::load(path)
        .map_err(|source| CorpusError::Open { file: file.clone(), source })?;

    let numbers: Vec<u32> = document.get_pages().into_keys().collect();
    let pages = collect_pages(&file, &numbers, |n| document.extract_text(&[n]));

    debug!(%file, pages = pages.len(), "document extracted");
    Ok(render_document(&file, &pages))
}

fn collect_pages<F>(file: &str, numbers: &[u32], mut extract: F) -> Vec<PageText>
where
    F: FnMut(u32) -> Result<String, lopdf::Error>,
{
    numbers
        .iter()
        .map(|&number| {
            let text = extract(number).unwrap_or_else(|source| {
                let err = CorpusError::Page { file: file.to_string(), page: number, source };
                warn!(error = %err, "page rendered empty");
                String::new()
            });
            PageText { number, text }
        })
        .collect()
}

/// Extract every file in order and join the rendered documents with a
/// blank line. Failures are logged and counted as skipped.
pub async fn extract_combined_text(files: &[PathBuf]) -> Corpus {
    let mut corpus = Corpus::default();

    for path in files {
        let file = file_label(path);
        info!(%file, "processing document");
        println!("- Processing: {file}");

        let owned = path.clone();
        let result = tokio::task::spawn_blocking(move || extract_document(&owned))
            .await
            .unwrap_or_else(|e| Err(CorpusError::Worker { file: file.clone(), reason: e.to_string() }));

        match result {
            Ok(text) => {
                if !corpus.text.is_empty() {
                    corpus.text.push('\n');
                }
                corpus.text.push_str(&text);
                corpus.stats.documents += 1;
            }
            Err(e) => {
                warn!(error = %e, "skipping document");
                println!("  Error processing '{file}': {e}. Skipping file.");
                corpus.stats.skipped += 1;
            }
        }
    }

    corpus.stats.chars = corpus.text.chars().count();
    corpus
}
