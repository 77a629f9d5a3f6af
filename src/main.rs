//! pdfchat: entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config, apply `--docs`
//!   3. Resolve effective log level (CLI `-v` flags > env > config)
//!   4. Init logger once
//!   5. Prepare workspace (key file, docs dir, PDF list)
//!   6. Build the answer provider
//!   7. Extract the PDF corpus into the context string
//!   8. Spawn Ctrl-C → shutdown watcher
//!   9. Run the chat session on stdin, exit with its status

use pdfchat::bootstrap::{logger, workspace};
use pdfchat::error::AppError;
use pdfchat::llm::providers;
use pdfchat::session::{ChatSession, SessionEnd};
use pdfchat::{config, corpus, exit};

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    let code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            exit::for_startup(&e)
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<i32, AppError> {
    // .env is optional.
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if let Some(docs) = args.docs_dir.as_deref() {
        config.docs_dir = config::expand_home(docs);
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some())?;

    info!(
        docs_dir = %config.docs_dir.display(),
        provider = %config.llm.provider,
        model = %config.llm.gemini.model,
        effective_log_level = %effective_log_level,
        "config loaded"
    );

    println!("--- PDF chat with Google Gemini ---");

    let ws = match workspace::prepare(&config)? {
        workspace::Setup::Ready(ws) => ws,
        other => {
            if let Some(message) = other.message() {
                println!("{message}");
            }
            return Ok(exit::OK);
        }
    };

    println!("Searching for PDF files in: {}", config.docs_dir.display());
    println!("Found {} PDF files:", ws.pdf_files.len());
    for file in &ws.pdf_files {
        println!("- {}", corpus::file_label(file));
    }

    let provider = providers::build(&config.llm, ws.api_key.clone())?;

    println!("\nExtracting text from the PDF files...");
    let docs = corpus::extract_combined_text(&ws.pdf_files).await;
    info!(
        documents = docs.stats.documents,
        skipped = docs.stats.skipped,
        chars = docs.stats.chars,
        "corpus ready"
    );
    if docs.is_blank() {
        println!("Could not extract text from any PDF.");
        return Ok(exit::EMPTY_CORPUS);
    }

    println!("Extraction complete. Total characters: {}", docs.stats.chars);
    println!("\n--- Ready to chat! ---");
    println!(
        "Ask a question about the PDF contents, or type '{}' to finish.",
        config.session.exit_words.join("' / '")
    );

    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, ending session");
            ctrlc_token.cancel();
        }
    });

    let session = ChatSession::new(&provider, &config.session.exit_words);
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();

    match session.run(&docs.text, stdin, &mut stdout, &shutdown).await {
        Ok(end) => {
            info!(?end, "session finished");
            if end != SessionEnd::InputClosed {
                println!("\nGoodbye!");
            }
            Ok(exit::OK)
        }
        Err(e) => {
            warn!(error = %e, "session aborted");
            Ok(exit::for_session(&e))
        }
    }
}

// ── CLI ───────────────────────────────────────────────────────────────────────

struct CliArgs {
    log_level: Option<&'static str>,
    config_path: Option<String>,
    docs_dir: Option<String>,
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut docs_dir = None;

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                println!("Usage: pdfchat [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -h, --help                 Print help");
                println!("  -f, --config <PATH>        Path to configuration file (default: {})", config::DEFAULT_CONFIG_PATH);
                println!("  -d, --docs <DIR>           Directory with the PDF files (default: docs)");
                println!("  -v, -vv, -vvv, -vvvv       Increase logging verbosity");
                std::process::exit(exit::OK);
            }
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => {
                    eprintln!("error: -f/--config requires a path argument");
                    std::process::exit(exit::STARTUP);
                }
            },
            "-d" | "--docs" => match iter.next() {
                Some(dir) => docs_dir = Some(dir),
                None => {
                    eprintln!("error: -d/--docs requires a directory argument");
                    std::process::exit(exit::STARTUP);
                }
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            other => match logger::verbosity_flag(other) {
                Some(count) => verbosity = verbosity.saturating_add(count),
                None => eprintln!("warning: ignoring unknown argument '{other}'"),
            },
        }
    }

    CliArgs {
        log_level: logger::level_for_verbosity(verbosity),
        config_path,
        docs_dir,
    }
}
