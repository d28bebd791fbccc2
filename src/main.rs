use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use taskdeck::api::ApiClient;
use taskdeck::app::TaskApp;
use taskdeck::cache::QueryCache;
use taskdeck::config::AppConfig;
use taskdeck::ui::TaskUi;

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "Terminal task list backed by a remote to-do API",
    version
)]
struct Args {
    /// Base URL of the remote to-do API
    #[arg(long, env = "TASKDECK_API_URL")]
    api_url: Option<String>,

    /// Path to a config.toml
    #[arg(long, env = "TASKDECK_CONFIG")]
    config: Option<PathBuf>,

    /// Seconds before a cached read is considered stale
    #[arg(long, env = "TASKDECK_STALE_AFTER")]
    stale_after: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKDECK_LOG")]
    log: Option<String>,

    /// Log format: pretty or json
    #[arg(long, env = "TASKDECK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKDECK_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::new(
        args.config.as_deref(),
        args.api_url,
        args.stale_after,
        args.log,
        args.log_format,
        args.log_file,
    );

    // Keep the guard alive for the process lifetime so buffered file logs flush.
    let _guard = setup_logging(&config.log, config.log_file.as_deref(), &config.log_format);

    info!(
        api = %config.api_base_url,
        stale_after_secs = config.stale_after_secs,
        "starting taskdeck"
    );

    let api = ApiClient::new(&config.api_base_url);
    let cache = Arc::new(QueryCache::new(config.stale_after()));
    let app = TaskApp::new(api, cache);

    TaskUi::new(app).run().await
}

/// Initialize tracing. Returns the non-blocking writer guard when logging
/// to a file; the caller must hold it until exit.
///
/// Without a log file, logs go to stderr — stdout belongs to the TUI.
fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskdeck.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            // Fall back to stderr — don't panic on a bad log path.
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stderr",
                dir.display()
            );
            init_stderr_logging(log_level, use_json);
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact().with_writer(non_blocking))
                .init();
        }
        Some(guard)
    } else {
        init_stderr_logging(log_level, use_json);
        None
    }
}

fn init_stderr_logging(log_level: &str, use_json: bool) {
    if use_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(log_level)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(log_level)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }
}
