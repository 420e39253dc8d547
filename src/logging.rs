// ==========================================
// Inventory Count Automation - logging setup
// ==========================================
// tracing + tracing-subscriber
// RUST_LOG selects the level filter (default: info); an optional
// per-day run log is written next to the console output.
// ==========================================

use chrono::Local;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const APP_DIR_NAME: &str = "inventory-count-automation";

#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// One JSON object per line on the console
    pub json: bool,
    /// Directory for `run_YYYYMMDD.log`; no file log when `None`
    pub log_dir: Option<PathBuf>,
}

/// `<data dir>/inventory-count-automation/logs`, or `./logs` without a data dir.
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

fn open_run_log(dir: &Path) -> std::io::Result<(File, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("run_{}.log", Local::now().format("%Y%m%d")));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Installs the global subscriber.
///
/// Returns the run log path when a file log was opened. A file that
/// cannot be opened leaves console logging in place.
///
/// # Example
/// ```no_run
/// use inventory_count_automation::logging::{self, LogOptions};
/// let _ = logging::init(&LogOptions::default());
/// ```
pub fn init(options: &LogOptions) -> Option<PathBuf> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (plain, json) = if options.json {
        (None, Some(fmt::layer().json().with_target(true)))
    } else {
        (
            Some(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(true),
            ),
            None,
        )
    };

    let mut file_error = None;
    let (file_layer, log_path) = match options.log_dir.as_deref().map(open_run_log) {
        Some(Ok((file, path))) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            ),
            Some(path),
        ),
        Some(Err(e)) => {
            file_error = Some(e);
            (None, None)
        }
        None => (None, None),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json)
        .with(file_layer)
        .try_init()
        .is_ok();

    if let Some(e) = file_error {
        tracing::warn!(error = %e, "run log file unavailable, console only");
    }
    if installed {
        log_path
    } else {
        None
    }
}

/// Debug-level logging for tests; safe to call more than once.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
