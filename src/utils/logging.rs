use anyhow::Result;
use chrono::Local;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Initialize tracing with a timestamped log file in `log_dir`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout/stderr.
/// `RUST_LOG` overrides the default `info` filter. Returns the log file path.
pub fn init_tracing(log_dir: &Path) -> Result<PathBuf> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let log_path = log_dir.join(format!("table-columns_{}.log", timestamp));

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // "latest.log" always points at the current session
    #[cfg(unix)]
    {
        let latest_path = log_dir.join("latest.log");
        let _ = std::fs::remove_file(&latest_path);
        let _ = std::os::unix::fs::symlink(&log_path, &latest_path);
    }

    let fmt_layer = fmt::layer()
        .with_writer(Mutex::new(log_file))
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(target: "app", "Logging initialized: {}", log_path.display());
    Ok(log_path)
}

#[macro_export]
macro_rules! trace_toggle {
    ($source:expr, $column:expr, $mode:expr) => {
        tracing::debug!(target: "column_format", "[{}] {} -> {:?}", $source, $column, $mode);
    };
}
