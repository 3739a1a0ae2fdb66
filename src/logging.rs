use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::utils::{self, Profile};

pub const LOG_FILE_NAME: &str = "focuslog.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log file location for a profile, next to the database
pub fn log_file_path(profile: Profile) -> Option<PathBuf> {
    utils::get_data_dir(profile).map(|dir| dir.join(LOG_FILE_NAME))
}

/// Install the global subscriber.
///
/// The TUI owns stdout, so events are appended to the log file; stderr is
/// only used when the file cannot be opened. Returns the file in use.
pub fn init(profile: Profile) -> Option<PathBuf> {
    let path = log_file_path(profile);
    match path.as_deref().map(open_log_file) {
        Some(Ok(file)) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init();
            path
        }
        _ => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .try_init();
            None
        }
    }
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
