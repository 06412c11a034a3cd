use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::log_file_path;

const DEFAULT_FILTER: &str = "tabz=info";

/// Send `tracing` output to the log file. The picker owns the terminal, so
/// when the file cannot be opened logging is simply off.
pub(crate) fn init() -> bool {
    match log_file_path() {
        Some(path) => init_at(&path),
        None => false,
    }
}

pub(crate) fn init_at(path: &Path) -> bool {
    if let Some(parent) = path.parent()
        && fs::create_dir_all(parent).is_err()
    {
        return false;
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok()
}
