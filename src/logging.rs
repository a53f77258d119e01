use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `GLANCE_LOG=debug`.
pub const LOG_ENV: &str = "GLANCE_LOG";

/// Send `tracing` output to `path`.
///
/// The terminal belongs to the UI, so logs only ever go to a file. Returns
/// `false` (and leaves logging off) when the file cannot be opened or a
/// subscriber is already installed.
pub fn init(path: &Path) -> bool {
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return false;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}
