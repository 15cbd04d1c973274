//! Path helpers for twinbot's data directory.

use std::path::PathBuf;

/// Base data directory (~/.twinbot)
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".twinbot")
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

/// Default folder for documents fed to the ingest pipeline
pub fn default_data_folder() -> PathBuf {
    data_dir().join("data")
}
