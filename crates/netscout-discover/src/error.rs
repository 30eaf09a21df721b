//! Error types for the netscout-discover crate.

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Nmap not available at path {path}: {reason}")]
    NmapNotFound { path: String, reason: String },

    #[error("Nmap did not finish within {0:?}")]
    NmapTimeout(Duration),

    #[error("Nmap exited with code {code}: {stderr}")]
    NmapFailed { code: i32, stderr: String },

    #[error("Failed to parse nmap XML output: {0}")]
    XmlParse(String),

    #[error("Export failed for {path}: {reason}")]
    Export { path: String, reason: String },

    #[error("Core error: {0}")]
    Core(#[from] netscout_core::CoreError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
