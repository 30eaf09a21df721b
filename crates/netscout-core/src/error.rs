use std::net::Ipv4Addr;

use thiserror::Error;

/// Errors raised while building the shared data model.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid scan target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },

    #[error("Device {0} is already present in the report")]
    DuplicateDevice(Ipv4Addr),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
