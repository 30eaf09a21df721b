//! Error types for the netscout-probes crate.
//!
//! These never leave a probe: every probe converts its failure into the
//! `error` field of its own result record.

use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Connection to {addr} failed: {source}")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("SSH error: {0}")]
    Ssh(#[from] ssh2::Error),

    #[error("Authentication rejected for user '{0}'")]
    AuthRejected(String),

    #[error("SNMP error: {0}")]
    Snmp(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Certificate parse error: {0}")]
    Certificate(String),

    #[error("Probe task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
