//! SSH introspection probe.
//!
//! Opens one password-authenticated session and runs a fixed battery of
//! shell commands over it, one after another. `ssh2` is blocking, so the
//! whole session runs on the blocking thread pool.

use std::io::Read;
use std::net::{Ipv4Addr, SocketAddr, TcpStream};
use std::time::Duration;

use async_trait::async_trait;
use ssh2::Session;

use netscout_core::types::{SshField, SshInfo};

use crate::error::{ProbeError, Result};
use crate::Probe;

pub const SSH_PORT: u16 = 22;

/// Introspection commands, run in this order.
pub const COMMANDS: [(SshField, &str); 6] = [
    (SshField::Os, "cat /etc/os-release | grep PRETTY_NAME"),
    (SshField::Kernel, "uname -r"),
    (SshField::Uptime, "uptime"),
    (SshField::Cpu, "lscpu | grep 'Model name'"),
    (SshField::Memory, "free -h"),
    (SshField::Disk, "df -h"),
];

#[derive(Debug, Clone)]
pub struct SshCredentials {
    pub username: String,
    pub password: String,
}

pub struct SshProbe {
    credentials: SshCredentials,
    port: u16,
    timeout: Duration,
}

impl SshProbe {
    /// `timeout` bounds the TCP connect and every individual read/write.
    pub fn new(credentials: SshCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            port: SSH_PORT,
            timeout,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

#[async_trait]
impl Probe for SshProbe {
    type Output = SshInfo;

    fn name(&self) -> &'static str {
        "ssh"
    }

    fn deadline(&self) -> Duration {
        // connect + handshake/auth + one slot per command
        self.timeout * (COMMANDS.len() as u32 + 2)
    }

    async fn probe(&self, ip: Ipv4Addr) -> SshInfo {
        let addr = SocketAddr::from((ip, self.port));
        let credentials = self.credentials.clone();
        let timeout = self.timeout;

        let outcome =
            tokio::task::spawn_blocking(move || collect_system_info(addr, &credentials, timeout))
                .await
                .map_err(ProbeError::from)
                .and_then(|r| r);

        match outcome {
            Ok(info) => {
                tracing::debug!(
                    ip = %ip,
                    failed_commands = info.command_errors.len(),
                    "SSH introspection complete"
                );
                info
            }
            Err(e) => {
                tracing::debug!(ip = %ip, error = %e, "SSH session failed");
                SshInfo::failed(e.to_string())
            }
        }
    }

    fn failure(&self, error: String) -> SshInfo {
        SshInfo::failed(error)
    }
}

fn collect_system_info(
    addr: SocketAddr,
    credentials: &SshCredentials,
    timeout: Duration,
) -> Result<SshInfo> {
    let session = open_session(addr, credentials, timeout)?;
    let mut info = SshInfo::default();

    for (field, command) in COMMANDS {
        match exec(&session, command) {
            Ok(output) => info.set(field, output),
            Err(e) => {
                info.command_errors
                    .insert(field.name().to_string(), e.to_string());
            }
        }
    }

    close_session(addr, session.disconnect(None, "netscout done", None));
    Ok(info)
}

/// The collected output stands whether or not the goodbye reaches the server.
fn close_session(addr: SocketAddr, outcome: std::result::Result<(), ssh2::Error>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(addr = %addr, error = %e, "SSH disconnect failed");
            false
        }
    }
}

fn open_session(addr: SocketAddr, credentials: &SshCredentials, timeout: Duration) -> Result<Session> {
    let tcp = TcpStream::connect_timeout(&addr, timeout)
        .map_err(|source| ProbeError::Connect { addr, source })?;
    tcp.set_read_timeout(Some(timeout))?;
    tcp.set_write_timeout(Some(timeout))?;

    let mut session = Session::new()?;
    session.set_tcp_stream(tcp);
    session.set_timeout(timeout.as_millis().min(u32::MAX as u128) as u32);
    session.handshake()?;
    session.userauth_password(&credentials.username, &credentials.password)?;

    if !session.authenticated() {
        return Err(ProbeError::AuthRejected(credentials.username.clone()));
    }

    Ok(session)
}

fn exec(session: &Session, command: &str) -> Result<String> {
    let mut channel = session.channel_session()?;
    channel.exec(command)?;

    let mut output = String::new();
    channel.read_to_string(&mut output)?;
    channel.wait_close()?;

    Ok(output.trim().to_string())
}
