//! Transport layer for NETCONF sessions.
//!
//! A [`Connector`] opens a [`NetconfSession`] to one device. The discovery
//! core only sees the traits; which byte stream carries the session is
//! picked here.
//!
//! - **SSH**: the `netconf` subsystem over SSH (RFC 6242), password auth
//! - **TCP**: plain NETCONF over TCP, for lab simulators and tunnels
//!
//! # Usage
//!
//! ```rust,ignore
//! use ncdiscover::transport::{Connector, SessionParams, SshConnector};
//!
//! let params = SessionParams::new("pe1.example.net", "admin", "secret");
//! let session = SshConnector::new().open(&params).await?;
//! ```

#[cfg(feature = "ssh")]
mod ssh;
mod tcp;

#[cfg(feature = "ssh")]
pub use ssh::{SshConnector, SshSession};
pub use tcp::TcpConnector;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{DiscoveryError, Result};
use crate::protocol::{NetconfSession, DEFAULT_PORT};

/// Default per-command timeout (large subtrees are slow to render)
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 5 * 60;

/// Default session inactivity timeout
pub const DEFAULT_SESSION_TIMEOUT_SECS: u64 = 60 * 60;

/// Everything needed to open one session.
#[derive(Clone)]
pub struct SessionParams {
    /// Device host name or address
    pub host: String,
    /// Device port
    pub port: u16,
    /// Login user
    pub username: String,
    /// Login password
    pub password: String,
    /// Bound on a single RPC (and on connect + hello)
    pub command_timeout: Duration,
    /// Bound on session inactivity
    pub session_timeout: Duration,
}

impl SessionParams {
    /// Create with default port and timeouts
    pub fn new(host: &str, username: &str, password: &str) -> Self {
        Self {
            host: host.to_string(),
            port: DEFAULT_PORT,
            username: username.to_string(),
            password: password.to_string(),
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            session_timeout: Duration::from_secs(DEFAULT_SESSION_TIMEOUT_SECS),
        }
    }

    /// Set port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set per-command timeout
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// Set session inactivity timeout
    pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
        self.session_timeout = timeout;
        self
    }

    /// `host:port`, bracketing IPv6 literals
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Debug for SessionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("command_timeout", &self.command_timeout)
            .field("session_timeout", &self.session_timeout)
            .finish()
    }
}

/// Opens sessions to devices.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced
    type Session: NetconfSession;

    /// Connect, authenticate and exchange `<hello>`s.
    ///
    /// Any failure is reported as [`DiscoveryError::Connection`].
    async fn open(&self, params: &SessionParams) -> Result<Self::Session>;

    /// Transport name for logging
    fn name(&self) -> &'static str;
}

/// Transport kind selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// NETCONF over SSH (default)
    #[default]
    Ssh,
    /// NETCONF over plain TCP
    Tcp,
}

impl TransportKind {
    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ssh => "ssh",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ssh" | "netconf-ssh" => Ok(Self::Ssh),
            "tcp" | "raw" => Ok(Self::Tcp),
            _ => Err(format!("Unknown transport kind: {}", s)),
        }
    }
}

/// Fold any open-time failure into a connection error
pub(crate) fn connection_error(params: &SessionParams, err: DiscoveryError) -> DiscoveryError {
    match err {
        DiscoveryError::Connection(_) => err,
        other => DiscoveryError::Connection(format!("{}: {}", params.address(), other)),
    }
}
