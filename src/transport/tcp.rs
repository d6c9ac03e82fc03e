//! NETCONF over plain TCP.
//!
//! No authentication or encryption: meant for device simulators and for
//! sessions already tunnelled to a local port. Credentials are ignored.

use async_trait::async_trait;
use tokio::net::TcpStream;

use super::{connection_error, Connector, SessionParams};
use crate::error::{DiscoveryError, Result};
use crate::protocol::NetconfClient;

/// Opens NETCONF sessions over TCP.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl TcpConnector {
    /// Create a new TCP connector.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Session = NetconfClient<TcpStream>;

    async fn open(&self, params: &SessionParams) -> Result<Self::Session> {
        let addr = params.address();
        tracing::debug!("Connecting to {} over TCP", addr);

        let stream = tokio::time::timeout(params.command_timeout, TcpStream::connect(&addr))
            .await
            .map_err(|_| DiscoveryError::Connection(format!("connect to {addr} timed out")))?
            .map_err(|e| DiscoveryError::Connection(format!("failed to connect to {addr}: {e}")))?;
        stream
            .set_nodelay(true)
            .map_err(|e| connection_error(params, e.into()))?;

        NetconfClient::handshake(stream, params.command_timeout)
            .await
            .map_err(|e| connection_error(params, e))
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}
