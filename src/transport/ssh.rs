//! NETCONF over SSH (RFC 6242).
//!
//! Password authentication, then the `netconf` subsystem on a session
//! channel. Host keys are accepted without verification, matching how
//! management stations usually reach lab and provider-edge devices.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use russh::client::{self, Handle, Msg};
use russh::{ChannelStream, Disconnect};

use super::{connection_error, Connector, SessionParams};
use crate::error::{DiscoveryError, Result};
use crate::protocol::{CapabilitySet, NetconfClient, NetconfSession, RpcReply};

/// NETCONF SSH subsystem name
pub const NETCONF_SUBSYSTEM: &str = "netconf";

type SshStream = Pin<Box<ChannelStream<Msg>>>;

/// Accepts any server host key.
struct AcceptAnyHostKey;

#[async_trait]
impl client::Handler for AcceptAnyHostKey {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        _server_public_key: &russh_keys::key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(true)
    }
}

/// Opens NETCONF sessions over SSH.
#[derive(Debug, Clone, Copy, Default)]
pub struct SshConnector;

impl SshConnector {
    /// Create a new SSH connector.
    pub fn new() -> Self {
        Self
    }

    async fn connect(&self, params: &SessionParams) -> Result<SshSession> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(params.session_timeout),
            ..Default::default()
        });

        let connect =
            client::connect(config, (params.host.as_str(), params.port), AcceptAnyHostKey);
        let mut handle = tokio::time::timeout(params.command_timeout, connect)
            .await
            .map_err(|_| DiscoveryError::Connection("SSH connect timed out".to_string()))?
            .map_err(|e| DiscoveryError::Connection(format!("SSH connect failed: {e}")))?;

        let authenticated = handle
            .authenticate_password(params.username.clone(), params.password.clone())
            .await
            .map_err(|e| DiscoveryError::Connection(format!("SSH authentication failed: {e}")))?;
        if !authenticated {
            return Err(DiscoveryError::Connection(format!(
                "authentication rejected for user {}",
                params.username
            )));
        }

        let mut channel = handle.channel_open_session().await?;
        channel.request_subsystem(true, NETCONF_SUBSYSTEM).await?;
        let stream: SshStream = Box::pin(channel.into_stream());

        let client = NetconfClient::handshake(stream, params.command_timeout).await?;
        Ok(SshSession { client, handle })
    }
}

#[async_trait]
impl Connector for SshConnector {
    type Session = SshSession;

    async fn open(&self, params: &SessionParams) -> Result<Self::Session> {
        tracing::debug!("Connecting to {} over SSH as {}", params.address(), params.username);
        self.connect(params)
            .await
            .map_err(|e| connection_error(params, e))
    }

    fn name(&self) -> &'static str {
        "ssh"
    }
}

/// NETCONF session carried by an SSH connection.
///
/// Owns the SSH connection handle so the connection lives exactly as
/// long as the session.
pub struct SshSession {
    client: NetconfClient<SshStream>,
    handle: Handle<AcceptAnyHostKey>,
}

impl SshSession {
    /// Session ID assigned by the device
    pub fn session_id(&self) -> Option<u32> {
        self.client.session_id()
    }
}

#[async_trait]
impl NetconfSession for SshSession {
    fn capabilities(&self) -> &CapabilitySet {
        self.client.capabilities()
    }

    async fn get(&mut self, filter: &str) -> Result<RpcReply> {
        self.client.get(filter).await
    }

    async fn close(&mut self) -> Result<()> {
        let closed = self.client.close().await;
        if let Err(e) = self
            .handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
        {
            tracing::debug!("SSH disconnect: {}", e);
        }
        closed
    }
}
