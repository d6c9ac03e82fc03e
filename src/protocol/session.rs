//! NETCONF client session.
//!
//! Runs the hello exchange and the RPC request/reply loop over any
//! byte stream. The session is a single ordered channel: one RPC is
//! outstanding at a time.

use std::time::Duration;

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::capabilities::CapabilitySet;
use super::framing::{FrameDecoder, Framing};
use super::message::{client_hello, close_session_rpc, get_rpc, RpcReply, ServerHello};
use crate::error::{DiscoveryError, Result};

/// An open management session, as seen by the discovery core.
#[async_trait]
pub trait NetconfSession: Send {
    /// Capabilities the device advertised in its `<hello>`
    fn capabilities(&self) -> &CapabilitySet;

    /// Issue a `<get>` with the given filter payload.
    ///
    /// Device-reported `<rpc-error>`s come back inside the reply; `Err`
    /// means the exchange itself failed.
    async fn get(&mut self, filter: &str) -> Result<RpcReply>;

    /// Close the session. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Hello exchanged, RPCs allowed
    Open,
    /// `<close-session>` sent or stream failed
    Closed,
}

/// NETCONF client over an async byte stream
pub struct NetconfClient<S> {
    stream: S,
    decoder: FrameDecoder,
    capabilities: CapabilitySet,
    session_id: Option<u32>,
    next_message_id: u64,
    command_timeout: Duration,
    state: SessionState,
}

impl<S> NetconfClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Exchange `<hello>`s and pick the framing for the rest of the session
    pub async fn handshake(stream: S, command_timeout: Duration) -> Result<Self> {
        let mut client = Self {
            stream,
            decoder: FrameDecoder::new(Framing::EndOfMessage),
            capabilities: CapabilitySet::default(),
            session_id: None,
            next_message_id: 1,
            command_timeout,
            state: SessionState::Open,
        };

        let hello = client_hello();
        let server_hello = tokio::time::timeout(command_timeout, async {
            client.send(&hello).await?;
            client.receive().await
        })
        .await
        .map_err(|_| DiscoveryError::Timeout(command_timeout))??;

        let server = ServerHello::parse(&server_hello)?;
        if !server.capabilities.supports_base_1_0() && !server.capabilities.supports_base_1_1() {
            return Err(DiscoveryError::Protocol(
                "server advertises no NETCONF base capability".to_string(),
            ));
        }

        if server.capabilities.supports_base_1_1() {
            client.decoder.set_framing(Framing::Chunked);
        }
        client.capabilities = server.capabilities;
        client.session_id = server.session_id;

        tracing::debug!(
            "NETCONF session {:?} established, {} capabilities, {:?} framing",
            client.session_id,
            client.capabilities.len(),
            client.decoder.framing()
        );

        Ok(client)
    }

    /// Session ID assigned by the server
    pub fn session_id(&self) -> Option<u32> {
        self.session_id
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Framing in use
    pub fn framing(&self) -> Framing {
        self.decoder.framing()
    }

    /// Send one RPC and wait for its reply, bounded by the command timeout
    pub async fn rpc(&mut self, build: impl FnOnce(u64) -> String + Send) -> Result<RpcReply> {
        if self.state == SessionState::Closed {
            return Err(DiscoveryError::SessionClosed);
        }

        let message_id = self.next_message_id;
        self.next_message_id += 1;
        let request = build(message_id);
        let expected = message_id.to_string();

        let timeout = self.command_timeout;
        let result = tokio::time::timeout(timeout, async {
            self.send(&request).await?;
            loop {
                let reply = RpcReply::from_raw(self.receive().await?);
                if let Some(id) = reply.message_id.as_deref().filter(|id| *id != expected) {
                    // reply to an RPC that already timed out
                    tracing::warn!(
                        "Discarding reply for message-id {} (waiting for {})",
                        id,
                        expected
                    );
                    continue;
                }
                return Ok::<_, DiscoveryError>(reply);
            }
        })
        .await;

        match result {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(e)) => {
                if matches!(e, DiscoveryError::Transport(_) | DiscoveryError::Framing(_)) {
                    self.state = SessionState::Closed;
                }
                Err(e)
            },
            Err(_) => Err(DiscoveryError::Timeout(timeout)),
        }
    }

    async fn send(&mut self, message: &str) -> Result<()> {
        let mut out = BytesMut::with_capacity(message.len() + 32);
        self.decoder.framing().encode(message, &mut out);
        self.stream
            .write_all(&out)
            .await
            .map_err(|e| DiscoveryError::Transport(format!("write failed: {e}")))?;
        self.stream
            .flush()
            .await
            .map_err(|e| DiscoveryError::Transport(format!("flush failed: {e}")))
    }

    async fn receive(&mut self) -> Result<String> {
        let mut chunk = [0u8; 16 * 1024];
        loop {
            if let Some(message) = self.decoder.next_message()? {
                return Ok(message);
            }

            let n = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(|e| DiscoveryError::Transport(format!("read failed: {e}")))?;
            if n == 0 {
                return Err(DiscoveryError::Transport("connection closed by peer".to_string()));
            }
            self.decoder.extend(&chunk[..n]);
        }
    }
}

#[async_trait]
impl<S> NetconfSession for NetconfClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    async fn get(&mut self, filter: &str) -> Result<RpcReply> {
        self.rpc(|id| get_rpc(id, filter)).await
    }

    async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        let reply = self.rpc(close_session_rpc).await;
        self.state = SessionState::Closed;
        let _ = self.stream.shutdown().await;

        let reply = reply?;
        if reply.has_errors() {
            return Err(DiscoveryError::Rpc(reply.failures()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    const HELLO_1_0: &str = "<hello xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\"><capabilities>\
        <capability>urn:ietf:params:netconf:base:1.0</capability></capabilities>\
        <session-id>12</session-id></hello>]]>]]>";

    #[tokio::test]
    async fn test_handshake_base_1_0() {
        let (client_io, mut server_io) = duplex(64 * 1024);
        server_io.write_all(HELLO_1_0.as_bytes()).await.unwrap();

        let client = NetconfClient::handshake(client_io, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(client.session_id(), Some(12));
        assert_eq!(client.framing(), Framing::EndOfMessage);
        assert_eq!(client.state(), SessionState::Open);
    }

    #[tokio::test]
    async fn test_handshake_times_out_without_hello() {
        let (client_io, _server_io) = duplex(1024);
        let result = NetconfClient::handshake(client_io, Duration::from_millis(50)).await;
        assert!(matches!(result, Err(DiscoveryError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_peer_hangup_is_transport_error() {
        let (client_io, server_io) = duplex(1024);
        drop(server_io);
        let result = NetconfClient::handshake(client_io, Duration::from_secs(1)).await;
        assert!(matches!(result, Err(DiscoveryError::Transport(_))));
    }

    #[tokio::test]
    async fn test_late_reply_after_timeout_is_discarded() {
        let (client_io, mut server_io) = duplex(64 * 1024);
        server_io.write_all(HELLO_1_0.as_bytes()).await.unwrap();

        let mut client = NetconfClient::handshake(client_io, Duration::from_millis(200))
            .await
            .unwrap();

        let err = client.get("<filter/>").await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Timeout(t) if t == Duration::from_millis(200)));
        assert_eq!(err.to_string(), "Timed out after 200ms");
        assert_eq!(client.state(), SessionState::Open);

        // the answer to the timed-out get arrives ahead of the next one
        server_io
            .write_all(
                b"<rpc-reply message-id=\"1\"><data><late/></data></rpc-reply>]]>]]>\
                  <rpc-reply message-id=\"2\"><data><fresh/></data></rpc-reply>]]>]]>",
            )
            .await
            .unwrap();

        let reply = client.get("<filter/>").await.unwrap();
        assert_eq!(reply.message_id.as_deref(), Some("2"));
        assert!(reply.raw.contains("<fresh/>"));
        assert!(!reply.raw.contains("<late/>"));
    }

    #[tokio::test]
    async fn test_get_after_close_is_rejected() {
        let (client_io, mut server_io) = duplex(64 * 1024);
        server_io.write_all(HELLO_1_0.as_bytes()).await.unwrap();
        server_io
            .write_all(b"<rpc-reply message-id=\"1\"><ok/></rpc-reply>]]>]]>")
            .await
            .unwrap();

        let mut client = NetconfClient::handshake(client_io, Duration::from_secs(5))
            .await
            .unwrap();
        client.close().await.unwrap();
        assert_eq!(client.state(), SessionState::Closed);
        assert!(matches!(client.get("<filter/>").await, Err(DiscoveryError::SessionClosed)));
        // second close is a no-op
        client.close().await.unwrap();
    }
}
