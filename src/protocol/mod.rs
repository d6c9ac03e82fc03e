//! NETCONF protocol plumbing.
//!
//! Implements the client side of the NETCONF message layer (RFC 6241) and
//! its SSH framing rules (RFC 6242) over any async byte stream.
//!
//! # Message Flow
//!
//! ```text
//! Client                                Device
//!    |                                    |
//!    |-------- <hello> (caps) ---------->|  always ]]>]]> framed
//!    |<------- <hello> (caps, id) -------|
//!    |                                    |
//!    |   base:1.1 on both sides? switch to chunked framing
//!    |                                    |
//!    |-------- <rpc><get>filter -------->|  one outstanding RPC
//!    |<------- <rpc-reply> --------------|  data or <rpc-error>s
//!    |              ...                   |
//!    |-------- <close-session/> -------->|
//!    |<------- <rpc-reply><ok/> ---------|
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use ncdiscover::protocol::{NetconfClient, NetconfSession};
//!
//! let mut client = NetconfClient::handshake(stream, Duration::from_secs(300)).await?;
//! let reply = client.get("<filter type=\"subtree\">...</filter>").await?;
//! client.close().await?;
//! ```

mod capabilities;
mod framing;
mod message;
mod session;

pub use capabilities::CapabilitySet;
pub use framing::{FrameDecoder, Framing, END_OF_MESSAGE};
pub use message::{client_hello, close_session_rpc, get_rpc, RpcError, RpcReply, ServerHello};
pub use session::{NetconfClient, NetconfSession, SessionState};

pub(crate) use message::local_name;

/// NETCONF base namespace
pub const NETCONF_NS: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// base:1.0 capability (end-of-message framing)
pub const BASE_1_0: &str = "urn:ietf:params:netconf:base:1.0";

/// base:1.1 capability (chunked framing)
pub const BASE_1_1: &str = "urn:ietf:params:netconf:base:1.1";

/// IANA-assigned NETCONF over SSH port
pub const DEFAULT_PORT: u16 = 830;
