//! # ncdiscover - NETCONF operational-state discovery
//!
//! Retrieves the full operational state of a network element over NETCONF.
//! A single `<get>` for the whole state tree is more than devices can
//! render within their limits, so discovery walks an ordered catalog of
//! subtree queries over one session. A failed subtree is counted and
//! skipped; the run always finishes with a report.
//!
//! ## Features
//!
//! - **Capability negotiation**: release and schema-revision checks from the device `<hello>`
//! - **Schema catalogs**: compiled-in, ordered subtree queries per device family
//! - **Failure isolation**: per-subtree errors never abort the run
//! - **Transports**: NETCONF over SSH (`ssh` feature) or plain TCP
//!
//! ## Architecture
//!
//! ```text
//! Discovery            Connector / NetconfSession               Device
//!    |                              |                              |
//!    |------ open(params) -------->|------ <hello> -------------->|
//!    |                              |<----- <hello> (caps) --------|
//!    |   negotiate(caps)            |                              |
//!    |                              |                              |
//!    |  for each catalog subtree:   |                              |
//!    |------ get(filter) --------->|------ <rpc><get> ----------->|
//!    |<----- RpcReply -------------|<----- <rpc-reply> -----------|
//!    |   extract /rpc-reply/data/state                             |
//!    |                              |                              |
//!    |------ close() ------------->|------ <close-session/> ----->|
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ncdiscover::{Discovery, Family, SessionParams, SshConnector};
//!
//! let params = SessionParams::new("pe1.example.net", "admin", "secret");
//! let report = Discovery::new(SshConnector::new(), Family::Sros).run(&params).await;
//!
//! for doc in &report.documents {
//!     println!("{}: {:?}", doc.namespace(), doc.content());
//! }
//! println!("{} errors", report.error_count());
//! ```
//!
//! ## Modules
//!
//! - [`discovery`]: Run orchestration and reports
//! - [`negotiate`]: Version selection and compatibility checks
//! - [`family`]: Device family rules
//! - [`schema`]: Subtree catalogs
//! - [`filter`]: Subtree filter construction
//! - [`extract`]: State extraction from replies
//! - [`protocol`]: NETCONF messages, framing and client session
//! - [`transport`]: SSH and TCP connectors
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod family;
pub mod filter;
pub mod negotiate;
pub mod protocol;
pub mod schema;
pub mod transport;

// Re-exports for convenience
pub use config::Config;
pub use discovery::{Discovery, DiscoveryReport, DiscoveryState, Issue, IssueKind, ResultDocument};
pub use error::{DiscoveryError, Result};
pub use family::{DeviceFamily, Family};
pub use negotiate::{Mismatch, Negotiation};
pub use protocol::{CapabilitySet, NetconfClient, NetconfSession, RpcError, RpcReply};
pub use schema::{Catalog, SchemaDescriptor};
#[cfg(feature = "ssh")]
pub use transport::SshConnector;
pub use transport::{Connector, SessionParams, TcpConnector, TransportKind};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
