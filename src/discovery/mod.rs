//! Discovery orchestration.
//!
//! One run walks a device's operational state one catalog subtree at a
//! time over a single session:
//!
//! ```text
//! Idle -> Connecting -> Connected -> Negotiating -> Retrieving(0..n) -> Closing -> Done
//!             |
//!             +-- open failed -----------------------------------------------> Done
//! ```
//!
//! A failed subtree is counted and skipped; only a failed open ends the
//! run early. The session is closed on every path after a successful open.

mod report;

pub use report::{DiscoveryReport, Issue, IssueKind, IssueLog, ResultDocument};

use std::fmt;

use chrono::Utc;
use uuid::Uuid;

use crate::extract::extract;
use crate::family::Family;
use crate::protocol::NetconfSession;
use crate::schema::{Catalog, SchemaDescriptor};
use crate::transport::{Connector, SessionParams};

/// Run state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryState {
    /// Not started
    Idle,
    /// Opening the session
    Connecting,
    /// Session open
    Connected,
    /// Checking capabilities
    Negotiating,
    /// Querying the subtree at this catalog index
    Retrieving(usize),
    /// Closing the session
    Closing,
    /// Finished
    Done,
}

impl fmt::Display for DiscoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Negotiating => write!(f, "negotiating"),
            Self::Retrieving(i) => write!(f, "retrieving[{i}]"),
            Self::Closing => write!(f, "closing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Discovery engine for one device family over one kind of transport.
///
/// Holds no per-run state, so one engine can serve any number of runs.
pub struct Discovery<C> {
    connector: C,
    family: Family,
}

impl<C: Connector> Discovery<C> {
    /// Create an engine
    pub fn new(connector: C, family: Family) -> Self {
        Self { connector, family }
    }

    /// Device family
    pub fn family(&self) -> Family {
        self.family
    }

    /// Discover the operational state of the device at `params`.
    ///
    /// Never fails: everything that goes wrong is counted in the report.
    pub async fn run(&self, params: &SessionParams) -> DiscoveryReport {
        let run = Run::new(self.family, params);
        run.execute(&self.connector, params).await
    }
}

struct Run {
    id: Uuid,
    family: Family,
    host: String,
    state: DiscoveryState,
    issues: IssueLog,
    documents: Vec<ResultDocument>,
    version: Option<String>,
    catalog: Option<&'static Catalog>,
}

impl Run {
    fn new(family: Family, params: &SessionParams) -> Self {
        Self {
            id: Uuid::new_v4(),
            family,
            host: params.host.clone(),
            state: DiscoveryState::Idle,
            issues: IssueLog::new(),
            documents: Vec::new(),
            version: None,
            catalog: None,
        }
    }

    fn advance(&mut self, next: DiscoveryState) {
        tracing::debug!("[{}] {} -> {}", self.id, self.state, next);
        self.state = next;
    }

    async fn execute<C: Connector>(
        mut self,
        connector: &C,
        params: &SessionParams,
    ) -> DiscoveryReport {
        let started_at = Utc::now();

        self.advance(DiscoveryState::Connecting);
        tracing::info!(
            "Connecting to {} over {} as {}",
            params.address(),
            connector.name(),
            params.username
        );

        match connector.open(params).await {
            Ok(mut session) => {
                self.advance(DiscoveryState::Connected);
                self.discover(&mut session).await;

                self.advance(DiscoveryState::Closing);
                if let Err(e) = session.close().await {
                    tracing::warn!("Failed to close session to {}: {}", self.host, e);
                }
            },
            Err(e) => {
                tracing::error!("Failed to connect to {}: {}", params.address(), e);
                self.issues.connection(e.to_string());
            },
        }

        self.advance(DiscoveryState::Done);
        tracing::info!(
            "Discovery of {} finished: {} documents, {} errors",
            self.host,
            self.documents.len(),
            self.issues.len()
        );

        DiscoveryReport {
            run_id: self.id,
            host: self.host,
            family: self.family,
            version: self.version,
            catalog: self.catalog.map(Catalog::name),
            started_at,
            finished_at: Utc::now(),
            documents: self.documents,
            issues: self.issues.into_inner(),
        }
    }

    async fn discover<S: NetconfSession>(&mut self, session: &mut S) {
        self.advance(DiscoveryState::Negotiating);
        let driver = self.family.driver();
        let negotiation = driver.negotiate(session.capabilities());
        for mismatch in &negotiation.mismatches {
            tracing::warn!("{}", mismatch);
            self.issues.mismatch(mismatch);
        }

        let catalog = driver.catalog_for(negotiation.version.as_deref());
        tracing::info!(
            "Device {} runs {}, walking catalog {} ({} subtrees)",
            self.host,
            negotiation.version.as_deref().unwrap_or("an unknown release"),
            catalog.name(),
            catalog.len()
        );
        self.version = negotiation.version;
        self.catalog = Some(catalog);

        for (index, descriptor) in catalog.descriptors().iter().enumerate() {
            self.advance(DiscoveryState::Retrieving(index));
            if let Some(document) = self.retrieve(session, catalog, descriptor).await {
                self.documents.push(document);
            }
        }
    }

    /// Query one subtree. `None` when the failure was counted.
    async fn retrieve<S: NetconfSession>(
        &mut self,
        session: &mut S,
        catalog: &Catalog,
        descriptor: &SchemaDescriptor,
    ) -> Option<ResultDocument> {
        tracing::debug!("Retrieving {}", descriptor.namespace());

        let reply = match session.get(&catalog.filter(descriptor)).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Failed to retrieve {}: {}", descriptor.namespace(), e);
                self.issues.retrieval(descriptor, e.to_string(), Vec::new());
                return None;
            },
        };

        if reply.has_errors() {
            let failures = reply.failures();
            for error in &failures {
                tracing::error!(
                    "Encountered error on {}: {}",
                    descriptor.namespace(),
                    error
                );
            }
            let message = failures
                .first()
                .map_or_else(|| "rpc-error".to_string(), |e| e.message.clone());
            self.issues.retrieval(descriptor, message, failures);
            return None;
        }
        for warning in reply.errors.iter().filter(|e| !e.is_error()) {
            tracing::warn!("Warning on {}: {}", descriptor.namespace(), warning);
        }

        match extract(&reply.raw) {
            Ok(content) => {
                if content.is_none() {
                    tracing::debug!("No state under {}", descriptor.namespace());
                }
                Some(ResultDocument::new(descriptor, content))
            },
            Err(e) => {
                tracing::error!("Failed to parse reply for {}: {}", descriptor.namespace(), e);
                self.issues.extraction(descriptor, e.to_string());
                None
            },
        }
    }
}
