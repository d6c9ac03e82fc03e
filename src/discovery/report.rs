//! Discovery results and the issues counted along the way.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::family::Family;
use crate::negotiate::Mismatch;
use crate::protocol::RpcError;
use crate::schema::SchemaDescriptor;

/// One retrieved subtree.
///
/// `content` is `None` when the device answered without that subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultDocument {
    element: &'static str,
    namespace: &'static str,
    content: Option<String>,
}

impl ResultDocument {
    /// Pair a descriptor with what was extracted for it
    pub fn new(descriptor: &SchemaDescriptor, content: Option<String>) -> Self {
        Self {
            element: descriptor.element(),
            namespace: descriptor.namespace(),
            content,
        }
    }

    /// Element template that was queried
    pub fn element(&self) -> &'static str {
        self.element
    }

    /// Subtree namespace
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Serialized state subtree
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// Category of a counted error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Session could not be opened (fatal)
    Connection,
    /// Required schema revision not advertised
    SchemaVersionMismatch,
    /// Release unknown or outside the allow-list
    UnsupportedVersion,
    /// A subtree query failed
    Retrieval,
    /// A reply could not be parsed
    Extraction,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Connection => "connection",
            Self::SchemaVersionMismatch => "schema version mismatch",
            Self::UnsupportedVersion => "unsupported version",
            Self::Retrieval => "retrieval",
            Self::Extraction => "extraction",
        };
        write!(f, "{name}")
    }
}

/// One counted error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Category
    pub kind: IssueKind,
    /// Namespace of the subtree concerned, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Human-readable description
    pub message: String,
    /// Device-reported errors behind a retrieval failure
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub detail: Vec<RpcError>,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{} error on {}: {}", self.kind, ns, self.message),
            None => write!(f, "{} error: {}", self.kind, self.message),
        }
    }
}

/// Errors accumulated during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueLog {
    issues: Vec<Issue>,
}

impl IssueLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    pub fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    /// Session open failed
    pub fn connection(&mut self, message: impl Into<String>) {
        self.push(Issue {
            kind: IssueKind::Connection,
            namespace: None,
            message: message.into(),
            detail: Vec::new(),
        });
    }

    /// Negotiation mismatch
    pub fn mismatch(&mut self, mismatch: &Mismatch) {
        let kind = match mismatch {
            Mismatch::UnsupportedVersion { .. } => IssueKind::UnsupportedVersion,
            Mismatch::SchemaVersion { .. } => IssueKind::SchemaVersionMismatch,
        };
        self.push(Issue {
            kind,
            namespace: None,
            message: mismatch.to_string(),
            detail: Vec::new(),
        });
    }

    /// Subtree query failed
    pub fn retrieval(
        &mut self,
        descriptor: &SchemaDescriptor,
        message: impl Into<String>,
        detail: Vec<RpcError>,
    ) {
        self.push(Issue {
            kind: IssueKind::Retrieval,
            namespace: Some(descriptor.namespace().to_string()),
            message: message.into(),
            detail,
        });
    }

    /// Reply for a subtree could not be parsed
    pub fn extraction(&mut self, descriptor: &SchemaDescriptor, message: impl Into<String>) {
        self.push(Issue {
            kind: IssueKind::Extraction,
            namespace: Some(descriptor.namespace().to_string()),
            message: message.into(),
            detail: Vec::new(),
        });
    }

    /// Number of errors counted
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// True when nothing went wrong
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Recorded issues, in order
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Take the recorded issues
    pub fn into_inner(self) -> Vec<Issue> {
        self.issues
    }
}

/// Aggregate outcome of one discovery run.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Device address
    pub host: String,
    /// Device family
    pub family: Family,
    /// Release capability selected during negotiation
    pub version: Option<String>,
    /// Catalog walked
    pub catalog: Option<&'static str>,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
    /// Retrieved subtrees, in catalog order
    pub documents: Vec<ResultDocument>,
    /// Counted errors
    pub issues: Vec<Issue>,
}

impl DiscoveryReport {
    /// Total errors counted
    pub fn error_count(&self) -> usize {
        self.issues.len()
    }

    /// True when the run counted no errors
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Wall-clock run time
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Issues of one kind
    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::SchemaKind;

    const DESCRIPTOR: SchemaDescriptor =
        SchemaDescriptor::new("<system/>", "urn:nokia.com:sros:ns:yang:sr:state:system");

    #[test]
    fn test_result_document_from_descriptor() {
        let doc = ResultDocument::new(&DESCRIPTOR, Some("<state/>".to_string()));
        assert_eq!(doc.element(), "<system/>");
        assert_eq!(doc.namespace(), DESCRIPTOR.namespace());
        assert_eq!(doc.content(), Some("<state/>"));

        let empty = ResultDocument::new(&DESCRIPTOR, None);
        assert_eq!(empty.content(), None);
    }

    #[test]
    fn test_issue_log_counts_every_record() {
        let mut log = IssueLog::new();
        assert!(log.is_empty());

        log.mismatch(&Mismatch::SchemaVersion {
            schema: SchemaKind::State,
            expected: "x",
        });
        log.mismatch(&Mismatch::UnsupportedVersion { found: None });
        log.retrieval(&DESCRIPTOR, "timed out", Vec::new());
        log.extraction(&DESCRIPTOR, "truncated");

        assert_eq!(log.len(), 4);
        let kinds: Vec<IssueKind> = log.issues().iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![
                IssueKind::SchemaVersionMismatch,
                IssueKind::UnsupportedVersion,
                IssueKind::Retrieval,
                IssueKind::Extraction,
            ]
        );
    }

    #[test]
    fn test_issue_display() {
        let mut log = IssueLog::new();
        log.retrieval(&DESCRIPTOR, "Timed out after 300s", Vec::new());
        log.connection("refused");
        let issues = log.into_inner();
        assert_eq!(
            issues[0].to_string(),
            "retrieval error on urn:nokia.com:sros:ns:yang:sr:state:system: Timed out after 300s"
        );
        assert_eq!(issues[1].to_string(), "connection error: refused");
    }

    #[test]
    fn test_report_serializes() {
        let now = Utc::now();
        let report = DiscoveryReport {
            run_id: Uuid::new_v4(),
            host: "pe1".to_string(),
            family: Family::Sros,
            version: None,
            catalog: Some("sros-2x"),
            started_at: now,
            finished_at: now,
            documents: vec![ResultDocument::new(&DESCRIPTOR, None)],
            issues: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["family"], "sros");
        assert_eq!(json["documents"][0]["namespace"], DESCRIPTOR.namespace());
        assert!(json["documents"][0]["content"].is_null());
        assert!(report.is_clean());
    }
}
