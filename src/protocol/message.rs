//! NETCONF message construction and parsing.
//!
//! Builds the client `<hello>`, `<get>` and `<close-session>` envelopes and
//! reads the server `<hello>` and `<rpc-reply>` documents. Element matching
//! is by local name so prefixed (`nc:rpc-reply`) and default-namespace
//! documents read the same.

use std::fmt;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use super::capabilities::CapabilitySet;
use super::{BASE_1_0, BASE_1_1, NETCONF_NS};
use crate::error::{DiscoveryError, Result};

/// Build the client `<hello>`; advertises both framings.
pub fn client_hello() -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <hello xmlns=\"{NETCONF_NS}\"><capabilities>\
         <capability>{BASE_1_0}</capability>\
         <capability>{BASE_1_1}</capability>\
         </capabilities></hello>"
    )
}

/// Build a `<get>` RPC carrying `filter`
pub fn get_rpc(message_id: u64, filter: &str) -> String {
    format!("<rpc message-id=\"{message_id}\" xmlns=\"{NETCONF_NS}\"><get>{filter}</get></rpc>")
}

/// Build a `<close-session>` RPC
pub fn close_session_rpc(message_id: u64) -> String {
    format!("<rpc message-id=\"{message_id}\" xmlns=\"{NETCONF_NS}\"><close-session/></rpc>")
}

/// Server `<hello>` contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHello {
    /// Advertised capabilities, in order
    pub capabilities: CapabilitySet,
    /// Session ID assigned by the server
    pub session_id: Option<u32>,
}

impl ServerHello {
    /// Parse a server `<hello>` document
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);

        let mut path: Vec<String> = Vec::new();
        let mut capabilities = Vec::new();
        let mut session_id = None;
        let mut saw_hello = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    let name = local_name(&e);
                    if path.is_empty() {
                        if name != "hello" {
                            return Err(DiscoveryError::Protocol(format!(
                                "expected <hello>, got <{name}>"
                            )));
                        }
                        saw_hello = true;
                    }
                    path.push(name);
                },
                Event::Empty(e) => {
                    if path.is_empty() {
                        return Err(DiscoveryError::Protocol(format!(
                            "expected <hello>, got <{}/>",
                            local_name(&e)
                        )));
                    }
                },
                Event::End(_) => {
                    path.pop();
                },
                Event::Text(t) => {
                    let text = t.unescape()?;
                    match path.last().map(String::as_str) {
                        Some("capability") => capabilities.push(text.trim().to_string()),
                        Some("session-id") => {
                            session_id = Some(text.trim().parse().map_err(|_| {
                                DiscoveryError::Protocol(format!("invalid session-id {text:?}"))
                            })?);
                        },
                        _ => {},
                    }
                },
                Event::Eof => break,
                _ => {},
            }
        }

        if !saw_hello {
            return Err(DiscoveryError::Protocol("empty hello message".to_string()));
        }

        Ok(Self {
            capabilities: CapabilitySet::new(capabilities),
            session_id,
        })
    }
}

/// One `<rpc-error>` from a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    /// `error-type` (transport, rpc, protocol, application)
    pub error_type: String,
    /// `error-tag`, e.g. `operation-failed`
    pub tag: String,
    /// `error-severity` (error or warning)
    pub severity: String,
    /// `error-message`
    pub message: String,
    /// Flattened `error-info` (falls back to `error-path`)
    pub info: Option<String>,
}

impl RpcError {
    /// Error kind reported in logs
    pub fn kind(&self) -> &str {
        &self.tag
    }

    /// Error value reported in logs
    pub fn value(&self) -> &str {
        self.info.as_deref().unwrap_or("")
    }

    /// Warnings do not fail an RPC
    pub fn is_error(&self) -> bool {
        self.severity != "warning"
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\", {} = \"{}\"", self.message, self.kind(), self.value())
    }
}

/// A received `<rpc-reply>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcReply {
    /// `message-id` attribute of the reply
    pub message_id: Option<String>,
    /// Every `<rpc-error>`, warnings included
    pub errors: Vec<RpcError>,
    /// Raw reply document
    pub raw: String,
}

impl RpcReply {
    /// Scan a raw reply for its `message-id` and `<rpc-error>`s.
    ///
    /// Never fails: scanning stops at the first XML error and whatever was
    /// read up to that point is kept. Well-formedness is judged later by
    /// the extractor.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (message_id, errors) = scan_reply(&raw);
        Self {
            message_id,
            errors,
            raw,
        }
    }

    /// Error-severity `<rpc-error>`s only
    pub fn failures(&self) -> Vec<RpcError> {
        self.errors.iter().filter(|e| e.is_error()).cloned().collect()
    }

    /// True when any `<rpc-error>` has error severity
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(RpcError::is_error)
    }
}

fn scan_reply(raw: &str) -> (Option<String>, Vec<RpcError>) {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);

    let mut message_id = None;
    let mut errors = Vec::new();
    let mut current: Option<RpcError> = None;
    let mut path: Vec<String> = Vec::new();
    // depth at which the open <rpc-error> sits
    let mut error_depth = 0;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("rpc-reply scan stopped: {}", e);
                break;
            },
        };

        match event {
            Event::Start(e) => {
                let name = local_name(&e);
                if path.is_empty() && name == "rpc-reply" {
                    message_id = attribute(&e, "message-id");
                }
                if name == "rpc-error" && current.is_none() {
                    current = Some(RpcError::default());
                    error_depth = path.len() + 1;
                }
                path.push(name);
            },
            Event::Empty(e) => {
                let name = local_name(&e);
                if path.is_empty() && name == "rpc-reply" {
                    message_id = attribute(&e, "message-id");
                }
            },
            Event::End(_) => {
                if current.is_some() && path.len() == error_depth {
                    errors.extend(current.take());
                }
                path.pop();
            },
            Event::Text(t) => {
                let Some(error) = current.as_mut() else {
                    continue;
                };
                let Ok(text) = t.unescape() else {
                    continue;
                };
                let text = text.trim().to_string();
                // child of <rpc-error>, or anything nested under <error-info>
                let field = path.get(error_depth).map(String::as_str);
                match field {
                    Some("error-type") => error.error_type = text,
                    Some("error-tag") => error.tag = text,
                    Some("error-severity") => error.severity = text,
                    Some("error-message") => error.message = text,
                    Some("error-path") if error.info.is_none() => error.info = Some(text),
                    Some("error-info") => {
                        let leaf = path.last().map(String::as_str).unwrap_or("error-info");
                        let entry = if leaf == "error-info" {
                            text
                        } else {
                            format!("{leaf}={text}")
                        };
                        error.info = Some(match error.info.take() {
                            Some(prev) if !prev.starts_with('/') => format!("{prev}, {entry}"),
                            _ => entry,
                        });
                    },
                    _ => {},
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }

    (message_id, errors)
}

/// Local (unprefixed) element name
pub(crate) fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn attribute(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
