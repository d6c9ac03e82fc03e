//! State extraction from `<rpc-reply>` documents.
//!
//! Selects `/rpc-reply/data/state` and re-serializes the first match with
//! 4-space indentation and no XML declaration. Element names are matched
//! by local name, so `nc:`-prefixed replies select the same node.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use quick_xml::Writer;

use crate::error::{DiscoveryError, Result};
use crate::protocol::local_name;

/// Path selected from every reply
pub const STATE_PATH: [&str; 3] = ["rpc-reply", "data", "state"];

/// Indentation of the serialized subtree
pub const INDENT: usize = 4;

/// Extract the state subtree from a raw reply.
///
/// `Ok(None)` when the reply has no `/rpc-reply/data/state` (sparse
/// subtrees come back as an empty `<data/>`). `Err(Extraction)` only when
/// the document cannot be read at all.
pub fn extract(raw: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut found: Option<String> = None;
    // (writer, depth at which the captured <state> opened)
    let mut capture: Option<(Writer<Vec<u8>>, usize)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            DiscoveryError::Extraction(format!(
                "malformed reply at byte {}: {e}",
                reader.buffer_position()
            ))
        })?;

        match event {
            Event::Eof => break,
            Event::Decl(_) => continue,
            Event::Start(ref e) => {
                saw_root = true;
                path.push(local_name(e));
                if capture.is_none() && found.is_none() && path == STATE_PATH {
                    capture = Some((Writer::new_with_indent(Vec::new(), b' ', INDENT), path.len()));
                }
            },
            Event::Empty(ref e) => {
                saw_root = true;
                path.push(local_name(e));
                if capture.is_none() && found.is_none() && path == STATE_PATH {
                    let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);
                    write(&mut writer, event.borrow())?;
                    found = Some(into_text(writer)?);
                }
                path.pop();
                if let Some((writer, _)) = capture.as_mut() {
                    write(writer, event.borrow())?;
                }
                continue;
            },
            Event::End(_) => {
                let closing = path.len();
                path.pop();
                if let Some((writer, depth)) = capture.as_mut() {
                    write(writer, event.borrow())?;
                    if closing == *depth {
                        if let Some((writer, _)) = capture.take() {
                            found = Some(into_text(writer)?);
                        }
                    }
                }
                continue;
            },
            _ => {},
        }

        if let Some((writer, _)) = capture.as_mut() {
            write(writer, event.borrow())?;
        }
    }

    if !saw_root {
        return Err(DiscoveryError::Extraction("reply has no root element".to_string()));
    }
    if !path.is_empty() {
        return Err(DiscoveryError::Extraction(format!(
            "reply truncated inside <{}>",
            path.join("/")
        )));
    }

    Ok(found)
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| DiscoveryError::Extraction(format!("failed to serialize state: {e}")))
}

fn into_text(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner())
        .map_err(|e| DiscoveryError::Extraction(format!("state is not UTF-8: {e}")))
}
