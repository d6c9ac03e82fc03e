//! NETCONF message framing (RFC 6242).
//!
//! # Wire Formats
//!
//! ```text
//! base:1.0  <message>]]>]]>
//! base:1.1  \n#<len>\n<chunk>...\n#<len>\n<chunk>\n##\n
//! ```
//!
//! The `<hello>` exchange always uses end-of-message framing; chunked
//! framing takes over afterwards when both peers advertise base:1.1.

use bytes::{Buf, BytesMut};

use crate::error::{DiscoveryError, Result};

/// base:1.0 end-of-message delimiter
pub const END_OF_MESSAGE: &[u8] = b"]]>]]>";

/// Largest chunk size allowed by RFC 6242
pub const MAX_CHUNK_SIZE: u64 = 4_294_967_295;

/// Message framing mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// `]]>]]>` delimited (base:1.0)
    #[default]
    EndOfMessage,
    /// Length-prefixed chunks (base:1.1)
    Chunked,
}

impl Framing {
    /// Frame a complete message into `out`
    pub fn encode(self, message: &str, out: &mut BytesMut) {
        match self {
            Framing::EndOfMessage => {
                out.extend_from_slice(message.as_bytes());
                out.extend_from_slice(END_OF_MESSAGE);
            },
            Framing::Chunked => {
                if !message.is_empty() {
                    out.extend_from_slice(format!("\n#{}\n", message.len()).as_bytes());
                    out.extend_from_slice(message.as_bytes());
                }
                out.extend_from_slice(b"\n##\n");
            },
        }
    }
}

/// Incremental decoder: feed bytes as they arrive, pull whole messages out.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    framing: Framing,
    buf: BytesMut,
    // bytes of `buf` already searched for `]]>]]>`
    scanned: usize,
    // chunks of the base:1.1 message being assembled
    message: BytesMut,
}

impl FrameDecoder {
    /// Create decoder for the given framing
    pub fn new(framing: Framing) -> Self {
        Self {
            framing,
            buf: BytesMut::with_capacity(8 * 1024),
            scanned: 0,
            message: BytesMut::new(),
        }
    }

    /// Current framing
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Switch framing; buffered bytes are kept and decoded with the new mode
    pub fn set_framing(&mut self, framing: Framing) {
        self.framing = framing;
        self.scanned = 0;
    }

    /// Append received bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes buffered but not yet part of a complete message
    pub fn buffered(&self) -> usize {
        self.buf.len() + self.message.len()
    }

    /// Decode the next complete message, if one is buffered
    pub fn next_message(&mut self) -> Result<Option<String>> {
        match self.framing {
            Framing::EndOfMessage => self.next_eom(),
            Framing::Chunked => self.next_chunked(),
        }
    }

    fn next_eom(&mut self) -> Result<Option<String>> {
        // a delimiter may straddle the previous scan boundary
        let from = self.scanned.saturating_sub(END_OF_MESSAGE.len() - 1);
        let Some(pos) = find(&self.buf[from..], END_OF_MESSAGE).map(|p| from + p) else {
            self.scanned = self.buf.len();
            return Ok(None);
        };

        let message = self.buf.split_to(pos);
        self.buf.advance(END_OF_MESSAGE.len());
        self.scanned = 0;
        to_text(&message).map(Some)
    }

    fn next_chunked(&mut self) -> Result<Option<String>> {
        loop {
            let rest = &self.buf[..];
            if rest.len() < 4 {
                return Ok(None);
            }
            if !rest.starts_with(b"\n#") {
                return Err(DiscoveryError::Framing(format!(
                    "expected chunk header, found {:?}",
                    String::from_utf8_lossy(&rest[..rest.len().min(16)])
                )));
            }
            if rest.starts_with(b"\n##\n") {
                self.buf.advance(4);
                let message = std::mem::take(&mut self.message);
                return to_text(&message).map(Some);
            }

            // \n#<digits>\n
            let digits = &rest[2..];
            let Some(end) = digits.iter().position(|b| *b == b'\n') else {
                if digits.len() > 10 || !digits.iter().all(u8::is_ascii_digit) {
                    return Err(DiscoveryError::Framing("chunk size too long".to_string()));
                }
                return Ok(None);
            };
            let size = parse_chunk_size(&digits[..end])?;
            let header_len = 2 + end + 1;
            let Ok(size) = usize::try_from(size) else {
                return Err(DiscoveryError::Framing(format!("chunk size {size} unsupported")));
            };
            if rest.len() < header_len + size {
                return Ok(None);
            }

            self.buf.advance(header_len);
            let chunk = self.buf.split_to(size);
            self.message.extend_from_slice(&chunk);
        }
    }
}

fn parse_chunk_size(digits: &[u8]) -> Result<u64> {
    let valid = !digits.is_empty()
        && digits[0] != b'0'
        && digits.len() <= 10
        && digits.iter().all(u8::is_ascii_digit);
    if !valid {
        return Err(DiscoveryError::Framing(format!(
            "invalid chunk size {:?}",
            String::from_utf8_lossy(digits)
        )));
    }

    let size: u64 = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| DiscoveryError::Framing("invalid chunk size".to_string()))?;
    if size > MAX_CHUNK_SIZE {
        return Err(DiscoveryError::Framing(format!("chunk size {size} exceeds maximum")));
    }
    Ok(size)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn to_text(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| DiscoveryError::Framing(format!("message is not UTF-8: {e}")))
}
