//! Device capability sets.
//!
//! A capability set is the list of URIs the device advertises in its
//! `<hello>`. Order is preserved exactly as advertised because version
//! selection is first-match in iteration order.

use serde::{Deserialize, Serialize};

use super::{BASE_1_0, BASE_1_1};

/// Capabilities advertised by a NETCONF peer, in advertised order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet {
    uris: Vec<String>,
}

impl CapabilitySet {
    /// Create from capability URIs, keeping their order
    pub fn new<I, S>(uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            uris: uris.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate capabilities in advertised order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.uris.iter().map(String::as_str)
    }

    /// Exact membership test
    pub fn contains(&self, uri: &str) -> bool {
        self.uris.iter().any(|u| u == uri)
    }

    /// First capability containing `token` as a substring
    pub fn find_containing(&self, token: &str) -> Option<&str> {
        self.iter().find(|uri| uri.contains(token))
    }

    /// Number of advertised capabilities
    pub fn len(&self) -> usize {
        self.uris.len()
    }

    /// True when nothing was advertised
    pub fn is_empty(&self) -> bool {
        self.uris.is_empty()
    }

    /// Peer speaks base:1.0 framing
    pub fn supports_base_1_0(&self) -> bool {
        self.contains(BASE_1_0)
    }

    /// Peer speaks base:1.1 chunked framing
    pub fn supports_base_1_1(&self) -> bool {
        self.contains(BASE_1_1)
    }
}

impl<S: Into<String>> FromIterator<S> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_advertised_order() {
        let caps = CapabilitySet::new(["b", "a", "c"]);
        let order: Vec<&str> = caps.iter().collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_find_containing_is_first_match() {
        let caps = CapabilitySet::new(["x:release-22", "x:release-21"]);
        assert_eq!(caps.find_containing("release-"), Some("x:release-22"));
        assert_eq!(caps.find_containing("release-9"), None);
    }

    #[test]
    fn test_contains_is_exact() {
        let caps = CapabilitySet::new([BASE_1_1]);
        assert!(caps.supports_base_1_1());
        assert!(!caps.supports_base_1_0());
        assert!(!caps.contains("urn:ietf:params:netconf:base"));
    }
}
