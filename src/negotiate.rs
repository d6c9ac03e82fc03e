//! Capability-based version negotiation.
//!
//! The device's `<hello>` tells us its software release and the YANG
//! schema revisions it runs. We don't parse the schemas, but the catalog
//! only matches the tree layout of known revisions, so every gap between
//! what the device advertises and what the catalog expects is reported.
//!
//! None of this stops discovery: an unknown or unsupported release falls
//! back to the family's default catalog and the run continues best-effort.

use std::fmt;

use serde::Serialize;

use crate::protocol::CapabilitySet;

/// Which YANG schema a required capability pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Configuration tree
    Config,
    /// Operational state tree
    State,
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::State => write!(f, "state"),
        }
    }
}

/// Negotiation rules for one device family.
#[derive(Debug, Clone, Copy)]
pub struct VersionRules {
    /// Token marking the release capability
    pub version_prefix: &'static str,
    /// Release capabilities the catalogs were built against
    pub supported: &'static [&'static str],
    /// Schema revision capabilities that must be present
    pub required: &'static [(SchemaKind, &'static str)],
}

/// A difference between the device and what discovery expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Release capability missing or not in the allow-list
    UnsupportedVersion {
        /// Release capability found, if any
        found: Option<String>,
    },
    /// Required schema revision not advertised
    SchemaVersion {
        /// Schema the revision belongs to
        schema: SchemaKind,
        /// Capability that was expected
        expected: &'static str,
    },
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found: Some(found) } => {
                write!(f, "incompatible OS version {found}")
            },
            Self::UnsupportedVersion { found: None } => write!(f, "unknown OS version"),
            Self::SchemaVersion { schema, expected } => {
                write!(f, "incompatible {schema} schema version, expected {expected}")
            },
        }
    }
}

/// Outcome of [`check_compatibility`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compatibility {
    /// Release is in the allow-list
    pub supported: bool,
    /// Missing schema revisions, in rule order
    pub mismatches: Vec<Mismatch>,
}

/// Outcome of [`negotiate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negotiation {
    /// Release capability selected
    pub version: Option<String>,
    /// Release is in the allow-list
    pub supported: bool,
    /// Everything to report, unsupported release first
    pub mismatches: Vec<Mismatch>,
}

/// First capability containing `prefix`, in advertised order.
///
/// Devices listing several release tokens may match differently
/// depending on their advertised order; that is accepted.
pub fn select_version<'a>(capabilities: &'a CapabilitySet, prefix: &str) -> Option<&'a str> {
    capabilities.find_containing(prefix)
}

/// Check a release against the allow-list and required schema revisions
pub fn check_compatibility(
    version: Option<&str>,
    capabilities: &CapabilitySet,
    rules: &VersionRules,
) -> Compatibility {
    let supported = version.is_some_and(|v| rules.supported.iter().any(|s| v.contains(s)));

    let mismatches = rules
        .required
        .iter()
        .filter(|(_, uri)| !capabilities.contains(uri))
        .map(|&(schema, expected)| Mismatch::SchemaVersion { schema, expected })
        .collect();

    Compatibility {
        supported,
        mismatches,
    }
}

/// Select the release and collect every mismatch
pub fn negotiate(capabilities: &CapabilitySet, rules: &VersionRules) -> Negotiation {
    let version = select_version(capabilities, rules.version_prefix);
    let Compatibility {
        supported,
        mismatches: schema_mismatches,
    } = check_compatibility(version, capabilities, rules);

    let mut mismatches = Vec::with_capacity(schema_mismatches.len() + 1);
    if !supported {
        mismatches.push(Mismatch::UnsupportedVersion {
            found: version.map(str::to_string),
        });
    }
    mismatches.extend(schema_mismatches);

    Negotiation {
        version: version.map(str::to_string),
        supported,
        mismatches,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    const RULES: VersionRules = VersionRules {
        version_prefix: "vendor:major-release-",
        supported: &["vendor:major-release-21", "vendor:major-release-22"],
        required: &[
            (SchemaKind::Config, "vendor:conf?revision=2019-12-03"),
            (SchemaKind::State, "vendor:state?revision=2019-12-03"),
        ],
    };

    fn caps(uris: &[&str]) -> CapabilitySet {
        CapabilitySet::new(uris.iter().copied())
    }

    #[test]
    fn test_supported_release_with_all_schemas() {
        let set = caps(&[
            "vendor:major-release-21",
            "vendor:conf?revision=2019-12-03",
            "vendor:state?revision=2019-12-03",
        ]);

        let version = select_version(&set, RULES.version_prefix);
        assert_eq!(version, Some("vendor:major-release-21"));

        let compat = check_compatibility(version, &set, &RULES);
        assert!(compat.supported);
        assert!(compat.mismatches.is_empty());
    }

    #[test]
    fn test_missing_state_schema_is_one_mismatch() {
        let set = caps(&["vendor:major-release-22", "vendor:conf?revision=2019-12-03"]);
        let compat = check_compatibility(select_version(&set, RULES.version_prefix), &set, &RULES);

        assert!(compat.supported);
        assert_eq!(
            compat.mismatches,
            vec![Mismatch::SchemaVersion {
                schema: SchemaKind::State,
                expected: "vendor:state?revision=2019-12-03",
            }]
        );
    }

    #[test]
    fn test_unsupported_release_still_checks_schemas() {
        let negotiation = negotiate(&caps(&["vendor:major-release-19"]), &RULES);

        assert!(!negotiation.supported);
        assert_eq!(negotiation.version.as_deref(), Some("vendor:major-release-19"));
        assert_eq!(negotiation.mismatches.len(), 3);
        assert_eq!(
            negotiation.mismatches[0],
            Mismatch::UnsupportedVersion {
                found: Some("vendor:major-release-19".to_string())
            }
        );
    }

    #[test]
    fn test_unknown_release() {
        let set = caps(&["vendor:conf?revision=2019-12-03", "vendor:state?revision=2019-12-03"]);
        let negotiation = negotiate(&set, &RULES);

        assert_eq!(negotiation.version, None);
        assert!(!negotiation.supported);
        assert_eq!(negotiation.mismatches, vec![Mismatch::UnsupportedVersion { found: None }]);
    }

    #[test]
    fn test_first_release_token_wins() {
        let newer_first = caps(&["vendor:major-release-22", "vendor:major-release-21"]);
        assert_eq!(
            select_version(&newer_first, RULES.version_prefix),
            Some("vendor:major-release-22")
        );

        let older_first = caps(&["vendor:major-release-21", "vendor:major-release-22"]);
        assert_eq!(
            select_version(&older_first, RULES.version_prefix),
            Some("vendor:major-release-21")
        );
    }

    #[test]
    fn test_mismatch_display() {
        let m = Mismatch::SchemaVersion {
            schema: SchemaKind::Config,
            expected: "x",
        };
        assert_eq!(m.to_string(), "incompatible config schema version, expected x");
        assert_eq!(
            Mismatch::UnsupportedVersion { found: None }.to_string(),
            "unknown OS version"
        );
    }

    proptest! {
        #[test]
        fn prop_select_version_is_first_match(
            uris in proptest::collection::vec("(vendor:major-release-[0-9]{2}|urn:[a-z]{1,8})", 0..8)
        ) {
            let set = CapabilitySet::new(uris.clone());
            let expected = uris
                .iter()
                .find(|u| u.contains(RULES.version_prefix))
                .map(String::as_str);
            prop_assert_eq!(select_version(&set, RULES.version_prefix), expected);
        }
    }
}
