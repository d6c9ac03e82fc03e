//! Device families.
//!
//! Each family knows how to recognise its software release in a
//! capability set, which schema revisions it expects, and which catalog
//! to walk for a given release. The CLI picks one with a [`Family`] tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;
use crate::negotiate::{self, Negotiation, SchemaKind, VersionRules};
use crate::protocol::CapabilitySet;
use crate::schema::{Catalog, SROS_2X};

/// Per-family negotiation and catalog selection
pub trait DeviceFamily: Send + Sync {
    /// Family name used in logs and reports
    fn name(&self) -> &'static str;

    /// Release and schema rules
    fn rules(&self) -> &'static VersionRules;

    /// Catalog to walk for `version` (falls back to the default).
    fn catalog_for(&self, version: Option<&str>) -> &'static Catalog;

    /// Apply [`Self::rules`] to a capability set
    fn negotiate(&self, capabilities: &CapabilitySet) -> Negotiation {
        negotiate::negotiate(capabilities, self.rules())
    }
}

/// Nokia SR OS release token prefix
pub const SROS_VERSION_PREFIX: &str = "urn:nokia.com:sros:ns:yang:sr:major-release-";

/// SR OS releases the compiled-in catalogs match
pub const SROS_SUPPORTED_RELEASES: [&str; 2] = [
    "urn:nokia.com:sros:ns:yang:sr:major-release-21",
    "urn:nokia.com:sros:ns:yang:sr:major-release-22",
];

/// SR OS configuration schema revision
pub const SROS_CONF_SCHEMA: &str =
    "urn:nokia.com:sros:ns:yang:sr:conf?module=nokia-conf&revision=2019-12-03";

/// SR OS state schema revision
pub const SROS_STATE_SCHEMA: &str =
    "urn:nokia.com:sros:ns:yang:sr:state?module=nokia-state&revision=2019-12-03";

static SROS_RULES: VersionRules = VersionRules {
    version_prefix: SROS_VERSION_PREFIX,
    supported: &SROS_SUPPORTED_RELEASES,
    required: &[
        (SchemaKind::Config, SROS_CONF_SCHEMA),
        (SchemaKind::State, SROS_STATE_SCHEMA),
    ],
};

/// Nokia SR OS, model-driven management interface
#[derive(Debug, Clone, Copy, Default)]
pub struct Sros;

impl DeviceFamily for Sros {
    fn name(&self) -> &'static str {
        "sros"
    }

    fn rules(&self) -> &'static VersionRules {
        &SROS_RULES
    }

    fn catalog_for(&self, _version: Option<&str>) -> &'static Catalog {
        // Releases 21 and 22 share the 2019-12-03 state tree.
        &SROS_2X
    }
}

/// Device family tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Nokia SR OS
    #[default]
    Sros,
}

impl Family {
    /// All known families
    pub const ALL: [Family; 1] = [Family::Sros];

    /// Get descriptive name.
    pub fn name(&self) -> &'static str {
        self.driver().name()
    }

    /// Implementation for this family
    pub fn driver(&self) -> &'static dyn DeviceFamily {
        match self {
            Self::Sros => &Sros,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Family {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sros" | "nokia" | "nokia-sros" => Ok(Self::Sros),
            _ => Err(DiscoveryError::UnknownFamily(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sros_caps(release: &str) -> CapabilitySet {
        CapabilitySet::new([
            "urn:ietf:params:netconf:base:1.0",
            release,
            SROS_CONF_SCHEMA,
            SROS_STATE_SCHEMA,
        ])
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("sros".parse::<Family>().unwrap(), Family::Sros);
        assert_eq!("Nokia".parse::<Family>().unwrap(), Family::Sros);
        assert!(matches!(
            "junos".parse::<Family>(),
            Err(DiscoveryError::UnknownFamily(name)) if name == "junos"
        ));
    }

    #[test]
    fn test_family_display() {
        assert_eq!(Family::Sros.to_string(), "sros");
        assert_eq!(Family::default(), Family::Sros);
    }

    #[test]
    fn test_sros_release_21_negotiates_cleanly() {
        let negotiation = Sros.negotiate(&sros_caps(SROS_SUPPORTED_RELEASES[0]));
        assert!(negotiation.supported);
        assert!(negotiation.mismatches.is_empty());
        assert_eq!(negotiation.version.as_deref(), Some(SROS_SUPPORTED_RELEASES[0]));
    }

    #[test]
    fn test_sros_release_22_negotiates_cleanly() {
        let negotiation = Family::Sros.driver().negotiate(&sros_caps(SROS_SUPPORTED_RELEASES[1]));
        assert!(negotiation.supported);
        assert!(negotiation.mismatches.is_empty());
    }

    #[test]
    fn test_sros_old_release_falls_back_to_default_catalog() {
        let caps = sros_caps("urn:nokia.com:sros:ns:yang:sr:major-release-19");
        let negotiation = Sros.negotiate(&caps);
        assert!(!negotiation.supported);
        assert_eq!(negotiation.mismatches.len(), 1);
        assert_eq!(Sros.catalog_for(negotiation.version.as_deref()).name(), "sros-2x");
        assert_eq!(Sros.catalog_for(None).len(), 43);
    }
}
