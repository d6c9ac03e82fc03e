//! Schema catalogs.
//!
//! A catalog is the ordered list of subtree queries that together cover a
//! device family's operational state tree. The full tree is too large for
//! one `<get>`, so discovery walks the catalog one descriptor at a time.
//!
//! Catalogs are compiled in and looked up by name through a `phf` map.

mod sros;

pub use sros::{SROS_2X, SROS_EXCLUDED, SROS_STATE_2019_12_03, SROS_STATE_NS};

use phf::phf_map;
use serde::Serialize;

use crate::filter::build_filter;

/// One subtree query: an element template under the state root, plus the
/// namespace identifying the subtree in results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaDescriptor {
    element: &'static str,
    namespace: &'static str,
}

impl SchemaDescriptor {
    /// Create a descriptor
    pub const fn new(element: &'static str, namespace: &'static str) -> Self {
        Self { element, namespace }
    }

    /// Element template placed inside the state wrapper
    pub const fn element(&self) -> &'static str {
        self.element
    }

    /// Namespace identifying this subtree
    pub const fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Short name for logs: the namespace's last segment
    pub fn label(&self) -> &'static str {
        self.namespace.rsplit(':').next().unwrap_or(self.namespace)
    }
}

/// Named, ordered set of descriptors for one family/version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    name: &'static str,
    state_namespace: &'static str,
    descriptors: &'static [SchemaDescriptor],
    excluded: &'static [SchemaDescriptor],
}

impl Catalog {
    /// Create a catalog
    pub const fn new(
        name: &'static str,
        state_namespace: &'static str,
        descriptors: &'static [SchemaDescriptor],
    ) -> Self {
        Self {
            name,
            state_namespace,
            descriptors,
            excluded: &[],
        }
    }

    /// Record subtrees deliberately left out of the catalog
    pub const fn with_excluded(mut self, excluded: &'static [SchemaDescriptor]) -> Self {
        self.excluded = excluded;
        self
    }

    /// Catalog name
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Namespace of the state wrapper element
    pub const fn state_namespace(&self) -> &'static str {
        self.state_namespace
    }

    /// Descriptors in retrieval order
    pub const fn descriptors(&self) -> &'static [SchemaDescriptor] {
        self.descriptors
    }

    /// Subtrees never queried
    pub const fn excluded(&self) -> &'static [SchemaDescriptor] {
        self.excluded
    }

    /// Number of descriptors
    pub const fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True for an empty catalog
    pub const fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Subtree filter for `descriptor` under this catalog's state root
    pub fn filter(&self, descriptor: &SchemaDescriptor) -> String {
        build_filter(self.state_namespace, descriptor)
    }
}

static CATALOGS: phf::Map<&'static str, &'static Catalog> = phf_map! {
    "sros-2x" => &SROS_2X,
};

/// Look up a catalog by name
pub fn catalog(name: &str) -> Option<&'static Catalog> {
    CATALOGS.get(name).copied()
}

/// Names of all compiled-in catalogs, sorted
pub fn catalog_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CATALOGS.keys().copied().collect();
    names.sort_unstable();
    names
}
