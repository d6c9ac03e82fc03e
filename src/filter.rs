//! Subtree filter construction.
//!
//! ```text
//! <filter type="subtree">
//!   <state xmlns="{state namespace}">{element template}</state>
//! </filter>
//! ```
//!
//! Pure string composition: the same descriptor always yields a
//! byte-identical payload.

use crate::schema::SchemaDescriptor;

/// Build the `<get>` filter for one descriptor under `state_namespace`
pub fn build_filter(state_namespace: &str, descriptor: &SchemaDescriptor) -> String {
    let state = format!(
        "<state xmlns=\"{state_namespace}\">{}</state>",
        descriptor.element()
    );
    format!("<filter type=\"subtree\">{state}</filter>")
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::schema::{SROS_2X, SROS_STATE_NS};

    #[test]
    fn test_filter_layout() {
        let descriptor = SchemaDescriptor::new("<aaa />", "urn:example:state:aaa");
        assert_eq!(
            build_filter("urn:example:state", &descriptor),
            "<filter type=\"subtree\"><state xmlns=\"urn:example:state\"><aaa /></state></filter>"
        );
    }

    #[test]
    fn test_catalog_filter_uses_state_root() {
        let descriptor = SROS_2X.descriptors()[0];
        let filter = SROS_2X.filter(&descriptor);
        assert!(filter.contains(&format!("<state xmlns=\"{SROS_STATE_NS}\">")));
        assert_eq!(filter, build_filter(SROS_STATE_NS, &descriptor));
    }

    #[test]
    fn test_deterministic_regardless_of_order() {
        let forward: Vec<String> = SROS_2X
            .descriptors()
            .iter()
            .map(|d| SROS_2X.filter(d))
            .collect();
        let backward: Vec<String> = SROS_2X
            .descriptors()
            .iter()
            .rev()
            .map(|d| SROS_2X.filter(d))
            .collect();
        let reversed: Vec<String> = backward.into_iter().rev().collect();
        assert_eq!(forward, reversed);
    }

    proptest! {
        #[test]
        fn prop_filter_is_pure(index in 0usize..43, repeats in 1usize..5) {
            let descriptor = SROS_2X.descriptors()[index];
            let first = SROS_2X.filter(&descriptor);
            for _ in 0..repeats {
                prop_assert_eq!(&SROS_2X.filter(&descriptor), &first);
            }
            prop_assert!(first.contains(descriptor.element()));
        }
    }
}
