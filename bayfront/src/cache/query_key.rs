//! Structural identifiers for cacheable result sets.

use serde_json::Value;
use std::fmt;

/// A query key names one cacheable result set: a string tag plus an optional
/// filter object, e.g. `["websites", {"include_all": false}]` for the
/// marketplace collection or `["website", {"id": ...}]` for one listing.
///
/// Equality is structural: two keys are the same entry when their tags match
/// and their filter objects are structurally equal, regardless of the key
/// order the filters were built with. Filters are canonicalized at
/// construction time (serde_json's default map is sorted, so serializing a
/// `Value` yields a canonical string at every nesting level), which also gives
/// us a cheap `Hash` impl.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    tag: String,
    params: Option<String>,
}

impl QueryKey {
    /// Key for a whole collection, no filter.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            params: None,
        }
    }

    /// Key for a filtered result set.
    pub fn with_params(tag: impl Into<String>, params: Value) -> Self {
        Self {
            tag: tag.into(),
            params: Some(params.to_string()),
        }
    }

    /// The tag component. Invalidation by prefix matches on this.
    pub fn tag_name(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Some(params) => write!(f, "[{:?}, {}]", self.tag, params),
            None => write!(f, "[{:?}]", self.tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equality_ignores_filter_key_order() {
        let a = QueryKey::with_params("websites", json!({"category": "blog", "include_all": false}));
        let b = QueryKey::with_params("websites", json!({"include_all": false, "category": "blog"}));
        assert_eq!(a, b);

        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn test_different_filters_are_different_keys() {
        let a = QueryKey::with_params("websites", json!({"include_all": false}));
        let b = QueryKey::with_params("websites", json!({"include_all": true}));
        assert_ne!(a, b);
    }

    #[test]
    fn test_bare_tag_differs_from_filtered() {
        assert_ne!(QueryKey::tag("websites"), QueryKey::with_params("websites", json!({})));
    }

    #[test]
    fn test_display_is_readable() {
        let key = QueryKey::with_params("website", json!({"id": 7}));
        assert_eq!(key.to_string(), "[\"website\", {\"id\":7}]");
    }
}
