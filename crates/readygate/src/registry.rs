//! Loaded-resource registry.
//!
//! A grow-only set of [`ResourceKey`]s consulted before any injection. The
//! check and the insert happen in one call, so a re-entrant request made
//! from inside a continuation during the same turn is still deduplicated.

use std::collections::HashSet;

use crate::resource::ResourceKey;

/// Set of resources already requested during the page's lifetime.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    requested: HashSet<ResourceKey>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`. Returns `true` if this is its first request.
    pub fn mark_requested(&mut self, key: ResourceKey) -> bool {
        self.requested.insert(key)
    }

    /// Whether `key` has been requested.
    #[must_use]
    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.requested.contains(key)
    }

    /// Number of distinct resources requested.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requested.len()
    }

    /// Whether nothing has been requested yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requested.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Scope;

    #[test]
    fn test_first_request_only() {
        let mut registry = Registry::new();
        assert!(registry.mark_requested(ResourceKey::script(Scope::Remote, "a")));
        assert!(!registry.mark_requested(ResourceKey::script(Scope::Remote, "a")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_scope_and_kind_are_part_of_identity() {
        let mut registry = Registry::new();
        assert!(registry.mark_requested(ResourceKey::script(Scope::Remote, "a")));
        assert!(registry.mark_requested(ResourceKey::script(Scope::Local, "a")));
        assert!(registry.mark_requested(ResourceKey::stylesheet(Scope::Remote, "a")));
        assert!(registry.mark_requested(ResourceKey::stylesheet(Scope::Local, "a")));
        assert_eq!(registry.len(), 4);
        assert!(registry.contains(&ResourceKey::stylesheet(Scope::Local, "a")));
        assert!(!registry.contains(&ResourceKey::script(Scope::Local, "b")));
    }
}
