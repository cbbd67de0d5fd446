//! Placeholders for `$ref` targets that are still being loaded.
//!
//! A knot is created when a target starts loading. Every reference to the same target that
//! is met before the load completes waits on the knot instead of loading the target again;
//! finishing the knot hands the waiting references back so their targets can be set.
use ahash::AHashMap;

use crate::schema::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KnotStatus {
    /// The target is fully loaded.
    Loaded(NodeId),
    /// The target is being loaded.
    Pending,
    /// The target was never seen.
    Absent,
}

/// Knots keyed by the canonical location of their target, `<document URI>#<JSON Pointer>`.
#[derive(Debug, Default)]
pub(crate) struct KnotTable {
    pending: AHashMap<String, Vec<NodeId>>,
    loaded: AHashMap<String, NodeId>,
}

impl KnotTable {
    pub(crate) fn status(&self, key: &str) -> KnotStatus {
        if let Some(target) = self.loaded.get(key) {
            KnotStatus::Loaded(*target)
        } else if self.pending.contains_key(key) {
            KnotStatus::Pending
        } else {
            KnotStatus::Absent
        }
    }

    /// Start loading the target under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the target is already loading or loaded.
    pub(crate) fn begin(&mut self, key: String) {
        assert!(
            !self.loaded.contains_key(&key) && !self.pending.contains_key(&key),
            "Knot '{key}' is tied twice"
        );
        tracing::trace!(key = key.as_str(), "Tying knot");
        self.pending.insert(key, Vec::new());
    }

    /// Register `reference` as waiting for the target under `key`.
    ///
    /// # Panics
    ///
    /// Panics if no knot exists for `key`.
    pub(crate) fn wait(&mut self, key: &str, reference: NodeId) {
        match self.pending.get_mut(key) {
            Some(waiting) => waiting.push(reference),
            None => panic!("No pending knot '{key}' for reference {}", reference.index()),
        }
    }

    /// Record the loaded target and return the references waiting for it.
    ///
    /// # Panics
    ///
    /// Panics if the knot does not exist or was already finished.
    pub(crate) fn finish(&mut self, key: &str, target: NodeId) -> Vec<NodeId> {
        let Some(waiting) = self.pending.remove(key) else {
            panic!("Knot '{key}' is resolved twice or was never tied");
        };
        tracing::trace!(key, target = target.index(), waiting = waiting.len(), "Resolving knot");
        self.loaded.insert(key.to_string(), target);
        waiting
    }

    /// Whether every knot was resolved.
    pub(crate) fn is_settled(&self) -> bool {
        self.pending.is_empty()
    }
}
