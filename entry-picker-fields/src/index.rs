//! Reference index over the include set of one fetch.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::types::Entry;

/// Lookup from entry id to included entry.
///
/// Built once per fetch and never mutated afterwards. When the include set
/// carries the same id twice, the first occurrence wins.
#[derive(Debug, Default)]
pub struct ReferenceIndex<'a> {
    by_id: HashMap<&'a str, &'a Entry>,
}

impl<'a> ReferenceIndex<'a> {
    /// Index every included entry.
    pub fn build(includes: &'a [Entry]) -> Self {
        let mut by_id = HashMap::with_capacity(includes.len());
        for entry in includes {
            if by_id.contains_key(entry.id()) {
                trace!(id = entry.id(), "duplicate included entry ignored");
                continue;
            }
            by_id.insert(entry.id(), entry);
        }
        debug!(entries = by_id.len(), "reference index built");
        Self { by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a Entry> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
