//! Selection sync state machine
//!
//! Mirrors the field store's reference value as a selected entry id. The
//! machine itself performs no I/O: applying an event may yield a
//! [`StoreWrite`] that the caller forwards to the store.
//!
//! ```text
//! Uninitialized --FetchCompleted--> Loaded
//! Uninitialized --FetchFailed-----> Failed
//! any state     --ExternalChanged-> same state, selection overwritten
//! Loaded        --UserSelected----> Loaded, selection updated, write emitted
//! ```

use entry_picker_fields::{Link, ResolvedItem};
use tracing::{debug, warn};

/// Lifecycle phase of the selection sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncPhase {
    /// No fetch has completed yet
    Uninitialized,
    /// Items are available and the selection is tracked
    Loaded,
    /// The fetch failed; nothing will be loaded in this session
    Failed { reason: String },
}

/// Inputs to the state machine
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    FetchCompleted {
        items: Vec<ResolvedItem>,
        /// Field store value at completion time
        current: Option<Link>,
    },
    FetchFailed {
        reason: String,
    },
    /// The user picked an entry id, or the blank option
    UserSelected(Option<String>),
    /// Another actor changed the field
    ExternalChanged(Option<Link>),
}

/// A write the caller must forward to the field store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreWrite {
    Set(Link),
    Remove,
}

/// Cached selection plus the items it chooses from
#[derive(Debug, Clone)]
pub struct SelectionSync {
    phase: SyncPhase,
    items: Vec<ResolvedItem>,
    selected: Option<String>,
}

impl SelectionSync {
    /// Start uninitialized, pre-seeded with the store's current value
    pub fn new(initial: Option<&Link>) -> Self {
        Self {
            phase: SyncPhase::Uninitialized,
            items: Vec::new(),
            selected: initial.map(|link| link.id().to_string()),
        }
    }

    pub fn phase(&self) -> &SyncPhase {
        &self.phase
    }

    pub fn items(&self) -> &[ResolvedItem] {
        &self.items
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.phase == SyncPhase::Loaded
    }

    /// Apply one event, returning the store write it requires, if any.
    pub fn apply(&mut self, event: SyncEvent) -> Option<StoreWrite> {
        match event {
            SyncEvent::FetchCompleted { items, current } => {
                if self.phase != SyncPhase::Uninitialized {
                    warn!(phase = ?self.phase, "fetch completion ignored");
                    return None;
                }
                debug!(items = items.len(), "selection sync loaded");
                self.items = items;
                self.selected = current.map(|link| link.sys.id);
                self.phase = SyncPhase::Loaded;
                None
            }
            SyncEvent::FetchFailed { reason } => {
                if self.phase != SyncPhase::Uninitialized {
                    warn!(phase = ?self.phase, "fetch failure ignored");
                    return None;
                }
                self.phase = SyncPhase::Failed { reason };
                None
            }
            SyncEvent::UserSelected(id) => {
                if !self.is_loaded() {
                    warn!(phase = ?self.phase, "selection before items loaded ignored");
                    return None;
                }
                let id = id.filter(|id| !id.is_empty());
                self.selected = id.clone();
                Some(match id {
                    Some(id) => StoreWrite::Set(Link::entry(id)),
                    None => StoreWrite::Remove,
                })
            }
            SyncEvent::ExternalChanged(value) => {
                self.selected = value.map(|link| link.sys.id);
                None
            }
        }
    }
}
