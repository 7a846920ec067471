//! Field store: the single reference value the picker edits
//!
//! The store is the source of truth for the selection. It is read once
//! synchronously when a session is created, written on user selection, and
//! notifies subscribers when another actor changes the value.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use entry_picker_fields::Link;
use tracing::{debug, trace};

use crate::error::Result;

/// Callback invoked with the new value when the field changes externally
pub type ValueChangedCallback = Arc<dyn Fn(Option<Link>) + Send + Sync>;

/// Handle returned by [`FieldStore::on_value_changed`]
///
/// Detaching (explicitly or by dropping) unsubscribes the callback.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// A subscription with nothing to undo
    pub fn noop() -> Self {
        Self { detach: None }
    }

    pub fn detach(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

/// Storage for one reference field
#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Current value, read synchronously
    fn get_value(&self) -> Option<Link>;

    /// Persist a reference
    async fn set_value(&self, value: Link) -> Result<()>;

    /// Clear the field
    async fn remove_value(&self) -> Result<()>;

    /// Subscribe to changes made by other actors
    fn on_value_changed(&self, callback: ValueChangedCallback) -> Subscription;
}

#[derive(Default)]
struct MemoryInner {
    value: Mutex<Option<Link>>,
    subscribers: Mutex<HashMap<u64, ValueChangedCallback>>,
    next_id: AtomicU64,
}

/// Lock a mutex, recovering the data if a previous holder panicked
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory field store
///
/// Writes through [`FieldStore`] are local and do not notify subscribers.
/// [`MemoryFieldStore::apply_external`] stands in for another actor editing
/// the same field and does notify them.
#[derive(Clone, Default)]
pub struct MemoryFieldStore {
    inner: Arc<MemoryInner>,
}

impl MemoryFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: Link) -> Self {
        let store = Self::new();
        *lock(&store.inner.value) = Some(value);
        store
    }

    /// Change the value as another actor would, notifying subscribers
    pub fn apply_external(&self, value: Option<Link>) {
        *lock(&self.inner.value) = value.clone();

        // Clone callbacks out so none runs while the subscriber map is locked
        let callbacks: Vec<ValueChangedCallback> =
            lock(&self.inner.subscribers).values().cloned().collect();
        debug!(
            subscribers = callbacks.len(),
            id = ?value.as_ref().map(Link::id),
            "external field change"
        );
        for callback in callbacks {
            callback(value.clone());
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner.subscribers).len()
    }
}

impl fmt::Debug for MemoryFieldStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryFieldStore")
            .field("value", &*lock(&self.inner.value))
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[async_trait]
impl FieldStore for MemoryFieldStore {
    fn get_value(&self) -> Option<Link> {
        lock(&self.inner.value).clone()
    }

    async fn set_value(&self, value: Link) -> Result<()> {
        trace!(id = value.id(), "field value set");
        *lock(&self.inner.value) = Some(value);
        Ok(())
    }

    async fn remove_value(&self) -> Result<()> {
        trace!("field value removed");
        *lock(&self.inner.value) = None;
        Ok(())
    }

    fn on_value_changed(&self, callback: ValueChangedCallback) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.inner.subscribers).insert(id, callback);

        let inner: Weak<MemoryInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner.subscribers).remove(&id);
            }
        })
    }
}
