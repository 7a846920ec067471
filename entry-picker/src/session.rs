//! PickerSession - drives one picker from mount to teardown
//!
//! A session owns the selection sync state and wires it to the two external
//! collaborators. The host calls `start` once, forwards user choices through
//! `on_user_select`, and calls `stop` on teardown. External changes arrive
//! through the store subscription attached by `start`, or directly through
//! `on_external_change`.
//!
//! Every fetch is tagged with the session generation. `stop` bumps the
//! generation, so a fetch that completes afterwards is discarded instead of
//! racing the teardown. Lifecycle, generation and the subscription slot share
//! one lock, and a fetch result is applied while holding it.

use std::sync::{Arc, Mutex};

use entry_picker_fields::{
    sort_items, DisplayResolver, EntryCollection, Link, Locales, ReferenceIndex, ResolvedItem,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PickerOptions;
use crate::error::{PickerError, Result};
use crate::source::{EntryQuery, EntrySource};
use crate::store::{lock, FieldStore, Subscription};
use crate::sync::{SelectionSync, StoreWrite, SyncEvent, SyncPhase};

/// Label of the leading option that clears the field
pub const BLANK_OPTION_LABEL: &str = "---";

/// One choice as presented to the user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickerOption {
    /// Entry id, or `None` for the blank option
    pub value: Option<String>,
    pub label: String,
}

impl PickerOption {
    pub fn blank() -> Self {
        Self {
            value: None,
            label: BLANK_OPTION_LABEL.to_string(),
        }
    }
}

impl From<&ResolvedItem> for PickerOption {
    fn from(item: &ResolvedItem) -> Self {
        Self {
            value: Some(item.id.clone()),
            label: item.display.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Started,
    Stopped,
}

struct Control {
    lifecycle: Lifecycle,
    generation: u64,
    subscription: Option<Subscription>,
}

/// A running entry picker
pub struct PickerSession {
    options: PickerOptions,
    locale: String,
    store: Arc<dyn FieldStore>,
    source: Arc<dyn EntrySource>,
    sync: Arc<Mutex<SelectionSync>>,
    control: Mutex<Control>,
}

impl PickerSession {
    /// Create a session, seeding the selection from the store's current value
    pub fn new(
        options: PickerOptions,
        locales: &Locales,
        store: Arc<dyn FieldStore>,
        source: Arc<dyn EntrySource>,
    ) -> Self {
        let locale = locales.select(options.locale.as_deref()).to_string();
        let initial = store.get_value();
        debug!(
            content_type = %options.content_type,
            locale = %locale,
            initial = ?initial.as_ref().map(Link::id),
            "picker session created"
        );

        Self {
            options,
            locale,
            store,
            source,
            sync: Arc::new(Mutex::new(SelectionSync::new(initial.as_ref()))),
            control: Mutex::new(Control {
                lifecycle: Lifecycle::Created,
                generation: 0,
                subscription: None,
            }),
        }
    }

    /// Attach the change subscription and run the single fetch.
    ///
    /// A fetch failure or timeout leaves the session in [`SyncPhase::Failed`]
    /// and is returned. A result that arrives after [`stop`](Self::stop) is
    /// discarded and reported as [`PickerError::Stopped`].
    pub async fn start(&self) -> Result<()> {
        let generation = {
            let mut control = lock(&self.control);
            match control.lifecycle {
                Lifecycle::Created => control.lifecycle = Lifecycle::Started,
                Lifecycle::Started => return Err(PickerError::AlreadyStarted),
                Lifecycle::Stopped => return Err(PickerError::Stopped),
            }
            control.generation
        };

        self.attach()?;

        let query = self.options.query();
        info!(
            content_type = %query.content_type,
            limit = query.limit,
            include = query.include,
            "fetching published entries"
        );
        let outcome = self
            .fetch(&query)
            .await
            .map(|response| self.resolve(&response));
        let current = self.store.get_value();

        // Generation check and apply happen under the lock stop() takes
        let control = lock(&self.control);
        if control.generation != generation || control.lifecycle == Lifecycle::Stopped {
            debug!(generation, "discarding fetch result of stopped session");
            return Err(PickerError::Stopped);
        }

        let mut sync = lock(&self.sync);
        match outcome {
            Ok(items) => {
                info!(items = items.len(), "picker loaded");
                sync.apply(SyncEvent::FetchCompleted { items, current });
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "fetching entries failed");
                sync.apply(SyncEvent::FetchFailed {
                    reason: err.to_string(),
                });
                Err(err)
            }
        }
    }

    /// Record a change made by another actor
    pub fn on_external_change(&self, value: Option<Link>) {
        debug!(id = ?value.as_ref().map(Link::id), "external selection change");
        lock(&self.sync).apply(SyncEvent::ExternalChanged(value));
    }

    /// Apply a user choice locally, then write it to the field store.
    ///
    /// `None` or an empty id clears the field. Store failures are returned
    /// as-is; the local selection keeps the user's choice.
    pub async fn on_user_select(&self, id: Option<&str>) -> Result<()> {
        if self.is_stopped() {
            return Err(PickerError::Stopped);
        }

        let write = lock(&self.sync).apply(SyncEvent::UserSelected(id.map(str::to_string)));
        match write {
            Some(StoreWrite::Set(link)) => {
                debug!(id = link.id(), "writing selection");
                self.store.set_value(link).await
            }
            Some(StoreWrite::Remove) => {
                debug!("clearing selection");
                self.store.remove_value().await
            }
            None => Ok(()),
        }
    }

    /// Detach from the store and invalidate any in-flight fetch
    pub fn stop(&self) {
        let subscription = {
            let mut control = lock(&self.control);
            control.lifecycle = Lifecycle::Stopped;
            control.generation += 1;
            control.subscription.take()
        };
        if let Some(subscription) = subscription {
            subscription.detach();
        }
        info!(content_type = %self.options.content_type, "picker session stopped");
    }

    pub fn phase(&self) -> SyncPhase {
        lock(&self.sync).phase().clone()
    }

    pub fn selected(&self) -> Option<String> {
        lock(&self.sync).selected().map(str::to_string)
    }

    pub fn items(&self) -> Vec<ResolvedItem> {
        lock(&self.sync).items().to_vec()
    }

    /// Presentable choices, with the blank option first when configured
    pub fn options(&self) -> Vec<PickerOption> {
        let sync = lock(&self.sync);
        let blank = self.options.include_blank_option.then(PickerOption::blank);
        blank
            .into_iter()
            .chain(sync.items().iter().map(PickerOption::from))
            .collect()
    }

    /// Locale key used for every field read
    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn settings(&self) -> &PickerOptions {
        &self.options
    }

    pub fn is_stopped(&self) -> bool {
        lock(&self.control).lifecycle == Lifecycle::Stopped
    }

    /// Subscribe to external changes. A stop that raced the subscribe call
    /// detaches the new subscription here.
    fn attach(&self) -> Result<()> {
        let sync = Arc::clone(&self.sync);
        let subscription = self.store.on_value_changed(Arc::new(move |value: Option<Link>| {
            debug!(id = ?value.as_ref().map(Link::id), "field changed by another actor");
            lock(&sync).apply(SyncEvent::ExternalChanged(value));
        }));

        let mut control = lock(&self.control);
        if control.lifecycle == Lifecycle::Stopped {
            drop(control);
            subscription.detach();
            debug!("session stopped while subscribing");
            return Err(PickerError::Stopped);
        }
        control.subscription = Some(subscription);
        Ok(())
    }

    async fn fetch(&self, query: &EntryQuery) -> Result<EntryCollection> {
        let request = self.source.get_published_entries(query);
        match self.options.fetch_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| PickerError::FetchTimeout {
                    elapsed_ms: limit.as_millis() as u64,
                })?,
            None => request.await,
        }
    }

    fn resolve(&self, response: &EntryCollection) -> Vec<ResolvedItem> {
        let index = ReferenceIndex::build(response.included_entries());
        let resolver =
            DisplayResolver::new(&self.options.fields, &index, &self.locale, self.options.resolve);
        let mut items = resolver.resolve_all(&response.items);
        sort_items(&mut items, self.options.sort);
        items
    }
}

impl Drop for PickerSession {
    fn drop(&mut self) {
        // Detach even when the host never called stop
        if let Some(subscription) = lock(&self.control).subscription.take() {
            subscription.detach();
        }
    }
}
