//! Single-reference entry picker
//!
//! Lists the published entries of one content type with labels built from a
//! field-path specification, and keeps the chosen entry in sync with the
//! field that stores the reference.
//!
//! ## Overview
//!
//! - **Configuration** - `entityname` and `fieldstouse` come from the host;
//!   everything else has defaults and can be layered from files and environment
//! - **Entry source** - one bulk fetch per session, with shallow reference expansion
//! - **Field store** - the reference value is the only durable state
//! - **Selection sync** - local mirror of the store value; external edits always win
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use entry_picker::{ConfigProvider, MemoryEntrySource, MemoryFieldStore, PickerSession};
//! use entry_picker_fields::Locales;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let parameters = json!({ "entityname": "product", "fieldstouse": "title,category.name" });
//! let options = ConfigProvider::new()
//!     .with_parameters(parameters.as_object().cloned().unwrap_or_default())
//!     .load_options()?;
//!
//! let store = Arc::new(MemoryFieldStore::new());
//! let source = Arc::new(MemoryEntrySource::default());
//! let session = PickerSession::new(options, &Locales::new("en-US"), store, source);
//!
//! session.start().await?;
//! for option in session.options() {
//!     println!("{:?} {}", option.value, option.label);
//! }
//! session.on_user_select(Some("5KsDBWseXY6QegucYAoacS")).await?;
//! session.stop();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod source;
pub mod store;
pub mod sync;

pub use config::{ConfigProvider, PickerConfig, PickerOptions, MAX_ENTRY_LIMIT};
pub use error::{PickerError, Result};
pub use session::{PickerOption, PickerSession, BLANK_OPTION_LABEL};
pub use source::{EntryQuery, EntrySource, MemoryEntrySource};
pub use store::{FieldStore, MemoryFieldStore, Subscription, ValueChangedCallback};
pub use sync::{SelectionSync, StoreWrite, SyncEvent, SyncPhase};

// Re-export for implementors of the collaborator traits
pub use async_trait::async_trait;
pub use entry_picker_fields::{Entry, EntryCollection, Link};
