//! Display labels for content entries
//!
//! `entry-picker-fields` turns a batch of fetched entries into presentable
//! `(id, display)` pairs. It is pure and synchronous: no I/O, no errors.
//! Lookup misses degrade to fallback fragments instead of failing.
//!
//! # Pipeline
//!
//! - **Locales**: pick the single locale key every field read uses
//! - **Field paths**: `"title,category.name"` becomes ordered [`FieldPathToken`]s
//! - **Reference index**: included entries keyed by id, for one-hop navigation
//! - **Resolver**: one display string per entry, fragments joined with `" - "`
//! - **Sorter**: optional locale-aware ordering of the resolved items
//!
//! ```
//! use entry_picker_fields::{
//!     parse_field_paths, DisplayResolver, Entry, ReferenceIndex, ResolveOptions,
//! };
//! use serde_json::json;
//!
//! let entry: Entry = serde_json::from_value(json!({
//!     "sys": { "id": "p1" },
//!     "fields": { "title": { "en": "Foo" } }
//! }))
//! .unwrap();
//!
//! let tokens = parse_field_paths("title");
//! let index = ReferenceIndex::default();
//! let resolver = DisplayResolver::new(&tokens, &index, "en", ResolveOptions::default());
//! assert_eq!(resolver.resolve(&entry).display, "Foo");
//! ```

pub mod index;
pub mod locale;
pub mod path;
pub mod resolve;
pub mod sort;
pub mod types;

pub use index::ReferenceIndex;
pub use locale::Locales;
pub use path::{parse_field_paths, FieldPathToken};
pub use resolve::{DisplayResolver, MissingFieldPolicy, ResolveOptions, DISPLAY_SEPARATOR};
pub use sort::{compare_display, sort_items, SortOrder};
pub use types::{
    Entry, EntryCollection, EntrySys, FieldValue, Includes, Link, LinkSys, ResolvedItem, Scalar,
};
