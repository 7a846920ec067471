//! Display resolution: one label per entry from a list of field paths.
//!
//! Every token yields one fragment; fragments are joined with
//! [`DISPLAY_SEPARATOR`]. Resolution cannot fail. A navigation that cannot be
//! followed falls back to the raw reference value, and a field with no value
//! at the active locale renders according to [`MissingFieldPolicy`].

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::index::ReferenceIndex;
use crate::path::FieldPathToken;
use crate::types::{Entry, FieldValue, ResolvedItem};

/// Joins the fragments of one display label.
pub const DISPLAY_SEPARATOR: &str = " - ";

/// Text written for a missing fragment under [`MissingFieldPolicy::Literal`].
pub const MISSING_LITERAL: &str = "undefined";

/// How a field with no value at the active locale is rendered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MissingFieldPolicy {
    /// Render the literal text `undefined`.
    #[default]
    Literal,
    /// Render an empty fragment.
    Blank,
}

impl MissingFieldPolicy {
    fn render(self) -> &'static str {
        match self {
            MissingFieldPolicy::Literal => MISSING_LITERAL,
            MissingFieldPolicy::Blank => "",
        }
    }
}

/// Behavior switches for [`DisplayResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Follow `ref.target` tokens through the reference index. When off, such
    /// tokens read a field literally named `ref.target`.
    pub enable_navigation: bool,
    pub on_missing_field: MissingFieldPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            enable_navigation: true,
            on_missing_field: MissingFieldPolicy::Literal,
        }
    }
}

/// Resolves entries to display labels for one fetch.
pub struct DisplayResolver<'a> {
    tokens: &'a [FieldPathToken],
    index: &'a ReferenceIndex<'a>,
    locale: &'a str,
    options: ResolveOptions,
}

impl<'a> DisplayResolver<'a> {
    pub fn new(
        tokens: &'a [FieldPathToken],
        index: &'a ReferenceIndex<'a>,
        locale: &'a str,
        options: ResolveOptions,
    ) -> Self {
        Self {
            tokens,
            index,
            locale,
            options,
        }
    }

    /// Resolve one entry.
    pub fn resolve(&self, entry: &Entry) -> ResolvedItem {
        let display = self
            .tokens
            .iter()
            .map(|token| self.render(self.fragment(entry, token)))
            .collect::<Vec<_>>()
            .join(DISPLAY_SEPARATOR);

        ResolvedItem {
            id: entry.id().to_string(),
            display,
        }
    }

    /// Resolve a whole batch, preserving its order.
    pub fn resolve_all(&self, entries: &[Entry]) -> Vec<ResolvedItem> {
        let items: Vec<ResolvedItem> = entries.iter().map(|entry| self.resolve(entry)).collect();
        debug!(
            items = items.len(),
            tokens = self.tokens.len(),
            locale = self.locale,
            "resolved display labels"
        );
        items
    }

    /// The value one token contributes for one entry.
    pub fn fragment(&self, entry: &Entry, token: &FieldPathToken) -> FieldValue {
        match token {
            FieldPathToken::Plain(name) => entry.field(name, self.locale),
            FieldPathToken::Navigate { .. } if !self.options.enable_navigation => {
                entry.field(&token.raw(), self.locale)
            }
            FieldPathToken::Navigate { reference, target } => {
                self.navigate(entry, reference, target)
            }
        }
    }

    fn navigate(&self, entry: &Entry, reference: &str, target: &str) -> FieldValue {
        let id = match entry.field(reference, self.locale) {
            FieldValue::Reference(id) => id,
            _ => {
                trace!(
                    entry = entry.id(),
                    field = reference,
                    "navigation field is not a reference"
                );
                return FieldValue::Missing;
            }
        };

        let resolved = self
            .index
            .get(&id)
            .map(|referenced| referenced.field(target, self.locale))
            .filter(|value| !value.is_missing());

        match resolved {
            Some(value) => value,
            None => {
                trace!(
                    entry = entry.id(),
                    reference = %id,
                    target_field = target,
                    "navigation unresolved, using raw reference"
                );
                FieldValue::Reference(id)
            }
        }
    }

    fn render(&self, value: FieldValue) -> String {
        value
            .to_display()
            .unwrap_or_else(|| self.options.on_missing_field.render().to_string())
    }
}
