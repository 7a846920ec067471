//! Core entry and value types.
//!
//! Entries use the content delivery wire shape: a `sys` block carrying the id
//! and a `fields` map keyed by field name, then by locale. Raw JSON values are
//! classified into [`FieldValue`] at read time so resolution never has to
//! inspect object shapes itself.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `linkType` written for links that point at entries.
pub const ENTRY_LINK_TYPE: &str = "Entry";

/// `type` carried by every link object.
pub const LINK_TYPE: &str = "Link";

/// The `sys` block of a link: `{ "id", "linkType", "type" }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(default = "default_link_type")]
    pub link_type: String,
    #[serde(rename = "type", default = "default_type")]
    pub type_: String,
}

fn default_link_type() -> String {
    ENTRY_LINK_TYPE.to_string()
}

fn default_type() -> String {
    LINK_TYPE.to_string()
}

/// A reference to another entry (or content type), as persisted by the field store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub sys: LinkSys,
}

impl Link {
    /// Build an entry link for the given id.
    pub fn entry(id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                id: id.into(),
                link_type: ENTRY_LINK_TYPE.to_string(),
                type_: LINK_TYPE.to_string(),
            },
        }
    }

    /// The id this link points at.
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn is_entry_link(&self) -> bool {
        self.sys.link_type == ENTRY_LINK_TYPE && self.sys.type_ == LINK_TYPE
    }
}

/// The `sys` block of an entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrySys {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(
        rename = "contentType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<Link>,
}

/// A content entry: an id plus localized field values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: HashMap<String, HashMap<String, Value>>,
}

impl Entry {
    /// Create an empty entry with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            sys: EntrySys {
                id: id.into(),
                type_: Some("Entry".to_string()),
                content_type: None,
            },
            fields: HashMap::new(),
        }
    }

    /// Set the content type link.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let mut link = Link::entry(content_type);
        link.sys.link_type = "ContentType".to_string();
        self.sys.content_type = Some(link);
        self
    }

    /// Set a field value at one locale.
    pub fn with_field(
        mut self,
        name: impl Into<String>,
        locale: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.fields
            .entry(name.into())
            .or_default()
            .insert(locale.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn content_type_id(&self) -> Option<&str> {
        self.sys.content_type.as_ref().map(Link::id)
    }

    /// Read a field at a locale, classified into a [`FieldValue`].
    ///
    /// A field that does not exist, or has no value at the locale, is `Missing`.
    pub fn field(&self, name: &str, locale: &str) -> FieldValue {
        self.fields
            .get(name)
            .and_then(|locales| locales.get(locale))
            .map(FieldValue::from_json)
            .unwrap_or(FieldValue::Missing)
    }

    /// Ids of every entry this one links to, across all fields and locales.
    ///
    /// Arrays of links contribute each element.
    pub fn referenced_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        for value in self.fields.values().flat_map(HashMap::values) {
            match value {
                Value::Array(items) => ids.extend(items.iter().filter_map(link_id)),
                other => ids.extend(link_id(other)),
            }
        }
        ids
    }
}

/// Extract `sys.id` from a link-shaped JSON object.
fn link_id(value: &Value) -> Option<&str> {
    value.get("sys")?.get("id")?.as_str()
}

/// A plain value that renders directly into a display fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(text) => f.write_str(text),
            Scalar::Bool(b) => write!(f, "{b}"),
            // f64's own Display drops the ".0" of integral floats at any magnitude
            Scalar::Number(n) => match n.as_f64() {
                Some(x) if n.is_f64() => write!(f, "{x}"),
                _ => write!(f, "{n}"),
            },
        }
    }
}

/// A field value read at one locale.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Scalar),
    /// A link to another entry, by id.
    Reference(String),
    Missing,
}

impl FieldValue {
    /// Classify a raw JSON value.
    ///
    /// Objects carrying a string `sys.id` are references. `null` is missing.
    /// Any other array or object keeps its compact JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::String(s) => FieldValue::Scalar(Scalar::Text(s.clone())),
            Value::Number(n) => FieldValue::Scalar(Scalar::Number(n.clone())),
            Value::Bool(b) => FieldValue::Scalar(Scalar::Bool(*b)),
            Value::Object(_) => match link_id(value) {
                Some(id) => FieldValue::Reference(id.to_string()),
                None => FieldValue::Scalar(Scalar::Text(value.to_string())),
            },
            Value::Array(_) => FieldValue::Scalar(Scalar::Text(value.to_string())),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Natural string form, or `None` when missing. References render as their id.
    pub fn to_display(&self) -> Option<String> {
        match self {
            FieldValue::Scalar(scalar) => Some(scalar.to_string()),
            FieldValue::Reference(id) => Some(id.clone()),
            FieldValue::Missing => None,
        }
    }
}

/// Entries pulled in alongside a bulk fetch through reference expansion.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Includes {
    #[serde(rename = "Entry", default)]
    pub entries: Vec<Entry>,
}

/// The response of a bulk fetch: primary items plus the optional include set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EntryCollection {
    #[serde(default)]
    pub items: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Includes>,
}

impl EntryCollection {
    /// Included entries, empty when the response carried no include set.
    pub fn included_entries(&self) -> &[Entry] {
        self.includes
            .as_ref()
            .map(|includes| includes.entries.as_slice())
            .unwrap_or(&[])
    }
}

/// One entry reduced to its id and display label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedItem {
    pub id: String,
    pub display: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_serializes_with_wire_names() {
        let link = Link::entry("C1");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            json!({ "sys": { "id": "C1", "linkType": "Entry", "type": "Link" } })
        );
    }

    #[test]
    fn link_without_type_fields_defaults_to_entry_link() {
        let link: Link = serde_json::from_value(json!({ "sys": { "id": "C1" } })).unwrap();
        assert_eq!(link.id(), "C1");
        assert!(link.is_entry_link());
    }

    #[test]
    fn entry_parses_delivery_shape() {
        let entry: Entry = serde_json::from_value(json!({
            "sys": {
                "id": "p1",
                "type": "Entry",
                "contentType": { "sys": { "id": "product", "linkType": "ContentType", "type": "Link" } }
            },
            "fields": {
                "title": { "en": "Foo", "de": "Fu" },
                "category": { "en": { "sys": { "id": "C1", "linkType": "Entry", "type": "Link" } } }
            }
        }))
        .unwrap();

        assert_eq!(entry.id(), "p1");
        assert_eq!(entry.content_type_id(), Some("product"));
        assert_eq!(
            entry.field("title", "de"),
            FieldValue::Scalar(Scalar::Text("Fu".into()))
        );
        assert_eq!(
            entry.field("category", "en"),
            FieldValue::Reference("C1".into())
        );
    }

    #[test]
    fn entry_without_fields_block() {
        let entry: Entry = serde_json::from_value(json!({ "sys": { "id": "bare" } })).unwrap();
        assert!(entry.fields.is_empty());
        assert!(entry.field("title", "en").is_missing());
    }

    #[test]
    fn missing_field_and_missing_locale_are_missing() {
        let entry = Entry::new("e").with_field("title", "en", "Foo");
        assert!(entry.field("subtitle", "en").is_missing());
        assert!(entry.field("title", "fr").is_missing());
    }

    #[test]
    fn null_is_missing() {
        assert_eq!(FieldValue::from_json(&Value::Null), FieldValue::Missing);
    }

    #[test]
    fn non_link_object_keeps_json_text() {
        let value = FieldValue::from_json(&json!({ "lat": 1 }));
        assert_eq!(value.to_display().as_deref(), Some(r#"{"lat":1}"#));
    }

    #[test]
    fn numbers_render_in_shortest_form() {
        assert_eq!(FieldValue::from_json(&json!(3)).to_display().unwrap(), "3");
        assert_eq!(FieldValue::from_json(&json!(3.0)).to_display().unwrap(), "3");
        assert_eq!(FieldValue::from_json(&json!(2.5)).to_display().unwrap(), "2.5");
        assert_eq!(FieldValue::from_json(&json!(-7)).to_display().unwrap(), "-7");
    }

    #[test]
    fn large_integral_floats_render_without_fraction() {
        let render = |raw: &str| {
            let value: Value = serde_json::from_str(raw).unwrap();
            FieldValue::from_json(&value).to_display().unwrap()
        };
        assert_eq!(render("999999999999999.0"), "999999999999999");
        assert_eq!(render("1000000000000000.0"), "1000000000000000");
        assert_eq!(render("-1e16"), "-10000000000000000");
        assert_eq!(render("18446744073709551615"), "18446744073709551615");
    }

    #[test]
    fn booleans_and_references_render() {
        assert_eq!(
            FieldValue::from_json(&json!(true)).to_display().unwrap(),
            "true"
        );
        assert_eq!(
            FieldValue::Reference("C1".into()).to_display().unwrap(),
            "C1"
        );
        assert_eq!(FieldValue::Missing.to_display(), None);
    }

    #[test]
    fn referenced_ids_cover_single_and_array_links() {
        let entry = Entry::new("p1")
            .with_field("category", "en", json!({ "sys": { "id": "C1" } }))
            .with_field(
                "tags",
                "en",
                json!([{ "sys": { "id": "T1" } }, { "sys": { "id": "T2" } }, "plain"]),
            )
            .with_field("title", "en", "Foo");

        let mut ids = entry.referenced_ids();
        ids.sort();
        assert_eq!(ids, vec!["C1", "T1", "T2"]);
    }

    #[test]
    fn collection_without_includes() {
        let collection: EntryCollection =
            serde_json::from_value(json!({ "items": [{ "sys": { "id": "a" } }] })).unwrap();
        assert_eq!(collection.items.len(), 1);
        assert!(collection.included_entries().is_empty());
    }

    #[test]
    fn collection_with_entry_includes() {
        let collection: EntryCollection = serde_json::from_value(json!({
            "items": [],
            "includes": { "Entry": [{ "sys": { "id": "C1" } }], "Asset": [] }
        }))
        .unwrap();
        assert_eq!(collection.included_entries().len(), 1);
        assert_eq!(collection.included_entries()[0].id(), "C1");
    }
}
