//! Field-path specifications.
//!
//! A specification is a comma-separated list such as `"title,category.name"`.
//! Parsing never fails: segments are kept verbatim (no trimming, empty
//! segments included) and anything malformed simply resolves to nothing.

use std::fmt;

/// Separator between the reference field and the target field of a navigation.
pub const NAVIGATION_SEPARATOR: char = '.';

/// One parsed unit of a field-path specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldPathToken {
    /// Read a field directly from the entry.
    Plain(String),
    /// Follow a reference field one hop and read a field on the target.
    Navigate { reference: String, target: String },
}

impl FieldPathToken {
    /// Classify one raw segment.
    ///
    /// Exactly one separator with non-empty names on both sides is a navigation;
    /// everything else is a plain field name.
    pub fn parse(segment: &str) -> Self {
        let mut parts = segment.split(NAVIGATION_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(reference), Some(target), None) if !reference.is_empty() && !target.is_empty() => {
                FieldPathToken::Navigate {
                    reference: reference.to_string(),
                    target: target.to_string(),
                }
            }
            _ => FieldPathToken::Plain(segment.to_string()),
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, FieldPathToken::Navigate { .. })
    }

    /// The segment as it appeared in the specification.
    pub fn raw(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldPathToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPathToken::Plain(name) => f.write_str(name),
            FieldPathToken::Navigate { reference, target } => {
                write!(f, "{reference}{NAVIGATION_SEPARATOR}{target}")
            }
        }
    }
}

/// Split a specification into tokens, in order.
pub fn parse_field_paths(spec: &str) -> Vec<FieldPathToken> {
    spec.split(',').map(FieldPathToken::parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(name: &str) -> FieldPathToken {
        FieldPathToken::Plain(name.into())
    }

    fn nav(reference: &str, target: &str) -> FieldPathToken {
        FieldPathToken::Navigate {
            reference: reference.into(),
            target: target.into(),
        }
    }

    #[test]
    fn single_plain_field() {
        assert_eq!(parse_field_paths("title"), vec![plain("title")]);
    }

    #[test]
    fn mixed_tokens_keep_order() {
        assert_eq!(
            parse_field_paths("title,category.name,sku"),
            vec![plain("title"), nav("category", "name"), plain("sku")]
        );
    }

    #[test]
    fn whitespace_is_not_trimmed() {
        assert_eq!(
            parse_field_paths("title, sku"),
            vec![plain("title"), plain(" sku")]
        );
    }

    #[test]
    fn empty_segments_are_kept() {
        assert_eq!(parse_field_paths(""), vec![plain("")]);
        assert_eq!(
            parse_field_paths("title,,sku"),
            vec![plain("title"), plain(""), plain("sku")]
        );
    }

    #[test]
    fn malformed_navigation_is_plain() {
        assert_eq!(FieldPathToken::parse("a.b.c"), plain("a.b.c"));
        assert_eq!(FieldPathToken::parse(".name"), plain(".name"));
        assert_eq!(FieldPathToken::parse("category."), plain("category."));
        assert_eq!(FieldPathToken::parse("."), plain("."));
    }

    #[test]
    fn raw_reproduces_segment() {
        for segment in ["title", "category.name", "a.b.c", ""] {
            assert_eq!(FieldPathToken::parse(segment).raw(), segment);
        }
    }

    #[test]
    fn navigation_flag() {
        assert!(FieldPathToken::parse("category.name").is_navigation());
        assert!(!FieldPathToken::parse("title").is_navigation());
    }
}
