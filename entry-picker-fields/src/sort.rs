//! Ordering of resolved items for presentation.
//!
//! Comparison approximates locale-aware collation in three levels: base
//! letters ignoring case and accents, then accents, then case with lowercase
//! first. Raw code points break any remaining tie.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::types::ResolvedItem;

/// How resolved items are ordered.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Keep the order the entry source returned.
    None,
    /// Reverse alphabetical.
    #[default]
    Descending,
    Ascending,
}

/// Order items in place by their display labels.
pub fn sort_items(items: &mut [ResolvedItem], order: SortOrder) {
    match order {
        SortOrder::None => {}
        SortOrder::Ascending => items.sort_by(|a, b| compare_display(&a.display, &b.display)),
        SortOrder::Descending => items.sort_by(|a, b| compare_display(&b.display, &a.display)),
    }
}

/// Collation-style comparison of two display labels.
pub fn compare_display(a: &str, b: &str) -> Ordering {
    let (a_nfd, b_nfd): (Vec<char>, Vec<char>) = (a.nfd().collect(), b.nfd().collect());

    primary_key(&a_nfd)
        .cmp(&primary_key(&b_nfd))
        .then_with(|| secondary_key(&a_nfd).cmp(&secondary_key(&b_nfd)))
        .then_with(|| tertiary_key(&a_nfd).cmp(&tertiary_key(&b_nfd)))
        .then_with(|| a.cmp(b))
}

/// Base letters, lowercased, accents stripped.
fn primary_key(decomposed: &[char]) -> Vec<char> {
    decomposed
        .iter()
        .filter(|c| !is_combining_mark(**c))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Lowercased text with accents kept.
fn secondary_key(decomposed: &[char]) -> Vec<char> {
    decomposed.iter().flat_map(|c| c.to_lowercase()).collect()
}

/// Case pattern of the base letters: lowercase sorts before uppercase.
fn tertiary_key(decomposed: &[char]) -> Vec<bool> {
    decomposed
        .iter()
        .filter(|c| !is_combining_mark(**c))
        .map(|c| c.is_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(labels: &[&str]) -> Vec<ResolvedItem> {
        labels
            .iter()
            .enumerate()
            .map(|(i, label)| ResolvedItem {
                id: i.to_string(),
                display: label.to_string(),
            })
            .collect()
    }

    fn labels(items: &[ResolvedItem]) -> Vec<&str> {
        items.iter().map(|item| item.display.as_str()).collect()
    }

    #[test]
    fn descending_is_reverse_alphabetical() {
        let mut list = items(&["Apple", "Banana", "Cherry"]);
        sort_items(&mut list, SortOrder::Descending);
        assert_eq!(labels(&list), vec!["Cherry", "Banana", "Apple"]);
    }

    #[test]
    fn ascending() {
        let mut list = items(&["Cherry", "Apple", "Banana"]);
        sort_items(&mut list, SortOrder::Ascending);
        assert_eq!(labels(&list), vec!["Apple", "Banana", "Cherry"]);
    }

    #[test]
    fn none_keeps_source_order() {
        let mut list = items(&["Banana", "Cherry", "Apple"]);
        sort_items(&mut list, SortOrder::None);
        assert_eq!(labels(&list), vec!["Banana", "Cherry", "Apple"]);
    }

    #[test]
    fn case_is_not_primary() {
        assert_eq!(compare_display("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_display("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn lowercase_before_uppercase_on_tie() {
        assert_eq!(compare_display("apple", "Apple"), Ordering::Less);
    }

    #[test]
    fn accents_are_secondary() {
        assert_eq!(compare_display("résumé", "resume"), Ordering::Greater);
        assert_eq!(compare_display("résumé", "resumes"), Ordering::Less);
        assert_eq!(compare_display("Äpfel", "Birne"), Ordering::Less);
    }

    #[test]
    fn equal_labels() {
        assert_eq!(compare_display("Foo - Drinks", "Foo - Drinks"), Ordering::Equal);
    }

    #[test]
    fn default_order_is_descending() {
        assert_eq!(SortOrder::default(), SortOrder::Descending);
    }
}
