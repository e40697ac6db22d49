//! Tag matching — which entries does a piece of text mention?
//!
//! Matching is deliberately dumb: case-insensitive substring tests against
//! each entry's tag list. Ranking happens downstream in the resolvers; this
//! module only decides membership.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use fablecraft_core::LorebookEntry;

/// Normalize a token for indexing and comparison: trim and lowercase.
pub fn normalize(token: &str) -> String {
    token.trim().to_lowercase()
}

/// Build a lookup from normalized token to entry.
///
/// Every enabled entry is indexed under its normalized name and each of its
/// normalized tags. For a multi-word tag, the individual words are indexed
/// **only** when the word is itself also a standalone tag of the same entry.
/// Without that restriction, a common word buried in a long tag ("The Order
/// of the Crimson Dawn") would become a match key on its own.
///
/// Disabled entries are never indexed. On token collisions across entries the
/// later entry wins.
pub fn build_index(entries: &[LorebookEntry]) -> HashMap<String, &LorebookEntry> {
    let mut index: HashMap<String, &LorebookEntry> = HashMap::new();

    for entry in entries.iter().filter(|e| e.is_enabled()) {
        let tag_set: HashSet<String> = entry
            .tags
            .iter()
            .map(|t| normalize(t))
            .filter(|t| !t.is_empty())
            .collect();

        let name = normalize(&entry.name);
        if !name.is_empty() {
            index.insert(name, entry);
        }

        for tag in &tag_set {
            index.insert(tag.clone(), entry);

            if tag.contains(char::is_whitespace) {
                for word in tag.split_whitespace() {
                    if tag_set.contains(word) {
                        index.insert(word.to_string(), entry);
                    }
                }
            }
        }
    }

    index
}

/// Return every enabled entry whose tag list matches `text`.
///
/// An entry matches when any of its non-empty tags appears as a
/// case-insensitive substring of `text`. Entries come back in input order;
/// no ranking is applied here.
pub fn match_in_text<'a>(entries: &'a [LorebookEntry], text: &str) -> Vec<&'a LorebookEntry> {
    let haystack = text.to_lowercase();

    let matched: Vec<&LorebookEntry> = entries
        .iter()
        .filter(|e| e.is_enabled())
        .filter(|e| {
            e.tags.iter().any(|tag| {
                let needle = normalize(tag);
                !needle.is_empty() && haystack.contains(&needle)
            })
        })
        .collect();

    trace!(
        candidates = entries.len(),
        matched = matched.len(),
        "Tag matching finished"
    );

    matched
}
