//! Shared entry formatting.
//!
//! Every resolver renders entries through this one routine so the model sees
//! a consistent shape no matter which placeholder produced the text.

use fablecraft_core::{EntryStatus, LorebookEntry};

/// Render one entry as a bracketed header line plus its description.
///
/// Historical entries are annotated so past-tense knowledge reads as past.
pub fn format_entry(entry: &LorebookEntry) -> String {
    let marker = if entry.status == EntryStatus::Historical {
        " (historical)"
    } else {
        ""
    };
    format!(
        "[{}: {}{}]\n{}",
        entry.category.label(),
        entry.name,
        marker,
        entry.description
    )
}

/// Render an ordered entry sequence, blank-line separated.
pub fn format_entries<'a>(entries: impl IntoIterator<Item = &'a LorebookEntry>) -> String {
    entries
        .into_iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}
