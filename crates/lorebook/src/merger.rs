//! Scope merging — one entry collection out of three inheritance tiers.
//!
//! A story sees: every global entry, the entries of its series (if it belongs
//! to one), and its own entries. The three namespaces are disjoint by
//! construction, so the merge is a filtered concatenation with no
//! de-duplication. Each entry keeps its `level` so callers can still tell
//! inherited knowledge from story-local knowledge.

use tracing::debug;

use fablecraft_core::LorebookEntry;

/// Merge the three tiers into the collection visible to one story.
///
/// `series_entries` is filtered to `scope_id == series_id` and skipped
/// entirely when the story has no series; a missing series is not an error.
/// `story_entries` is filtered to `scope_id == story_id`.
pub fn merge_for_story(
    story_id: &str,
    series_id: Option<&str>,
    global_entries: &[LorebookEntry],
    series_entries: &[LorebookEntry],
    story_entries: &[LorebookEntry],
) -> Vec<LorebookEntry> {
    let mut merged: Vec<LorebookEntry> = global_entries.to_vec();

    if let Some(series_id) = series_id {
        merged.extend(
            series_entries
                .iter()
                .filter(|e| e.scope_id.as_deref() == Some(series_id))
                .cloned(),
        );
    }

    merged.extend(
        story_entries
            .iter()
            .filter(|e| e.scope_id.as_deref() == Some(story_id))
            .cloned(),
    );

    debug!(
        story_id,
        series = series_id.is_some(),
        merged = merged.len(),
        "Merged lorebook tiers"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use fablecraft_core::EntryCategory;

    fn fixture() -> (Vec<LorebookEntry>, Vec<LorebookEntry>, Vec<LorebookEntry>) {
        let global = vec![LorebookEntry::global(
            "Magic System",
            EntryCategory::Note,
            "Hard magic rules",
        )];
        let series = vec![
            LorebookEntry::series("The Empire", EntryCategory::Location, "Sprawling", "series-1"),
            LorebookEntry::series("Other Realm", EntryCategory::Location, "Elsewhere", "series-2"),
        ];
        let story = vec![
            LorebookEntry::story("Alice", EntryCategory::Character, "The mage", "story-1"),
            LorebookEntry::story("Bob", EntryCategory::Character, "A guard", "story-9"),
        ];
        (global, series, story)
    }

    #[test]
    fn merge_unions_all_three_tiers() {
        let (global, series, story) = fixture();
        let merged = merge_for_story("story-1", Some("series-1"), &global, &series, &story);

        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Magic System", "The Empire", "Alice"]);
    }

    #[test]
    fn missing_series_excludes_series_tier_silently() {
        let (global, series, story) = fixture();
        let merged = merge_for_story("story-1", None, &global, &series, &story);

        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Magic System", "Alice"]);
    }

    #[test]
    fn wrong_scope_entries_are_filtered() {
        let (global, series, story) = fixture();
        let merged = merge_for_story("story-9", Some("series-2"), &global, &series, &story);

        let names: Vec<&str> = merged.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Magic System", "Other Realm", "Bob"]);
    }

    #[test]
    fn entries_keep_their_level_through_the_merge() {
        let (global, series, story) = fixture();
        let merged = merge_for_story("story-1", Some("series-1"), &global, &series, &story);

        use fablecraft_core::EntryLevel;
        assert_eq!(merged[0].level, EntryLevel::Global);
        assert_eq!(merged[1].level, EntryLevel::Series);
        assert_eq!(merged[2].level, EntryLevel::Story);
    }
}
