//! Resolvers over pre-matched entry sets.
//!
//! Two rank scales are in play and they are not interchangeable. The
//! chapter/scene-beat resolvers sort ascending on `{major: 0, minor: 1,
//! background: 2}`; the aggregate sorts descending on `{major: 3, minor: 2,
//! background: 1}`. Both put major first today, but each scale governs a
//! different consumer and they are kept separate so neither can drift.

use std::collections::{HashMap, HashSet};

use fablecraft_core::{EntryImportance, LorebookEntry, PromptContext};

use crate::format::format_entries;
use crate::registry::Resolver;

/// What the aggregate resolver returns when nothing is selected.
pub const NO_ENTRIES_MESSAGE: &str = "No lorebook entries are available for this prompt.";

fn matched_rank(importance: EntryImportance) -> u8 {
    match importance {
        EntryImportance::Major => 0,
        EntryImportance::Minor => 1,
        EntryImportance::Background => 2,
    }
}

fn aggregate_rank(importance: EntryImportance) -> u8 {
    match importance {
        EntryImportance::Major => 3,
        EntryImportance::Minor => 2,
        EntryImportance::Background => 1,
    }
}

fn format_ranked(entries: &[LorebookEntry]) -> String {
    let mut selected: Vec<&LorebookEntry> =
        entries.iter().filter(|e| e.is_enabled()).collect();
    // Stable sort: equal importance keeps input order.
    selected.sort_by_key(|e| matched_rank(e.importance));
    format_entries(selected)
}

/// Entries matched against the active chapter's text, major first.
pub struct MatchedChapterEntries;

impl Resolver for MatchedChapterEntries {
    fn name(&self) -> &str {
        "matched-chapter-entries"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        _entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        format_ranked(&context.chapter_matched_entries)
    }
}

/// Entries matched against the scene beat command, major first.
pub struct MatchedSceneBeatEntries;

impl Resolver for MatchedSceneBeatEntries {
    fn name(&self) -> &str {
        "matched-scenebeat-entries"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        _entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        format_ranked(&context.scene_beat_matched_entries)
    }
}

/// The composite entry block used when actually generating prose.
///
/// When `scene_beat_context` is present, unions the selected sources by entry
/// id (last write wins, first-insertion position kept). Without it, falls
/// back to the legacy `matched_entries` set. An empty result renders the
/// [`NO_ENTRIES_MESSAGE`] sentinel rather than an empty string.
pub struct SceneBeatAggregate;

impl Resolver for SceneBeatAggregate {
    fn name(&self) -> &str {
        "scene-beat-aggregate"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        let mut merged: Vec<&LorebookEntry> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        match &context.scene_beat_context {
            Some(sbc) => {
                if sbc.use_matched_chapter {
                    union_into(&mut merged, &mut positions, &context.chapter_matched_entries);
                }
                if sbc.use_matched_scene_beat {
                    union_into(
                        &mut merged,
                        &mut positions,
                        &context.scene_beat_matched_entries,
                    );
                }
                if sbc.use_custom_context {
                    let wanted: HashSet<&str> =
                        sbc.custom_context_items.iter().map(String::as_str).collect();
                    let picked: Vec<&LorebookEntry> = entries
                        .iter()
                        .filter(|e| wanted.contains(e.id.as_str()))
                        .collect();
                    union_refs(&mut merged, &mut positions, picked);
                }
            }
            None => union_into(&mut merged, &mut positions, &context.matched_entries),
        }

        if merged.is_empty() {
            return NO_ENTRIES_MESSAGE.to_string();
        }

        // Descending: major (3) first. Stable, so ties keep insertion order.
        merged.sort_by(|a, b| aggregate_rank(b.importance).cmp(&aggregate_rank(a.importance)));
        format_entries(merged)
    }
}

fn union_into<'a>(
    dest: &mut Vec<&'a LorebookEntry>,
    positions: &mut HashMap<&'a str, usize>,
    source: &'a [LorebookEntry],
) {
    union_refs(dest, positions, source.iter().collect());
}

fn union_refs<'a>(
    dest: &mut Vec<&'a LorebookEntry>,
    positions: &mut HashMap<&'a str, usize>,
    source: Vec<&'a LorebookEntry>,
) {
    for entry in source {
        match positions.get(entry.id.as_str()) {
            // Duplicate id: the newer snapshot replaces the older in place.
            Some(&idx) => dest[idx] = entry,
            None => {
                positions.insert(entry.id.as_str(), dest.len());
                dest.push(entry);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fablecraft_core::{EntryCategory, SceneBeatContext};

    fn entry(name: &str, importance: EntryImportance) -> LorebookEntry {
        LorebookEntry::story(name, EntryCategory::Character, "desc", "story-1")
            .with_importance(importance)
    }

    fn names(text: &str) -> Vec<String> {
        text.lines()
            .filter(|l| l.starts_with('['))
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn matched_chapter_orders_major_minor_background() {
        let ctx = PromptContext::new("story-1").with_chapter_matches(vec![
            entry("Bg", EntryImportance::Background),
            entry("Major", EntryImportance::Major),
            entry("Minor", EntryImportance::Minor),
        ]);

        let out = MatchedChapterEntries.resolve(&ctx, &[], None);
        assert_eq!(
            names(&out),
            vec![
                "[Character: Major]",
                "[Character: Minor]",
                "[Character: Bg]"
            ]
        );
    }

    #[test]
    fn matched_chapter_drops_disabled_and_empties_to_blank() {
        let ctx = PromptContext::new("story-1")
            .with_chapter_matches(vec![entry("Gone", EntryImportance::Major).disabled()]);
        assert_eq!(MatchedChapterEntries.resolve(&ctx, &[], None), "");

        let empty = PromptContext::new("story-1");
        assert_eq!(MatchedChapterEntries.resolve(&empty, &[], None), "");
    }

    #[test]
    fn matched_scenebeat_reads_its_own_set() {
        let ctx = PromptContext::new("story-1")
            .with_chapter_matches(vec![entry("ChapterOnly", EntryImportance::Major)])
            .with_scene_beat_matches(vec![entry("BeatOnly", EntryImportance::Major)]);

        let out = MatchedSceneBeatEntries.resolve(&ctx, &[], None);
        assert!(out.contains("BeatOnly"));
        assert!(!out.contains("ChapterOnly"));
    }

    #[test]
    fn aggregate_orders_major_first_on_inverted_scale() {
        let ctx = PromptContext::new("story-1")
            .with_chapter_matches(vec![
                entry("Bg", EntryImportance::Background),
                entry("Major", EntryImportance::Major),
                entry("Minor", EntryImportance::Minor),
            ])
            .with_scene_beat_context(SceneBeatContext {
                use_matched_chapter: true,
                ..Default::default()
            });

        let out = SceneBeatAggregate.resolve(&ctx, &[], None);
        assert_eq!(
            names(&out),
            vec![
                "[Character: Major]",
                "[Character: Minor]",
                "[Character: Bg]"
            ]
        );
    }

    #[test]
    fn aggregate_unions_by_id_last_write_wins() {
        let mut stale = entry("Alice", EntryImportance::Major);
        stale.id = "e1".into();
        stale.description = "stale".into();

        let mut fresh = stale.clone();
        fresh.description = "fresh".into();

        let ctx = PromptContext::new("story-1")
            .with_chapter_matches(vec![stale, entry("Bob", EntryImportance::Minor)])
            .with_scene_beat_matches(vec![fresh])
            .with_scene_beat_context(SceneBeatContext {
                use_matched_chapter: true,
                use_matched_scene_beat: true,
                ..Default::default()
            });

        let out = SceneBeatAggregate.resolve(&ctx, &[], None);
        // The duplicate keeps its first position (before Bob) but carries the
        // newer description.
        let alice_pos = out.find("Alice").unwrap();
        let bob_pos = out.find("Bob").unwrap();
        assert!(alice_pos < bob_pos);
        assert!(out.contains("fresh"));
        assert!(!out.contains("stale"));
    }

    #[test]
    fn aggregate_pulls_custom_items_from_full_lorebook() {
        let mut picked = entry("Relic", EntryImportance::Background);
        picked.id = "relic-1".into();
        let lorebook = vec![picked, entry("Unpicked", EntryImportance::Major)];

        let ctx = PromptContext::new("story-1").with_scene_beat_context(SceneBeatContext {
            use_custom_context: true,
            custom_context_items: vec!["relic-1".into()],
            ..Default::default()
        });

        let out = SceneBeatAggregate.resolve(&ctx, &lorebook, None);
        assert!(out.contains("Relic"));
        assert!(!out.contains("Unpicked"));
    }

    #[test]
    fn aggregate_falls_back_to_legacy_matched_entries() {
        let mut ctx = PromptContext::new("story-1");
        ctx.matched_entries = vec![entry("Legacy", EntryImportance::Minor)];

        let out = SceneBeatAggregate.resolve(&ctx, &[], None);
        assert!(out.contains("Legacy"));
    }

    #[test]
    fn aggregate_empty_set_renders_sentinel() {
        let ctx = PromptContext::new("story-1").with_scene_beat_context(SceneBeatContext {
            use_matched_chapter: true,
            ..Default::default()
        });

        let out = SceneBeatAggregate.resolve(&ctx, &[], None);
        assert_eq!(out, "No lorebook entries are available for this prompt.");
    }
}
