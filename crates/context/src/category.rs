//! By-category listings over the story's own entries.
//!
//! These resolvers are catalogs, not matchers: they list every enabled entry
//! the story itself owns (optionally narrowed to one category), in input
//! order. Inherited global/series knowledge reaches prompts through the
//! matched/aggregate resolvers instead.

use fablecraft_core::{EntryCategory, EntryLevel, LorebookEntry, PromptContext};

use crate::format::{format_entries, format_entry};
use crate::registry::Resolver;

fn story_scoped<'a>(
    context: &'a PromptContext,
    entries: &'a [LorebookEntry],
) -> impl Iterator<Item = &'a LorebookEntry> {
    entries.iter().filter(|e| {
        e.is_enabled()
            && e.level == EntryLevel::Story
            && e.scope_id.as_deref() == Some(context.story_id.as_str())
    })
}

/// Lists the story's entries, optionally narrowed to one category.
///
/// One instance per placeholder name; `default_registry` registers the eight
/// category variants plus the unfiltered "all".
pub struct CategoryEntries {
    name: &'static str,
    category: Option<EntryCategory>,
}

impl CategoryEntries {
    pub fn new(name: &'static str, category: Option<EntryCategory>) -> Self {
        Self { name, category }
    }
}

impl Resolver for CategoryEntries {
    fn name(&self) -> &str {
        self.name
    }

    fn resolve(
        &self,
        context: &PromptContext,
        entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        let selected = story_scoped(context, entries)
            .filter(|e| self.category.is_none_or(|c| e.category == c));
        format_entries(selected)
    }
}

/// Looks up one character by name: `{{character:Alice}}`.
///
/// Name comparison is case-insensitive but exact (no substring matching).
/// A missing or unmatched argument resolves to an empty string.
pub struct CharacterByName;

impl Resolver for CharacterByName {
    fn name(&self) -> &str {
        "character"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        entries: &[LorebookEntry],
        arg: Option<&str>,
    ) -> String {
        let Some(wanted) = arg.map(str::trim).filter(|n| !n.is_empty()) else {
            return String::new();
        };
        let wanted = wanted.to_lowercase();

        story_scoped(context, entries)
            .filter(|e| e.category == EntryCategory::Character)
            .find(|e| e.name.to_lowercase() == wanted)
            .map(format_entry)
            .unwrap_or_default()
    }
}
