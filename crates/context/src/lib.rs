//! # Fablecraft Context
//!
//! Turns prompt context and lorebook entries into prompt text: a registry of
//! named resolvers, a shared entry formatter, and the assembler that expands
//! `{{placeholder}}` variables in prompt templates.
//!
//! Resolvers are pure functions over the context snapshot; nothing in this
//! crate performs I/O.

pub mod assembler;
pub mod category;
pub mod format;
pub mod history;
pub mod matched;
pub mod registry;

pub use assembler::{assemble, expand};
pub use format::{format_entries, format_entry};
pub use matched::NO_ENTRIES_MESSAGE;
pub use registry::{Resolver, ResolverRegistry};

use fablecraft_core::EntryCategory;

/// Create a registry with every built-in resolver.
pub fn default_registry() -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();

    registry.register(Box::new(matched::MatchedChapterEntries));
    registry.register(Box::new(matched::MatchedSceneBeatEntries));
    registry.register(Box::new(matched::SceneBeatAggregate));

    registry.register(Box::new(category::CategoryEntries::new("all", None)));
    registry.register(Box::new(category::CategoryEntries::new(
        "characters",
        Some(EntryCategory::Character),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "locations",
        Some(EntryCategory::Location),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "items",
        Some(EntryCategory::Item),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "events",
        Some(EntryCategory::Event),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "notes",
        Some(EntryCategory::Note),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "synopsis",
        Some(EntryCategory::Synopsis),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "starting-scenarios",
        Some(EntryCategory::StartingScenario),
    )));
    registry.register(Box::new(category::CategoryEntries::new(
        "timelines",
        Some(EntryCategory::Timeline),
    )));
    registry.register(Box::new(category::CharacterByName));

    registry.register(Box::new(history::ChatHistory));
    registry.register(Box::new(history::SceneBeat));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_has_all_builtins() {
        let registry = default_registry();
        for name in [
            "matched-chapter-entries",
            "matched-scenebeat-entries",
            "scene-beat-aggregate",
            "all",
            "characters",
            "locations",
            "items",
            "events",
            "notes",
            "synopsis",
            "starting-scenarios",
            "timelines",
            "character",
            "chat-history",
            "scenebeat",
        ] {
            assert!(registry.get(name).is_some(), "missing resolver: {name}");
        }
    }
}
