//! Prompt context — everything a resolver may draw on.
//!
//! A `PromptContext` is assembled by the caller (or by the engine's context
//! preparation step) before resolution begins. Resolvers are pure functions
//! over this snapshot plus the entry collection; they never fetch data behind
//! the caller's back.

use serde::{Deserialize, Serialize};

use crate::entry::LorebookEntry;
use crate::prompt::PromptMessage;

/// Per-scene-beat source selection for the aggregate resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SceneBeatContext {
    /// Include entries matched against the active chapter's text
    #[serde(default)]
    pub use_matched_chapter: bool,

    /// Include entries matched against the scene beat command
    #[serde(default)]
    pub use_matched_scene_beat: bool,

    /// Include the hand-picked entries in `custom_context_items`
    #[serde(default)]
    pub use_custom_context: bool,

    /// Entry ids picked by hand in the editor
    #[serde(default)]
    pub custom_context_items: Vec<String>,
}

/// The context snapshot resolvers read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptContext {
    /// The story being generated for
    pub story_id: String,

    /// The active chapter, if generation happens inside one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter_id: Option<String>,

    /// The scene beat command driving this generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_beat: Option<String>,

    /// Entries matched against the active chapter's text
    #[serde(default)]
    pub chapter_matched_entries: Vec<LorebookEntry>,

    /// Entries matched against the scene beat command
    #[serde(default)]
    pub scene_beat_matched_entries: Vec<LorebookEntry>,

    /// Pre-matched entries for callers that predate the split sets above
    #[serde(default)]
    pub matched_entries: Vec<LorebookEntry>,

    /// Source selection for the scene-beat aggregate resolver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_beat_context: Option<SceneBeatContext>,

    /// Recent chat messages, oldest first
    #[serde(default)]
    pub chat_history: Vec<PromptMessage>,

    /// Free-form collaborator-supplied fields
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PromptContext {
    /// Create an empty context for a story.
    pub fn new(story_id: impl Into<String>) -> Self {
        Self {
            story_id: story_id.into(),
            chapter_id: None,
            scene_beat: None,
            chapter_matched_entries: Vec::new(),
            scene_beat_matched_entries: Vec::new(),
            matched_entries: Vec::new(),
            scene_beat_context: None,
            chat_history: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Set the active chapter id.
    pub fn with_chapter(mut self, chapter_id: impl Into<String>) -> Self {
        self.chapter_id = Some(chapter_id.into());
        self
    }

    /// Set the scene beat command.
    pub fn with_scene_beat(mut self, command: impl Into<String>) -> Self {
        self.scene_beat = Some(command.into());
        self
    }

    /// Set the chapter-matched entry set.
    pub fn with_chapter_matches(mut self, entries: Vec<LorebookEntry>) -> Self {
        self.chapter_matched_entries = entries;
        self
    }

    /// Set the scene-beat-matched entry set.
    pub fn with_scene_beat_matches(mut self, entries: Vec<LorebookEntry>) -> Self {
        self.scene_beat_matched_entries = entries;
        self
    }

    /// Set the scene-beat source selection.
    pub fn with_scene_beat_context(mut self, sbc: SceneBeatContext) -> Self {
        self.scene_beat_context = Some(sbc);
        self
    }

    /// Set the chat history.
    pub fn with_chat_history(mut self, history: Vec<PromptMessage>) -> Self {
        self.chat_history = history;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_builder_chains() {
        let ctx = PromptContext::new("story-1")
            .with_chapter("ch-3")
            .with_scene_beat("Alice enters the tavern");
        assert_eq!(ctx.story_id, "story-1");
        assert_eq!(ctx.chapter_id.as_deref(), Some("ch-3"));
        assert_eq!(ctx.scene_beat.as_deref(), Some("Alice enters the tavern"));
        assert!(ctx.scene_beat_context.is_none());
    }

    #[test]
    fn context_deserializes_sparse_json() {
        let json = r#"{"story_id": "story-1"}"#;
        let ctx: PromptContext = serde_json::from_str(json).unwrap();
        assert!(ctx.chapter_matched_entries.is_empty());
        assert!(ctx.chat_history.is_empty());
        assert!(ctx.extra.is_empty());
    }
}
