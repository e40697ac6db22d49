//! StoryStore trait — the read interface onto the host's persistence layer.
//!
//! The core never owns story data. The host application (editor, test
//! harness, CLI) implements this trait over whatever persistence it has, and
//! the engine issues the reads it needs before context resolution begins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::entry::LorebookEntry;
use crate::error::StoreError;

/// A chapter snapshot, read-only inside the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Unique chapter ID
    pub id: String,

    /// The story this chapter belongs to
    pub story_id: String,

    /// Chapter title
    pub title: String,

    /// Position within the story, 1-based
    pub order: u32,

    /// Full body text
    pub content: String,

    /// Optional editor-authored summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// When the chapter was last edited
    pub updated_at: DateTime<Utc>,
}

impl Chapter {
    /// Create a chapter snapshot.
    pub fn new(
        id: impl Into<String>,
        story_id: impl Into<String>,
        title: impl Into<String>,
        order: u32,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            story_id: story_id.into(),
            title: title.into(),
            order,
            content: content.into(),
            summary: None,
            updated_at: Utc::now(),
        }
    }
}

/// Read access to a story's lorebook entries and chapters.
///
/// Implementations: the host application's database layer, or [`StaticStore`]
/// for tests and one-shot CLI runs.
#[async_trait]
pub trait StoryStore: Send + Sync {
    /// All lorebook entries visible to a story (global + inherited + own).
    async fn entries_for_story(
        &self,
        story_id: &str,
    ) -> std::result::Result<Vec<LorebookEntry>, StoreError>;

    /// All chapters of a story, in story order.
    async fn chapters_for_story(
        &self,
        story_id: &str,
    ) -> std::result::Result<Vec<Chapter>, StoreError>;
}

/// An in-memory [`StoryStore`] holding fixed snapshots.
///
/// Used by tests and by the CLI, which loads a JSON snapshot file rather than
/// talking to a database.
#[derive(Default)]
pub struct StaticStore {
    entries: RwLock<HashMap<String, Vec<LorebookEntry>>>,
    chapters: RwLock<HashMap<String, Vec<Chapter>>>,
}

impl StaticStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry set for a story.
    pub async fn set_entries(&self, story_id: impl Into<String>, entries: Vec<LorebookEntry>) {
        self.entries.write().await.insert(story_id.into(), entries);
    }

    /// Replace the chapter list for a story.
    pub async fn set_chapters(&self, story_id: impl Into<String>, mut chapters: Vec<Chapter>) {
        chapters.sort_by_key(|c| c.order);
        self.chapters.write().await.insert(story_id.into(), chapters);
    }
}

#[async_trait]
impl StoryStore for StaticStore {
    async fn entries_for_story(
        &self,
        story_id: &str,
    ) -> std::result::Result<Vec<LorebookEntry>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .get(story_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn chapters_for_story(
        &self,
        story_id: &str,
    ) -> std::result::Result<Vec<Chapter>, StoreError> {
        Ok(self
            .chapters
            .read()
            .await
            .get(story_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryCategory;

    #[tokio::test]
    async fn static_store_returns_what_was_set() {
        let store = StaticStore::new();
        store
            .set_entries(
                "story-1",
                vec![LorebookEntry::story(
                    "Alice",
                    EntryCategory::Character,
                    "The mage",
                    "story-1",
                )],
            )
            .await;

        let entries = store.entries_for_story("story-1").await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Alice");

        // Unknown stories read as empty, not as errors
        assert!(store.entries_for_story("story-2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn static_store_sorts_chapters_by_order() {
        let store = StaticStore::new();
        store
            .set_chapters(
                "story-1",
                vec![
                    Chapter::new("ch-2", "story-1", "Two", 2, "second"),
                    Chapter::new("ch-1", "story-1", "One", 1, "first"),
                ],
            )
            .await;

        let chapters = store.chapters_for_story("story-1").await.unwrap();
        assert_eq!(chapters[0].id, "ch-1");
        assert_eq!(chapters[1].id, "ch-2");
    }
}
