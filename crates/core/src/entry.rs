//! Lorebook entry domain types.
//!
//! A lorebook entry is a reusable piece of world knowledge (a character, a
//! location, an event) that the context pipeline injects into AI prompts so
//! generations stay consistent with established canon.
//!
//! Entries live at one of three inheritance levels: global (every story),
//! series (every story in one series), or story (one story only).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of world knowledge an entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryCategory {
    Character,
    Location,
    Item,
    Event,
    Note,
    Synopsis,
    StartingScenario,
    Timeline,
}

impl EntryCategory {
    /// Human-readable label used by the entry formatter.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Character => "Character",
            Self::Location => "Location",
            Self::Item => "Item",
            Self::Event => "Event",
            Self::Note => "Note",
            Self::Synopsis => "Synopsis",
            Self::StartingScenario => "Starting Scenario",
            Self::Timeline => "Timeline",
        }
    }
}

/// The inheritance tier an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryLevel {
    /// Available to every story.
    Global,
    /// Scoped to one series (`scope_id` holds the series id).
    Series,
    /// Scoped to one story (`scope_id` holds the story id).
    Story,
}

/// Editorial weight controlling ranking when entries compete for prompt space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryImportance {
    Major,
    Minor,
    #[default]
    Background,
}

/// Narrative state of the entry's subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Active,
    Inactive,
    /// The subject belongs to the story's past (e.g. a dead character).
    Historical,
}

/// A single lorebook entry snapshot.
///
/// The core only reads these; creation and editing happen in the host
/// application's CRUD layer.
///
/// Invariant: `level == Global` implies `scope_id` is `None`; `Series` and
/// `Story` levels carry the owning series/story id in `scope_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LorebookEntry {
    /// Unique entry ID
    pub id: String,

    /// Display name (e.g. "Alice", "The Sunken City")
    pub name: String,

    /// Prose description injected into prompts
    pub description: String,

    /// What kind of knowledge this is
    pub category: EntryCategory,

    /// Match keys for tag-based text matching
    #[serde(default)]
    pub tags: Vec<String>,

    /// Inheritance tier
    pub level: EntryLevel,

    /// Owning series/story id for non-global entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,

    /// Editorial weight for ranking
    #[serde(default)]
    pub importance: EntryImportance,

    /// Narrative state
    #[serde(default)]
    pub status: EntryStatus,

    /// Disabled entries are invisible to matching and category listings
    #[serde(default)]
    pub disabled: bool,
}

impl LorebookEntry {
    /// Create a global entry available to every story.
    pub fn global(
        name: impl Into<String>,
        category: EntryCategory,
        description: impl Into<String>,
    ) -> Self {
        Self::new(name, category, description, EntryLevel::Global, None)
    }

    /// Create an entry scoped to one series.
    pub fn series(
        name: impl Into<String>,
        category: EntryCategory,
        description: impl Into<String>,
        series_id: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            category,
            description,
            EntryLevel::Series,
            Some(series_id.into()),
        )
    }

    /// Create an entry scoped to one story.
    pub fn story(
        name: impl Into<String>,
        category: EntryCategory,
        description: impl Into<String>,
        story_id: impl Into<String>,
    ) -> Self {
        Self::new(
            name,
            category,
            description,
            EntryLevel::Story,
            Some(story_id.into()),
        )
    }

    fn new(
        name: impl Into<String>,
        category: EntryCategory,
        description: impl Into<String>,
        level: EntryLevel,
        scope_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            category,
            tags: Vec::new(),
            level,
            scope_id,
            importance: EntryImportance::default(),
            status: EntryStatus::default(),
            disabled: false,
        }
    }

    /// Set the match tags.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the editorial importance.
    pub fn with_importance(mut self, importance: EntryImportance) -> Self {
        self.importance = importance;
        self
    }

    /// Set the narrative status.
    pub fn with_status(mut self, status: EntryStatus) -> Self {
        self.status = status;
        self
    }

    /// Mark the entry disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Whether this entry participates in matching and listings.
    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}
