//! Conversation-side resolvers: chat history and the scene beat itself.

use fablecraft_core::{LorebookEntry, PromptContext};

use crate::registry::Resolver;

/// Renders the chat history as `Role: content` lines, oldest first.
pub struct ChatHistory;

impl Resolver for ChatHistory {
    fn name(&self) -> &str {
        "chat-history"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        _entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        context
            .chat_history
            .iter()
            .map(|m| format!("{}: {}", m.role.label(), m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Injects the scene beat command verbatim.
pub struct SceneBeat;

impl Resolver for SceneBeat {
    fn name(&self) -> &str {
        "scenebeat"
    }

    fn resolve(
        &self,
        context: &PromptContext,
        _entries: &[LorebookEntry],
        _arg: Option<&str>,
    ) -> String {
        context.scene_beat.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fablecraft_core::PromptMessage;

    #[test]
    fn chat_history_renders_labeled_lines() {
        let ctx = PromptContext::new("story-1").with_chat_history(vec![
            PromptMessage::user("Write the duel."),
            PromptMessage::assistant("Steel rang against steel."),
        ]);

        let out = ChatHistory.resolve(&ctx, &[], None);
        assert_eq!(
            out,
            "User: Write the duel.\nAssistant: Steel rang against steel."
        );
    }

    #[test]
    fn empty_history_is_empty_string() {
        let ctx = PromptContext::new("story-1");
        assert_eq!(ChatHistory.resolve(&ctx, &[], None), "");
    }

    #[test]
    fn scenebeat_passes_command_through() {
        let ctx = PromptContext::new("story-1").with_scene_beat("Alice enters the tavern");
        assert_eq!(
            SceneBeat.resolve(&ctx, &[], None),
            "Alice enters the tavern"
        );

        let bare = PromptContext::new("story-1");
        assert_eq!(SceneBeat.resolve(&bare, &[], None), "");
    }
}
