//! Prompt assembly — template expansion against the resolver registry.
//!
//! Placeholders look like `{{name}}` or `{{name:arg}}`. Expansion is
//! deliberately forgiving: unknown names and unterminated braces stay in the
//! text as literals, because a template typo must never break generation.

use tracing::{debug, trace};

use fablecraft_core::{LorebookEntry, Prompt, PromptContext, PromptMessage};

use crate::registry::ResolverRegistry;

/// Expand every message of a prompt, preserving order and roles.
pub fn assemble(
    prompt: &Prompt,
    context: &PromptContext,
    entries: &[LorebookEntry],
    registry: &ResolverRegistry,
) -> Vec<PromptMessage> {
    let messages: Vec<PromptMessage> = prompt
        .messages
        .iter()
        .map(|m| PromptMessage {
            role: m.role,
            content: expand(&m.content, context, entries, registry),
        })
        .collect();

    debug!(
        story_id = %context.story_id,
        messages = messages.len(),
        "Assembled prompt"
    );

    messages
}

/// Expand one template string.
pub fn expand(
    template: &str,
    context: &PromptContext,
    entries: &[LorebookEntry],
    registry: &ResolverRegistry,
) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            // Unterminated placeholder runs to end of text; keep it literal.
            out.push_str(&rest[start..]);
            return out;
        };

        let inner = &after[..end];
        let (name, arg) = match inner.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (inner.trim(), None),
        };

        match registry.resolve(name, context, entries, arg) {
            Some(value) => out.push_str(&value),
            None => {
                trace!(placeholder = name, "Unknown placeholder left literal");
                out.push_str(&rest[start..start + 2 + end + 2]);
            }
        }

        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Resolver;

    struct Fixed(&'static str, &'static str);

    impl Resolver for Fixed {
        fn name(&self) -> &str {
            self.0
        }

        fn resolve(
            &self,
            _context: &PromptContext,
            _entries: &[LorebookEntry],
            arg: Option<&str>,
        ) -> String {
            match arg {
                Some(arg) => format!("{}[{}]", self.1, arg),
                None => self.1.to_string(),
            }
        }
    }

    fn registry() -> ResolverRegistry {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(Fixed("world", "WORLD")));
        registry.register(Box::new(Fixed("empty", "")));
        registry
    }

    fn ctx() -> PromptContext {
        PromptContext::new("story-1")
    }

    #[test]
    fn expands_placeholder_in_surrounding_text() {
        let out = expand("Hello {{world}}!", &ctx(), &[], &registry());
        assert_eq!(out, "Hello WORLD!");
    }

    #[test]
    fn expands_placeholder_with_argument() {
        let out = expand("{{world:Alice}}", &ctx(), &[], &registry());
        assert_eq!(out, "WORLD[Alice]");
    }

    #[test]
    fn unknown_placeholder_stays_literal() {
        let out = expand("Keep {{unknown}} as is", &ctx(), &[], &registry());
        assert_eq!(out, "Keep {{unknown}} as is");
    }

    #[test]
    fn unterminated_placeholder_stays_literal() {
        let out = expand("Broken {{world and on", &ctx(), &[], &registry());
        assert_eq!(out, "Broken {{world and on");
    }

    #[test]
    fn empty_resolver_output_is_substituted_as_empty() {
        let out = expand("a{{empty}}b", &ctx(), &[], &registry());
        assert_eq!(out, "ab");
    }

    #[test]
    fn multiple_placeholders_expand_in_order() {
        let out = expand("{{world}} {{unknown}} {{world:x}}", &ctx(), &[], &registry());
        assert_eq!(out, "WORLD {{unknown}} WORLD[x]");
    }

    #[test]
    fn assemble_preserves_roles_and_order() {
        let prompt = Prompt::new(vec![
            PromptMessage::system("Context: {{world}}"),
            PromptMessage::user("Continue the scene."),
        ]);

        let messages = assemble(&prompt, &ctx(), &[], &registry());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, fablecraft_core::MessageRole::System);
        assert_eq!(messages[0].content, "Context: WORLD");
        assert_eq!(messages[1].content, "Continue the scene.");
    }

    #[test]
    fn placeholder_names_are_trimmed() {
        let out = expand("{{ world }}", &ctx(), &[], &registry());
        assert_eq!(out, "WORLD");
    }
}
