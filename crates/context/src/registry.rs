//! Resolver trait and registry.
//!
//! A resolver turns the prompt context plus the entry collection into one
//! text fragment. Resolvers are pure: same inputs, same output, no ambient
//! state, no I/O. The prompt assembler looks them up by placeholder name.

use std::collections::HashMap;

use fablecraft_core::{LorebookEntry, PromptContext};

/// A named context resolver.
///
/// Resolvers are total over well-formed input: structurally invalid input
/// (e.g. a missing argument for an argumented resolver) yields an empty
/// string, never an error. That keeps a template typo from breaking
/// generation.
pub trait Resolver: Send + Sync {
    /// The placeholder name this resolver answers to (e.g. "characters").
    fn name(&self) -> &str;

    /// Produce the text fragment for this context.
    fn resolve(
        &self,
        context: &PromptContext,
        entries: &[LorebookEntry],
        arg: Option<&str>,
    ) -> String;
}

/// A registry of available resolvers, keyed by placeholder name.
pub struct ResolverRegistry {
    resolvers: HashMap<String, Box<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self {
            resolvers: HashMap::new(),
        }
    }

    /// Register a resolver. Replaces any existing resolver with the same name.
    pub fn register(&mut self, resolver: Box<dyn Resolver>) {
        let name = resolver.name().to_string();
        self.resolvers.insert(name, resolver);
    }

    /// Get a resolver by name.
    pub fn get(&self, name: &str) -> Option<&dyn Resolver> {
        self.resolvers.get(name).map(|r| r.as_ref())
    }

    /// Resolve a placeholder by name. `None` means the name is unknown, which
    /// the assembler treats as literal text.
    pub fn resolve(
        &self,
        name: &str,
        context: &PromptContext,
        entries: &[LorebookEntry],
        arg: Option<&str>,
    ) -> Option<String> {
        self.get(name).map(|r| r.resolve(context, entries, arg))
    }

    /// List all registered resolver names.
    pub fn names(&self) -> Vec<&str> {
        self.resolvers.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperName;

    impl Resolver for UpperName {
        fn name(&self) -> &str {
            "upper"
        }

        fn resolve(
            &self,
            _context: &PromptContext,
            _entries: &[LorebookEntry],
            arg: Option<&str>,
        ) -> String {
            arg.unwrap_or_default().to_uppercase()
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(UpperName));
        assert!(registry.get("upper").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_resolve_dispatches_by_name() {
        let mut registry = ResolverRegistry::new();
        registry.register(Box::new(UpperName));

        let ctx = PromptContext::new("story-1");
        let out = registry.resolve("upper", &ctx, &[], Some("alice"));
        assert_eq!(out.as_deref(), Some("ALICE"));

        assert!(registry.resolve("missing", &ctx, &[], None).is_none());
    }
}
