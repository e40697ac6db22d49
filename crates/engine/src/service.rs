//! The generation service — one cancellable session at a time.
//!
//! `start` assembles the prompt, issues the provider call, and pumps the
//! decoded token stream into the caller's sink. Starting while a session is
//! in flight supersedes it; `stop` resolves the active session as completed
//! with whatever text had accumulated.

use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use fablecraft_context::{ResolverRegistry, assemble};
use fablecraft_core::error::Error;
use fablecraft_core::provider::GenerationRequest;
use fablecraft_core::{
    LorebookEntry, Prompt, PromptContext, Result, SceneBeatContext, StoryStore, TokenEvent,
    TokenSink,
};
use fablecraft_lorebook::match_in_text;
use fablecraft_providers::{ProviderRegistry, StreamDecoder};

use crate::session::{GenerationOutcome, SessionHandle, SessionPhase};

struct ServiceState {
    current: Option<SessionHandle>,
    phase: SessionPhase,
}

/// Orchestrates generation sessions against a provider registry.
///
/// Thread-safe via `std::sync::Mutex` (non-async, held briefly); the service
/// is shared behind an `Arc` so `stop` can be called from another task.
pub struct GenerationService {
    providers: Arc<ProviderRegistry>,
    resolvers: ResolverRegistry,
    state: Mutex<ServiceState>,
}

impl GenerationService {
    pub fn new(providers: Arc<ProviderRegistry>, resolvers: ResolverRegistry) -> Self {
        Self {
            providers,
            resolvers,
            state: Mutex::new(ServiceState {
                current: None,
                phase: SessionPhase::Idle,
            }),
        }
    }

    /// Construct with the built-in resolver set.
    pub fn with_default_resolvers(providers: Arc<ProviderRegistry>) -> Self {
        Self::new(providers, fablecraft_context::default_registry())
    }

    /// Run one generation session to its terminal phase.
    ///
    /// If a session is already in flight it is superseded first: at most one
    /// session is active at any time. Tokens are forwarded to `sink` as they
    /// decode; `on_complete` fires for completed and superseded sessions but
    /// never for errored ones, whose partial text is discarded.
    pub async fn start(
        &self,
        prompt: Prompt,
        context: PromptContext,
        entries: Vec<LorebookEntry>,
        provider: Option<String>,
        model: String,
        sink: Arc<dyn TokenSink>,
    ) -> Result<GenerationOutcome> {
        if !prompt.allows(&model) {
            return Err(Error::Config {
                message: format!("Model '{model}' is not allowed for this prompt"),
            });
        }

        let provider = self
            .providers
            .resolve(provider.as_deref())
            .ok_or_else(|| Error::Config {
                message: format!(
                    "No provider registered as '{}'",
                    provider.as_deref().unwrap_or("<default>")
                ),
            })?;

        // Abort-before-start: the prior session, if any, resolves as aborted.
        let session = {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(prior) = state.current.take() {
                debug!(session = %prior.id, "Superseding in-flight session");
                prior.supersede();
            }
            let session = SessionHandle::new();
            state.current = Some(session.clone());
            state.phase = SessionPhase::Requesting;
            session
        };

        debug!(
            session = %session.id,
            provider = provider.name(),
            model = %model,
            "Starting generation"
        );

        let messages = assemble(&prompt, &context, &entries, &self.resolvers);
        let request = GenerationRequest::new(&model, messages).with_sampling(prompt.sampling.clone());

        let mut rx = match provider.generate(request, session.cancel.clone()).await {
            Ok(rx) => rx,
            Err(e) => {
                warn!(session = %session.id, error = %e, "Provider call failed");
                self.resolve(&session, SessionPhase::Errored);
                return Err(e.into());
            }
        };

        let mut decoder = StreamDecoder::new();
        let mut accumulated = String::new();
        let mut streaming = false;

        while let Some(chunk) = rx.recv().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    warn!(session = %session.id, error = %e, "Stream failed mid-generation");
                    self.resolve(&session, SessionPhase::Errored);
                    return Err(e.into());
                }
            };

            if !streaming {
                streaming = true;
                self.set_phase_if_current(&session, SessionPhase::Streaming);
            }

            for event in decoder.feed(&chunk) {
                if let TokenEvent::Token { text } = event {
                    accumulated.push_str(&text);
                    sink.on_token(&text).await;
                }
            }

            if decoder.is_finished() {
                break;
            }
        }

        // Channel closed without a terminator: end of stream and cancellation
        // both resolve the session normally.
        if !decoder.is_finished() {
            decoder.finish();
        }

        let phase = if session.is_superseded() {
            SessionPhase::Aborted
        } else {
            SessionPhase::Completed
        };
        self.resolve(&session, phase);
        sink.on_complete(&accumulated).await;

        info!(
            session = %session.id,
            phase = ?phase,
            chars = accumulated.len(),
            "Generation resolved"
        );

        Ok(GenerationOutcome {
            session_id: session.id,
            phase,
            text: accumulated,
        })
    }

    /// Cancel the active session, if any. Idempotent; the session resolves
    /// as completed with its accumulated text.
    pub fn stop(&self) {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(session) = &state.current {
            debug!(session = %session.id, "Stop requested");
            session.cancel.cancel();
        }
    }

    /// Phase of the most recent session; `Idle` before the first start.
    pub fn phase(&self) -> SessionPhase {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).phase
    }

    /// Whether no session is in flight.
    pub fn is_idle(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .is_none()
    }

    fn set_phase_if_current(&self, session: &SessionHandle, phase: SessionPhase) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.current.as_ref().is_some_and(|c| c.id == session.id) {
            state.phase = phase;
        }
    }

    /// Record a terminal phase, unless a newer session owns the slot.
    fn resolve(&self, session: &SessionHandle, phase: SessionPhase) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.current.as_ref().is_some_and(|c| c.id == session.id) {
            state.current = None;
            state.phase = phase;
        }
    }
}

/// Fetch a story's entries and chapters concurrently, then match the
/// lorebook against the active chapter and scene beat.
///
/// Returns the populated context together with the story's full entry list,
/// which resolvers need for category and by-id lookups. Both matched sources
/// are enabled on the scene-beat flags; callers that want custom context
/// override them afterwards.
pub async fn prepare_context(
    store: &dyn StoryStore,
    story_id: &str,
    chapter_id: Option<&str>,
    scene_beat: Option<&str>,
) -> Result<(PromptContext, Vec<LorebookEntry>)> {
    let (entries, chapters) = tokio::try_join!(
        store.entries_for_story(story_id),
        store.chapters_for_story(story_id),
    )?;

    let mut context = PromptContext::new(story_id).with_scene_beat_context(SceneBeatContext {
        use_matched_chapter: true,
        use_matched_scene_beat: true,
        ..SceneBeatContext::default()
    });

    if let Some(chapter_id) = chapter_id {
        context = context.with_chapter(chapter_id);
        match chapters.iter().find(|c| c.id == chapter_id) {
            Some(chapter) => {
                let matched: Vec<LorebookEntry> = match_in_text(&entries, &chapter.content)
                    .into_iter()
                    .cloned()
                    .collect();
                context = context.with_chapter_matches(matched);
            }
            None => warn!(story_id, chapter_id, "Chapter not found for matching"),
        }
    }

    if let Some(beat) = scene_beat {
        let matched: Vec<LorebookEntry> = match_in_text(&entries, beat)
            .into_iter()
            .cloned()
            .collect();
        context = context.with_scene_beat(beat).with_scene_beat_matches(matched);
    }

    Ok((context, entries))
}
