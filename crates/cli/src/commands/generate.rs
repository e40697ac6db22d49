//! `fablecraft generate` — One-shot generation with lorebook context.
//!
//! Loads a lorebook snapshot, merges it for the target story, matches it
//! against the chapter text and scene beat, expands the prompt templates,
//! and streams the model's tokens to stdout. Ctrl+C stops the stream and
//! keeps whatever was generated.

use std::sync::Arc;

use async_trait::async_trait;

use fablecraft_config::AppConfig;
use fablecraft_core::{
    Chapter, EntryLevel, LorebookEntry, Prompt, PromptMessage, SamplingParams, StaticStore,
    TokenSink,
};
use fablecraft_engine::{GenerationService, SessionPhase, prepare_context};
use fablecraft_lorebook::merge_for_story;
use fablecraft_providers::build_from_config;

const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a creative writing assistant continuing the \
user's story. Stay consistent with the story context below.\n\n\
Story context:\n{{scene-beat-aggregate}}";

pub struct GenerateArgs {
    pub prompt: String,
    pub story: String,
    pub series: Option<String>,
    pub lorebook: Option<String>,
    pub chapter: Option<String>,
    pub scene_beat: Option<String>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub system: Option<String>,
}

/// Streams tokens straight to stdout.
struct StdoutSink;

#[async_trait]
impl TokenSink for StdoutSink {
    async fn on_token(&self, text: &str) {
        use std::io::Write;
        print!("{text}");
        let _ = std::io::stdout().flush();
    }

    async fn on_complete(&self, _full_text: &str) {
        println!();
    }
}

pub async fn run(args: GenerateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let provider_name = args
        .provider
        .clone()
        .unwrap_or_else(|| config.default_provider.clone());
    let model = args
        .model
        .clone()
        .unwrap_or_else(|| config.default_model_for(&provider_name).to_string());

    // Check for an API key early — give a clear error
    let has_provider_key = config
        .providers
        .get(&provider_name)
        .and_then(|p| p.api_key.as_ref())
        .is_some();
    if provider_name != "ollama" && config.api_key.is_none() && !has_provider_key {
        eprintln!();
        eprintln!("  ERROR: No API key configured for '{provider_name}'!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY, OPENROUTER_API_KEY, FABLECRAFT_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    // --- Lorebook loading ---
    let store = StaticStore::new();
    let lorebook_path = args.lorebook.clone().or_else(|| config.lorebook.path.clone());

    if let Some(path) = &lorebook_path {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read lorebook {path}: {e}"))?;
        let all: Vec<LorebookEntry> = serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse lorebook {path}: {e}"))?;

        let (mut global, mut series, mut story) = (Vec::new(), Vec::new(), Vec::new());
        for entry in all {
            match entry.level {
                EntryLevel::Global => global.push(entry),
                EntryLevel::Series => series.push(entry),
                EntryLevel::Story => story.push(entry),
            }
        }

        let merged = merge_for_story(&args.story, args.series.as_deref(), &global, &series, &story);
        tracing::debug!(path, entries = merged.len(), "Loaded lorebook");
        store.set_entries(&args.story, merged).await;
    }

    let chapter_id = match &args.chapter {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read chapter {path}: {e}"))?;
            store
                .set_chapters(
                    &args.story,
                    vec![Chapter::new("current", &args.story, "Current Chapter", 1, content)],
                )
                .await;
            Some("current")
        }
        None => None,
    };

    let (context, entries) =
        prepare_context(&store, &args.story, chapter_id, args.scene_beat.as_deref()).await?;

    // --- Prompt ---
    let system = args
        .system
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_TEMPLATE.to_string());
    let sampling = SamplingParams {
        temperature: config.default_temperature,
        max_tokens: config.default_max_tokens,
        ..SamplingParams::default()
    };
    let prompt = Prompt::new(vec![
        PromptMessage::system(system),
        PromptMessage::user(&args.prompt),
    ])
    .with_sampling(sampling);

    // --- Generation ---
    let registry = Arc::new(build_from_config(&config));
    let service = Arc::new(GenerationService::with_default_resolvers(registry));

    eprintln!("  ✒️  {provider_name} / {model}");
    eprintln!();

    let mut task = tokio::spawn({
        let service = service.clone();
        async move {
            service
                .start(
                    prompt,
                    context,
                    entries,
                    Some(provider_name),
                    model,
                    Arc::new(StdoutSink),
                )
                .await
        }
    });

    let outcome = tokio::select! {
        res = &mut task => res??,
        _ = tokio::signal::ctrl_c() => {
            service.stop();
            task.await??
        }
    };

    if outcome.phase == SessionPhase::Aborted {
        eprintln!("  [stopped]");
    }
    tracing::debug!(chars = outcome.text.len(), phase = ?outcome.phase, "Generation finished");

    Ok(())
}
