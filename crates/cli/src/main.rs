//! Fablecraft CLI — the main entry point.
//!
//! Commands:
//! - `init`     — Initialize the config file
//! - `models`   — List models across configured providers
//! - `generate` — One-shot generation with lorebook context resolution

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "fablecraft",
    about = "Fablecraft — AI generation core for fiction writing",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Init,

    /// List available models across configured providers
    Models {
        /// Only query a single provider
        #[arg(short, long)]
        provider: Option<String>,
    },

    /// Generate prose from a prompt, with lorebook context resolution
    Generate {
        /// The instruction or scene direction to write from
        prompt: String,

        /// Story id used for lorebook scoping
        #[arg(short, long, default_value = "story")]
        story: String,

        /// Series id for series-level lorebook entries
        #[arg(long)]
        series: Option<String>,

        /// Path to a lorebook snapshot (JSON array of entries)
        #[arg(short, long)]
        lorebook: Option<String>,

        /// Path to the current chapter text, matched against the lorebook
        #[arg(long)]
        chapter: Option<String>,

        /// Scene beat to match and expand
        #[arg(long)]
        scene_beat: Option<String>,

        /// Provider to use (defaults to the configured default)
        #[arg(long)]
        provider: Option<String>,

        /// Model to use (defaults to the provider's configured model)
        #[arg(short, long)]
        model: Option<String>,

        /// Override the system prompt template
        #[arg(long)]
        system: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Init => commands::init::run().await?,
        Commands::Models { provider } => commands::models::run(provider).await?,
        Commands::Generate {
            prompt,
            story,
            series,
            lorebook,
            chapter,
            scene_beat,
            provider,
            model,
            system,
        } => {
            commands::generate::run(commands::generate::GenerateArgs {
                prompt,
                story,
                series,
                lorebook,
                chapter,
                scene_beat,
                provider,
                model,
                system,
            })
            .await?
        }
    }

    Ok(())
}
