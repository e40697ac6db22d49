//! `fablecraft models` — List models across configured providers.

use fablecraft_config::AppConfig;
use fablecraft_providers::build_from_config;

pub async fn run(only: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = build_from_config(&config);

    println!("📚 Available Models");
    println!("===================");

    let mut names: Vec<String> = registry.list().iter().map(|s| s.to_string()).collect();
    names.sort();

    for name in names {
        if only.as_deref().is_some_and(|o| o != name) {
            continue;
        }
        let Some(provider) = registry.get(&name) else {
            continue;
        };

        let healthy = provider.health_check().await.unwrap_or(false);
        let icon = if healthy { "✅" } else { "❌" };
        println!("\n  {icon} {name}");

        if !healthy {
            println!("     unreachable — check credentials and URL");
            continue;
        }

        match provider.list_models().await {
            Ok(models) if models.is_empty() => println!("     no models reported"),
            Ok(models) => {
                for model in models.iter().take(20) {
                    match model.context_length {
                        Some(len) => println!("     {:<44} {len:>8} ctx", model.id),
                        None => println!("     {}", model.id),
                    }
                }
                if models.len() > 20 {
                    println!("     … and {} more", models.len() - 20);
                }
            }
            Err(e) => println!("     failed to list models: {e}"),
        }
    }

    Ok(())
}
