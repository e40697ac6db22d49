//! `fablecraft init` — Create the default configuration file.

use fablecraft_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("✒️  Fablecraft — Setup");
    println!("=====================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  ✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  ⚠️  Config already exists at: {}", config_path.display());
        println!("     Edit it manually or delete and re-run init.");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  ✅ Created config: {}", config_path.display());
        println!();
        println!("  Next steps:");
        println!("    1. Set an API key:  export OPENAI_API_KEY=sk-...  (or OPENROUTER_API_KEY)");
        println!("    2. Check models:    fablecraft models");
        println!("    3. Generate:        fablecraft generate \"Alice reaches the harbor at dusk\"");
    }

    Ok(())
}
