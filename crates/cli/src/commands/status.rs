//! `robotutor status`: Show resolved configuration.

use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config_path.unwrap_or_else(super::default_config_path);
    let config = super::load_config(Some(path.as_path()))?;

    println!("RoboTutor Status");
    println!("================");
    println!("  Config file:  {}", path.display());
    println!("  API key:      {}", if config.has_api_key() { "set" } else { "missing" });
    println!("  Provider:     {} ({})", config.provider.name, config.provider.base_url);
    println!("  Model:        {}", config.provider.model);
    println!("  Max tokens:   {}", config.provider.max_tokens);
    println!("  PDF engine:   {}", config.provider.pdf_engine);
    println!("  App title:    {}", config.app_title);
    println!(
        "  Public URL:   {}",
        config.public_url.as_deref().unwrap_or("(request Referer)")
    );
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  Body limit:   {} MB", config.gateway.body_limit_mb);
    println!(
        "  CORS:         {}",
        if config.gateway.allowed_origins.is_empty() {
            "any origin".to_string()
        } else {
            config.gateway.allowed_origins.join(", ")
        }
    );
    println!("  History:      {} messages", config.session.history_limit);

    if path.exists() {
        println!("\n  Config file found");
    } else {
        println!("\n  No config file, using defaults and environment");
    }

    Ok(())
}
