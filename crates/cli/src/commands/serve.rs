//! `robotutor serve`: Start the HTTP tutoring server.

use std::path::PathBuf;

pub async fn run(
    port_override: Option<u16>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path.as_deref())?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("RoboTutor server");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.provider.model);
    if let Some(dir) = &config.gateway.static_dir {
        println!("   Static:    {dir}");
    }
    if !config.has_api_key() {
        eprintln!("   WARNING: no API key configured, chat requests will fail.");
        eprintln!("   Set OPENROUTER_API_KEY or add api_key to the config file.");
    }

    robotutor_gateway::start(config).await?;

    Ok(())
}
