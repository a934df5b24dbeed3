//! `robotutor ask`: Single-question mode through the same tutor the server uses.

use std::path::PathBuf;
use std::sync::Arc;

use robotutor_agent::{ChatTurn, Tutor};
use robotutor_config::AppConfig;
use robotutor_core::document::{DEFAULT_FILENAME, Document};
use robotutor_memory::InMemorySessionStore;

pub async fn run(
    prompt: String,
    level: String,
    file: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path.as_deref())?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENROUTER_API_KEY=sk-or-v1-...   (recommended)");
        eprintln!("    ROBOTUTOR_API_KEY=sk-or-v1-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", super::default_config_path().display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let document = match &file {
        Some(path) => Some(read_document(path).await?),
        None => None,
    };

    let tutor = build_tutor(&config)?;
    let reply = tutor
        .chat(ChatTurn {
            prompt: Some(prompt),
            level: Some(level),
            document_prompt: document.is_some(),
            file_name: document.as_ref().map(|d| d.filename.clone()),
            pdf_data: document.map(|d| d.data_url),
            ..ChatTurn::default()
        })
        .await?;

    println!("{}", reply.text);
    Ok(())
}

fn build_tutor(config: &AppConfig) -> Result<Tutor, Box<dyn std::error::Error>> {
    let provider = robotutor_providers::build_from_config(config)?;
    let sessions = Arc::new(InMemorySessionStore::with_history_limit(
        config.session.history_limit,
    ));
    Ok(Tutor::from_config(config, provider, sessions))
}

async fn read_document(path: &std::path::Path) -> Result<Document, Box<dyn std::error::Error>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string());
    tracing::debug!(file = %filename, bytes = bytes.len(), "Loaded document");
    Ok(Document::from_bytes(filename, &bytes))
}
