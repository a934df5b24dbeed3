//! Provider construction from configuration.

use std::sync::Arc;
use std::time::Duration;

use robotutor_config::AppConfig;
use robotutor_core::error::ProviderError;
use robotutor_core::provider::Provider;
use tracing::warn;

use crate::openrouter::OpenRouterProvider;

/// Build the configured provider.
///
/// A missing API key is not fatal here: the server still starts and every
/// chat request reports the provider as not configured.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.api_key.clone().unwrap_or_default();
    if !config.has_api_key() {
        warn!(
            provider = %config.provider.name,
            "No API key configured; chat requests will fail until one is set"
        );
    }

    let mut provider = OpenRouterProvider::new(&config.provider.base_url, api_key)
        .with_name(&config.provider.name)
        .with_app_title(&config.app_title)
        .with_default_referer(config.public_url.clone())
        .with_pdf_engine(&config.provider.pdf_engine);

    if let Some(secs) = config.provider.timeout_secs {
        provider = provider.with_timeout(Duration::from_secs(secs))?;
    }

    Ok(Arc::new(provider))
}
