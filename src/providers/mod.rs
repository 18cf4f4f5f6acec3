/*!
 * Translation providers.
 *
 * Every backend implements `TranslationProvider`: translate one text from a
 * source language to a target language.
 * - `google`: Google Cloud Translation v2
 * - `anthropic`: Anthropic Messages API with a translation prompt
 * - `ollama`: local Ollama server with a translation prompt
 * - `mock`: deterministic offline provider
 */

use std::fmt::Debug;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::language_utils;

pub mod anthropic;
pub mod google;
pub mod mock;
pub mod ollama;

pub use anthropic::Anthropic;
pub use google::GoogleTranslate;
pub use mock::{MockBehavior, MockProvider, MockRequest};
pub use ollama::Ollama;

/// Interface every translation backend implements
///
/// Implementations translate exactly the given text. They do not trim,
/// retry empty results or apply time budgets; the scalar translator does.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate `text` from `source_language` into `target_language`
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError>;

    /// Human-readable provider name for logs
    fn name(&self) -> &str;
}

/// Build the provider selected in configuration
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn TranslationProvider>> {
    let provider: Arc<dyn TranslationProvider> = match config.kind {
        ProviderKind::Google => Arc::new(
            GoogleTranslate::new(config.get_api_key(), config.get_endpoint())
                .map_err(|e| anyhow!("Failed to create Google Translate client: {}", e))?,
        ),
        ProviderKind::Anthropic => {
            let api_key = config.get_api_key();
            if api_key.is_empty() {
                return Err(anyhow!("Anthropic API key is not configured"));
            }
            Arc::new(
                Anthropic::new(api_key, config.get_endpoint(), config.get_model())
                    .with_temperature(config.temperature),
            )
        }
        ProviderKind::Ollama => Arc::new(
            Ollama::from_url(config.get_endpoint(), config.get_model())
                .with_temperature(config.temperature),
        ),
        ProviderKind::Mock => Arc::new(MockProvider::working()),
    };

    Ok(provider)
}

/// System prompt shared by the LLM-backed providers
pub(crate) fn translation_system_prompt(source_language: &str, target_language: &str) -> String {
    let source_name = language_utils::get_language_name(source_language)
        .unwrap_or_else(|_| source_language.to_string());
    let target_name = language_utils::get_language_name(target_language)
        .unwrap_or_else(|_| target_language.to_string());

    format!(
        "You are a professional translator for a travel website. Translate the user's text \
         from {} to {}. Keep proper nouns, place names, numbers, URLs and HTML tags unchanged. \
         Reply with the translation only, without quotes, notes or explanations.",
        source_name, target_name
    )
}
