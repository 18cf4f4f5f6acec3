/*!
 * Scalar translator.
 *
 * Translates exactly one text through the configured provider. Blank input
 * never reaches the provider; every call is bounded by a time budget and
 * optionally spaced from the previous one.
 */

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use parking_lot::Mutex;

use crate::app_config::ProviderConfig;
use crate::errors::TranslationError;
use crate::providers::TranslationProvider;

/// Default time budget for one provider call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Translates single strings through a provider
#[derive(Debug)]
pub struct ScalarTranslator {
    /// Backend doing the actual translation
    provider: Arc<dyn TranslationProvider>,
    /// Budget for one provider call
    timeout: Duration,
    /// Minimum spacing between consecutive provider calls
    request_delay: Duration,
    /// When the previous provider call started
    last_request: Mutex<Option<Instant>>,
}

impl ScalarTranslator {
    /// Create a translator with the default budget and no spacing
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self {
            provider,
            timeout: DEFAULT_TIMEOUT,
            request_delay: Duration::ZERO,
            last_request: Mutex::new(None),
        }
    }

    /// Create a translator using the provider settings from configuration
    pub fn from_config(provider: Arc<dyn TranslationProvider>, config: &ProviderConfig) -> Self {
        Self::new(provider)
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_request_delay(Duration::from_millis(config.request_delay_ms))
    }

    /// Set the budget for one provider call
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the minimum spacing between provider calls
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Name of the underlying provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Translate one text
    ///
    /// Empty or whitespace-only text is returned unchanged without a provider
    /// call. A provider answer that is blank for non-blank input is an error.
    pub async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, TranslationError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        self.pace().await;

        debug!(
            "{}: translating {} chars {} -> {}",
            self.provider.name(),
            text.chars().count(),
            source_language,
            target_language
        );

        let call = self.provider.translate(text, source_language, target_language);
        match tokio::time::timeout(self.timeout, call).await {
            Err(_) => Err(TranslationError::ProviderTimeout {
                seconds: self.timeout.as_secs(),
            }),
            Ok(Err(error)) => Err(TranslationError::ProviderFailure(error)),
            Ok(Ok(translated)) if translated.trim().is_empty() => Err(TranslationError::EmptyResult),
            Ok(Ok(translated)) => Ok(translated),
        }
    }

    /// Wait until the configured spacing since the previous call has passed
    async fn pace(&self) {
        if self.request_delay.is_zero() {
            return;
        }

        let wait = {
            let mut last = self.last_request.lock();
            let now = Instant::now();
            let wait = last
                .map(|previous| self.request_delay.saturating_sub(now.duration_since(previous)))
                .unwrap_or(Duration::ZERO);
            *last = Some(now + wait);
            wait
        };

        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
