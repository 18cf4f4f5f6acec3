//! Google Cloud Translation v2 client
//!
//! Sends single texts to the `language/translate/v2` endpoint with an API key
//! (`provider.api_key` or `GOOGLE_TRANSLATE_API_KEY`). Region subtags are kept
//! only for the Chinese variants the API distinguishes.

use std::time::Duration;

use async_trait::async_trait;
use log::error;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::errors::ProviderError;
use crate::language_utils;
use crate::providers::TranslationProvider;

/// Google Translate v2 provider
#[derive(Clone)]
pub struct GoogleTranslate {
    /// API key for authentication
    api_key: String,
    /// HTTP client for async requests
    client: Client,
    /// Base URL of the v2 API
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslatedText {
    translated_text: String,
}

impl GoogleTranslate {
    /// Maximum characters per string accepted by the API
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a client with an explicit API key and endpoint
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ProviderError::ConfigError("API key cannot be empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            client,
            base_url: base_url.into(),
        })
    }

    /// Language code in the form the API expects
    fn api_language_code(code: &str) -> String {
        let (base, region) = language_utils::split_locale(code);
        match (base.as_str(), region.as_deref()) {
            ("zh", Some("TW")) | ("zh", Some("HK")) => "zh-TW".to_string(),
            ("zh", Some(_)) => "zh-CN".to_string(),
            _ => base,
        }
    }
}

impl std::fmt::Debug for GoogleTranslate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslate")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslate {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(ProviderError::RequestFailed(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let body = json!({
            "q": [text],
            "source": Self::api_language_code(source_language),
            "target": Self::api_language_code(target_language),
            "format": "text"
        });

        let response = self
            .client
            .post(&self.base_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to reach Google Translate: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Google Translate API error ({}): {}", status, error_text);

            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::AuthenticationError(error_text),
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimitExceeded(error_text),
                _ => ProviderError::ApiError {
                    status_code: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        parsed
            .data
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| ProviderError::ParseError("Response contained no translations".to_string()))
    }

    fn name(&self) -> &str {
        "Google Translate"
    }
}
