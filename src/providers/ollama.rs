use std::time::Duration;

use async_trait::async_trait;
use log::{error, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::providers::{TranslationProvider, translation_system_prompt};

/// Ollama client for interacting with a local Ollama server
pub struct Ollama {
    /// Base URL of the Ollama API
    base_url: String,
    /// HTTP client for making requests
    client: Client,
    /// Model used for translation requests
    model: String,
    /// Sampling temperature
    temperature: f32,
    /// Maximum number of retry attempts
    max_retries: u32,
    /// Base backoff time in milliseconds for exponential backoff
    backoff_base_ms: u64,
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// System message to guide the model
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Generation response from the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: String,
    /// Generated text
    #[serde(default)]
    pub response: String,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            options: None,
            stream: Some(false),
        }
    }

    /// Set the system message
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.options = Some(GenerationOptions {
            temperature: Some(temperature),
        });
        self
    }
}

impl Ollama {
    /// Create a new Ollama client from a complete URL
    pub fn from_url(url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: url.into().trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            model: model.into(),
            temperature: 0.3,
            max_retries: 2,
            backoff_base_ms: 500,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set retry behavior
    pub fn with_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Generate text from the Ollama API with retry logic
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse, ProviderError> {
        let url = format!("{}/api/generate", self.base_url);

        let mut attempt = 0;
        let mut last_error = None;

        while attempt <= self.max_retries {
            match self.client.post(&url).json(request).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let response_text = response.text().await.map_err(|e| {
                            ProviderError::ParseError(format!("Failed to get response text from Ollama API: {}", e))
                        })?;
                        return Self::parse_generation(&response_text);
                    }

                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Failed to get error response text".to_string());

                    if !status.is_server_error() {
                        // Client error - don't retry
                        error!("Ollama API error ({}): {}", status, error_text);
                        return Err(ProviderError::ApiError {
                            status_code: status.as_u16(),
                            message: error_text,
                        });
                    }

                    error!(
                        "Ollama API error ({}): {} - attempt {}/{}",
                        status,
                        error_text,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ApiError {
                        status_code: status.as_u16(),
                        message: error_text,
                    });
                }
                Err(e) => {
                    warn!(
                        "Ollama API network error: {} - attempt {}/{}",
                        e,
                        attempt + 1,
                        self.max_retries + 1
                    );
                    last_error = Some(ProviderError::ConnectionError(format!(
                        "Failed to send request to Ollama API: {}",
                        e
                    )));
                }
            }

            attempt += 1;

            if attempt <= self.max_retries {
                let backoff_ms = self.backoff_base_ms * (1u64 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            ProviderError::RequestFailed(format!(
                "Ollama API request failed after {} attempts",
                self.max_retries + 1
            ))
        }))
    }

    /// Parse a generate response, tolerating a streamed JSONL body
    fn parse_generation(body: &str) -> Result<GenerationResponse, ProviderError> {
        if let Ok(parsed) = serde_json::from_str::<GenerationResponse>(body) {
            return Ok(parsed);
        }

        let mut model = String::new();
        let mut text = String::new();
        let mut done = false;
        let mut parsed_any = false;

        for line in body.lines().filter(|l| !l.trim().is_empty()) {
            let chunk: GenerationResponse = serde_json::from_str(line)
                .map_err(|e| ProviderError::ParseError(format!("Invalid Ollama response line: {}", e)))?;
            parsed_any = true;
            if model.is_empty() {
                model = chunk.model;
            }
            text.push_str(&chunk.response);
            done = chunk.done;
        }

        if !parsed_any {
            return Err(ProviderError::ParseError("Empty response body from Ollama API".to_string()));
        }

        Ok(GenerationResponse {
            model,
            response: text,
            done,
        })
    }
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl TranslationProvider for Ollama {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let request = GenerationRequest::new(&self.model, text)
            .system(translation_system_prompt(source_language, target_language))
            .temperature(self.temperature);

        let response = self.generate(&request).await?;
        Ok(response.response.trim().to_string())
    }

    fn name(&self) -> &str {
        "Ollama"
    }
}
