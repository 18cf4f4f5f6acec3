/*!
 * Mock provider implementations for testing and dry runs.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with `[<target>] <text>`
 * - `MockProvider::echo()` - Returns the input unchanged
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::failing_for(lang)` - Fails only for one target language
 * - `MockProvider::empty()` - Returns an empty string
 * - `MockProvider::slow(ms)` - Sleeps before answering
 *
 * Every request is counted and recorded; clones share the same counters.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// One request seen by the mock provider
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// The text to translate
    pub text: String,
    /// Source language
    pub source_language: String,
    /// Target language
    pub target_language: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with a tagged translation
    Working,
    /// Returns the input unchanged
    Echo,
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Fails for one target language, works for the others
    FailFor { language: String },
    /// Returns empty response
    Empty,
    /// Simulates slow response (for timeout testing)
    Slow { delay_ms: u64 },
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter shared between clones
    request_count: Arc<AtomicUsize>,
    /// Every request in arrival order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that returns its input
    pub fn echo() -> Self {
        Self::new(MockBehavior::Echo)
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent {
            fail_every: fail_every.max(1),
        })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that fails only for one target language
    pub fn failing_for(language: impl Into<String>) -> Self {
        Self::new(MockBehavior::FailFor {
            language: language.into(),
        })
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Create a mock that answers after a delay
    pub fn slow(delay_ms: u64) -> Self {
        Self::new(MockBehavior::Slow { delay_ms })
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Snapshot of the requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Forget all recorded requests
    pub fn reset(&self) {
        self.request_count.store(0, Ordering::SeqCst);
        self.requests.lock().clear();
    }

    fn translated(&self, request: &MockRequest) -> String {
        match self.custom_response {
            Some(generator) => generator(request),
            None => format!("[{}] {}", request.target_language, request.text),
        }
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        let request = MockRequest {
            text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
        };
        self.requests.lock().push(request.clone());

        match &self.behavior {
            MockBehavior::Working => Ok(self.translated(&request)),

            MockBehavior::Echo => Ok(request.text),

            MockBehavior::Intermittent { fail_every } => {
                if count % fail_every == fail_every - 1 {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    })
                } else {
                    Ok(self.translated(&request))
                }
            }

            MockBehavior::Failing => Err(ProviderError::ApiError {
                message: "Simulated provider failure".to_string(),
                status_code: 500,
            }),

            MockBehavior::FailFor { language } => {
                if language == target_language {
                    Err(ProviderError::ApiError {
                        message: format!("Simulated failure for {}", language),
                        status_code: 500,
                    })
                } else {
                    Ok(self.translated(&request))
                }
            }

            MockBehavior::Empty => Ok(String::new()),

            MockBehavior::Slow { delay_ms } => {
                tokio::time::sleep(tokio::time::Duration::from_millis(*delay_ms)).await;
                Ok(self.translated(&request))
            }
        }
    }

    fn name(&self) -> &str {
        "Mock"
    }
}
