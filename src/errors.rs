/*!
 * Error types for the cms-translate pipeline.
 *
 * Provider failures are collapsed into `ProviderError`, the per-language
 * translation attempt reports `TranslationError`, field serialization reports
 * `SerializeError`, and `AppError` wraps everything at the application edge.
 */

use thiserror::Error;

use crate::entities::EntityKind;

/// Errors that can occur when talking to a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Provider is misconfigured (missing key, bad endpoint)
    #[error("Provider configuration error: {0}")]
    ConfigError(String),
}

/// Errors that abort one (entity, target language) attempt
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The provider reported a failure
    #[error("Provider failure: {0}")]
    ProviderFailure(#[from] ProviderError),

    /// The provider did not answer within the time budget
    #[error("Provider timed out after {seconds}s")]
    ProviderTimeout {
        /// Budget that was exceeded
        seconds: u64,
    },

    /// The provider returned nothing for non-empty input
    #[error("Provider returned an empty translation for non-empty input")]
    EmptyResult,

    /// A translation into the source language was requested
    #[error("Refusing to translate into the source language '{0}'")]
    SourceLanguageTarget(String),
}

/// Errors converting a translated field into its storable form
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SerializeError {
    /// JSON cannot represent NaN or infinities
    #[error("Non-finite number at {path}")]
    NonFiniteNumber {
        /// Location of the offending value inside the field
        path: String,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Persistence layer failure
    #[error("Database error: {0}")]
    Database(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// The requested source entity does not exist
    #[error("{kind} #{id} not found")]
    EntityNotFound {
        /// Entity type
        kind: EntityKind,
        /// Entity id
        id: i64,
    },

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Database(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::Config(error.to_string())
    }
}
