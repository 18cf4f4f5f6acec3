/*!
 * # cms-translate
 *
 * Automatic translation of CMS content into every configured site language.
 *
 * ## Features
 *
 * - Translate packages, blog posts, testimonials, gallery items, sections and
 *   navigation items from the canonical source language
 * - Walk nested content (lists, mappings) and translate only text leaves
 * - Idempotent storage: existing translations are skipped unless forced
 * - Header sections also translate the navigation items they render
 * - Batch runs that keep going when a single entity fails
 * - Pluggable providers:
 *   - Google Cloud Translation
 *   - Anthropic API
 *   - Ollama (local LLM)
 *
 * ## Architecture
 *
 * - `app_config`: Configuration management
 * - `content`: Content tree values
 * - `entities`: Content types and their translatable fields
 * - `providers`: Translation provider clients
 * - `translation`: Scalar and tree translation, serialization, idempotency:
 *   - `translation::scalar`: One text through the provider with a timeout
 *   - `translation::tree`: Depth-limited walk over content trees
 *   - `translation::serializer`: Storage text for translated values
 *   - `translation::idempotency`: Create / skip / overwrite decisions
 * - `validation`: Heuristic checks of provider output
 * - `database`: SQLite storage of source rows and translations
 * - `orchestrator`: Per-entity pipelines and the header fan-out
 * - `batch`: Runs over all published entities of a type
 * - `events`: Pipeline event sinks
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod batch;
pub mod content;
pub mod database;
pub mod entities;
pub mod errors;
pub mod events;
pub mod language_utils;
pub mod orchestrator;
pub mod providers;
pub mod translation;
pub mod validation;

// Re-export main types for easier usage
pub use app_config::{Config, LanguageConfig, ProviderConfig, ProviderKind};
pub use batch::{BatchController, BatchEntry, BatchReport};
pub use content::{ContentFields, ContentValue};
pub use database::{Repository, TranslationRecord};
pub use entities::{EntityKind, SourceEntity};
pub use errors::{AppError, ProviderError, SerializeError, TranslationError};
pub use events::{EventSink, LogEventSink, RecordingEventSink, TranslationEvent};
pub use language_utils::{get_language_name, language_codes_match};
pub use orchestrator::{EntityReport, LanguageOutcome, LanguageStatus, TranslationPipeline, orchestrator_for};
