/*!
 * Structured pipeline events.
 *
 * Every observable step of a translation run is reported as a
 * `TranslationEvent` through an `EventSink`. The default sink renders events
 * through the `log` facade; the recording sink keeps them for inspection.
 */

use std::fmt;
use std::sync::Arc;

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::entities::EntityKind;
use crate::validation::SuspectReason;

/// Something that happened during a translation run
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationEvent {
    /// An entity run began
    EntityStarted {
        kind: EntityKind,
        entity_id: i64,
        languages: Vec<String>,
        force: bool,
    },
    /// A (entity, language) attempt is going to call the provider
    TranslationStarted {
        kind: EntityKind,
        entity_id: i64,
        language: String,
    },
    /// A record already exists and no force flag was given
    TranslationSkipped {
        kind: EntityKind,
        entity_id: i64,
        language: String,
    },
    /// A record was written
    TranslationPersisted {
        kind: EntityKind,
        entity_id: i64,
        language: String,
        created: bool,
        field_count: usize,
    },
    /// A (entity, language) attempt failed; nothing was written for it
    TranslationFailed {
        kind: EntityKind,
        entity_id: i64,
        language: String,
        error: String,
    },
    /// A translated leaf looks like it was not translated
    ValidationSuspect {
        language: String,
        original: String,
        translated: String,
        reasons: Vec<SuspectReason>,
    },
    /// A field could not be serialized and was left out of the upsert
    SerializationFailed {
        kind: EntityKind,
        entity_id: i64,
        language: String,
        field: String,
        error: String,
    },
    /// A subtree was deeper than the configured ceiling and left untranslated
    DepthLimitReached {
        language: String,
        depth: usize,
        max_depth: usize,
    },
    /// An entity failed as a whole during a batch run
    EntityFailed {
        kind: EntityKind,
        entity_id: i64,
        error: String,
    },
    /// A batch run over one kind finished
    BatchCompleted {
        kind: EntityKind,
        total: usize,
        failed: usize,
    },
}

impl TranslationEvent {
    /// Short machine-friendly name of the event
    pub fn name(&self) -> &'static str {
        match self {
            Self::EntityStarted { .. } => "entity_started",
            Self::TranslationStarted { .. } => "translation_started",
            Self::TranslationSkipped { .. } => "translation_skipped",
            Self::TranslationPersisted { .. } => "translation_persisted",
            Self::TranslationFailed { .. } => "translation_failed",
            Self::ValidationSuspect { .. } => "validation_suspect",
            Self::SerializationFailed { .. } => "serialization_failed",
            Self::DepthLimitReached { .. } => "depth_limit_reached",
            Self::EntityFailed { .. } => "entity_failed",
            Self::BatchCompleted { .. } => "batch_completed",
        }
    }
}

impl fmt::Display for TranslationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityStarted { kind, entity_id, languages, force } => write!(
                f,
                "Translating {} #{} into [{}]{}",
                kind,
                entity_id,
                languages.join(", "),
                if *force { " (forced)" } else { "" }
            ),
            Self::TranslationStarted { kind, entity_id, language } => {
                write!(f, "{} #{} -> {}: translating", kind, entity_id, language)
            }
            Self::TranslationSkipped { kind, entity_id, language } => write!(
                f,
                "{} #{} -> {}: translation exists, skipping",
                kind, entity_id, language
            ),
            Self::TranslationPersisted { kind, entity_id, language, created, field_count } => write!(
                f,
                "{} #{} -> {}: {} {} field(s)",
                kind,
                entity_id,
                language,
                if *created { "created" } else { "updated" },
                field_count
            ),
            Self::TranslationFailed { kind, entity_id, language, error } => {
                write!(f, "{} #{} -> {}: failed: {}", kind, entity_id, language, error)
            }
            Self::ValidationSuspect { language, original, translated, reasons } => write!(
                f,
                "Suspicious {} translation '{}' -> '{}': {}",
                language,
                truncate_text(original, 60),
                truncate_text(translated, 60),
                reasons.iter().map(|r| r.to_string()).collect::<Vec<_>>().join("; ")
            ),
            Self::SerializationFailed { kind, entity_id, language, field, error } => write!(
                f,
                "{} #{} -> {}: field '{}' skipped: {}",
                kind, entity_id, language, field, error
            ),
            Self::DepthLimitReached { language, depth, max_depth } => write!(
                f,
                "Depth {} exceeds limit {} while translating to {}; subtree left untranslated",
                depth, max_depth, language
            ),
            Self::EntityFailed { kind, entity_id, error } => {
                write!(f, "{} #{} failed: {}", kind, entity_id, error)
            }
            Self::BatchCompleted { kind, total, failed } => write!(
                f,
                "Batch for {} finished: {} processed, {} failed",
                kind, total, failed
            ),
        }
    }
}

/// Destination for pipeline events
pub trait EventSink: Send + Sync {
    /// Receive one event
    fn emit(&self, event: &TranslationEvent);
}

/// Sink that writes events to the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: &TranslationEvent) {
        match event {
            TranslationEvent::TranslationFailed { .. } | TranslationEvent::EntityFailed { .. } => {
                error!("{}", event)
            }
            TranslationEvent::ValidationSuspect { .. }
            | TranslationEvent::SerializationFailed { .. }
            | TranslationEvent::DepthLimitReached { .. } => warn!("{}", event),
            TranslationEvent::TranslationStarted { .. } | TranslationEvent::TranslationSkipped { .. } => {
                debug!("{}", event)
            }
            _ => info!("{}", event),
        }
    }
}

/// Sink that keeps every event in memory
#[derive(Debug, Default, Clone)]
pub struct RecordingEventSink {
    events: Arc<Mutex<Vec<TranslationEvent>>>,
}

impl RecordingEventSink {
    /// Create an empty recording sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far
    pub fn events(&self) -> Vec<TranslationEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events with the given name
    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }

    /// Drop everything recorded so far
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: &TranslationEvent) {
        self.events.lock().push(event.clone());
    }
}

/// Sink that forwards every event to several sinks
#[derive(Clone, Default)]
pub struct FanOutSink {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl FanOutSink {
    /// Create a sink forwarding to the given sinks
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }
}

impl EventSink for FanOutSink {
    fn emit(&self, event: &TranslationEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}

/// Truncate text for log output, respecting char boundaries
pub(crate) fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}
