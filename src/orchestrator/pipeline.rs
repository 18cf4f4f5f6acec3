/*!
 * Per-entity translation pipeline.
 *
 * For one entity and every target language, in declared order:
 * decide (create/skip/overwrite) → translate the content tree → serialize →
 * upsert → orchestrator hook. A failure for one language is recorded and the
 * loop moves on to the next language.
 */

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use log::debug;

use crate::app_config::{Config, LanguageConfig};
use crate::content::ContentFields;
use crate::database::{EntitySourceReader, TranslationRepository};
use crate::entities::{EntityKind, FieldSpec, SourceEntity};
use crate::errors::{AppError, TranslationError};
use crate::events::{EventSink, LogEventSink, TranslationEvent};
use crate::orchestrator::EntityOrchestrator;
use crate::providers::TranslationProvider;
use crate::translation::{Decision, ScalarTranslator, TreeTranslator, decide, serialize_fields};
use crate::validation::OutputValidator;

/// Result of one (entity, language) attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LanguageStatus {
    /// A new row was written
    Created,
    /// An existing row was overwritten
    Updated,
    /// A row exists and force was not requested
    Skipped,
    /// Nothing was written
    Failed(String),
}

impl LanguageStatus {
    /// Whether a row was written
    pub fn is_persisted(&self) -> bool {
        matches!(self, LanguageStatus::Created | LanguageStatus::Updated)
    }

    /// Whether the attempt failed
    pub fn is_failed(&self) -> bool {
        matches!(self, LanguageStatus::Failed(_))
    }
}

impl fmt::Display for LanguageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageStatus::Created => write!(f, "created"),
            LanguageStatus::Updated => write!(f, "updated"),
            LanguageStatus::Skipped => write!(f, "skipped"),
            LanguageStatus::Failed(error) => write!(f, "failed: {}", error),
        }
    }
}

/// Outcome for one entity in one language
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageOutcome {
    /// Content type
    pub kind: EntityKind,
    /// Entity id
    pub entity_id: i64,
    /// Target language
    pub language: String,
    /// What happened
    pub status: LanguageStatus,
    /// Fields left out of the row because they could not be serialized
    pub skipped_fields: Vec<String>,
}

/// Everything that happened while translating one entity
#[derive(Debug, Clone, PartialEq)]
pub struct EntityReport {
    /// Content type
    pub kind: EntityKind,
    /// Entity id
    pub entity_id: i64,
    /// One outcome per target language, in declared order
    pub languages: Vec<LanguageOutcome>,
    /// Outcomes for related entities written by the orchestrator hook
    pub related: Vec<LanguageOutcome>,
}

impl EntityReport {
    /// Number of failed languages for the entity itself
    pub fn failed_count(&self) -> usize {
        self.languages.iter().filter(|o| o.status.is_failed()).count()
    }

    /// Outcome for one language, if it was attempted
    pub fn outcome(&self, language: &str) -> Option<&LanguageOutcome> {
        self.languages.iter().find(|o| o.language == language)
    }

    /// Whether every attempted language succeeded or was skipped
    pub fn is_success(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Runs the per-language loop for single entities
pub struct TranslationPipeline {
    reader: Arc<dyn EntitySourceReader>,
    repository: Arc<dyn TranslationRepository>,
    translator: TreeTranslator,
    languages: LanguageConfig,
    sink: Arc<dyn EventSink>,
}

impl TranslationPipeline {
    /// Create a pipeline from its parts
    pub fn new(
        reader: Arc<dyn EntitySourceReader>,
        repository: Arc<dyn TranslationRepository>,
        translator: TreeTranslator,
        languages: LanguageConfig,
    ) -> Self {
        Self {
            reader,
            repository,
            translator,
            languages,
            sink: Arc::new(LogEventSink),
        }
    }

    /// Send pipeline events to this sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Wire a pipeline from configuration
    ///
    /// `store` serves both as source reader and translation repository.
    pub fn from_config<S>(
        config: &Config,
        provider: Arc<dyn TranslationProvider>,
        store: Arc<S>,
        sink: Arc<dyn EventSink>,
    ) -> Self
    where
        S: EntitySourceReader + TranslationRepository + 'static,
    {
        let scalar = ScalarTranslator::from_config(provider, &config.provider);
        let validator = OutputValidator::for_source_language(&config.languages.source, &config.validation);
        let translator = TreeTranslator::new(scalar)
            .with_validator(validator)
            .with_sink(sink.clone())
            .with_max_depth(config.translation.max_depth);

        let reader: Arc<dyn EntitySourceReader> = store.clone();
        let repository: Arc<dyn TranslationRepository> = store;

        Self::new(reader, repository, translator, config.languages.clone()).with_sink(sink)
    }

    /// Language set in use
    pub fn languages(&self) -> &LanguageConfig {
        &self.languages
    }

    /// Source reader in use
    pub fn reader(&self) -> &dyn EntitySourceReader {
        self.reader.as_ref()
    }

    /// Event sink in use
    pub fn sink(&self) -> &dyn EventSink {
        self.sink.as_ref()
    }

    /// Translate one entity into every target language
    ///
    /// Fails only when the entity cannot be loaded; per-language failures
    /// are part of the report.
    pub async fn translate_entity(
        &self,
        orchestrator: &dyn EntityOrchestrator,
        entity_id: i64,
        force: bool,
    ) -> Result<EntityReport> {
        let entity = self.load(orchestrator.kind(), entity_id).await?;
        let targets = self.languages.target_languages();

        self.sink.emit(&TranslationEvent::EntityStarted {
            kind: entity.kind,
            entity_id,
            languages: targets.clone(),
            force,
        });

        let mut report = EntityReport {
            kind: entity.kind,
            entity_id,
            languages: Vec::with_capacity(targets.len()),
            related: Vec::new(),
        };

        for language in &targets {
            self.translate_language_into(orchestrator, &entity, language, force, &mut report)
                .await;
        }

        Ok(report)
    }

    /// Translate one entity into a single target language
    pub async fn translate_language(
        &self,
        orchestrator: &dyn EntityOrchestrator,
        entity_id: i64,
        language: &str,
        force: bool,
    ) -> Result<EntityReport> {
        if self.languages.is_source(language) {
            return Err(TranslationError::SourceLanguageTarget(language.to_string()).into());
        }
        let language = self
            .languages
            .canonical(language)
            .ok_or_else(|| AppError::Config(format!("Language '{}' is not a supported site language", language)))?;

        let entity = self.load(orchestrator.kind(), entity_id).await?;

        self.sink.emit(&TranslationEvent::EntityStarted {
            kind: entity.kind,
            entity_id,
            languages: vec![language.to_string()],
            force,
        });

        let mut report = EntityReport {
            kind: entity.kind,
            entity_id,
            languages: Vec::with_capacity(1),
            related: Vec::new(),
        };
        self.translate_language_into(orchestrator, &entity, language, force, &mut report)
            .await;

        Ok(report)
    }

    async fn load(&self, kind: EntityKind, entity_id: i64) -> Result<SourceEntity> {
        self.reader
            .load_entity(kind, entity_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound { kind, id: entity_id }.into())
    }

    async fn translate_language_into(
        &self,
        orchestrator: &dyn EntityOrchestrator,
        entity: &SourceEntity,
        language: &str,
        force: bool,
        report: &mut EntityReport,
    ) {
        let outcome = self
            .translate_loaded(entity, orchestrator.fields(), language, force)
            .await;
        let persisted = outcome.status.is_persisted();
        report.languages.push(outcome);

        if persisted {
            let related = orchestrator.after_persist(self, entity, language, force).await;
            report.related.extend(related);
        }
    }

    /// Decide, translate, serialize and persist one already loaded entity
    ///
    /// Never fails; errors become a `Failed` outcome and an event.
    pub(crate) async fn translate_loaded(
        &self,
        entity: &SourceEntity,
        fields: &[FieldSpec],
        language: &str,
        force: bool,
    ) -> LanguageOutcome {
        let mut outcome = LanguageOutcome {
            kind: entity.kind,
            entity_id: entity.id,
            language: language.to_string(),
            status: LanguageStatus::Skipped,
            skipped_fields: Vec::new(),
        };

        match self.run_language(entity, fields, language, force, &mut outcome).await {
            Ok(status) => outcome.status = status,
            Err(error) => {
                let message = format!("{:#}", error);
                self.sink.emit(&TranslationEvent::TranslationFailed {
                    kind: entity.kind,
                    entity_id: entity.id,
                    language: language.to_string(),
                    error: message.clone(),
                });
                outcome.status = LanguageStatus::Failed(message);
            }
        }

        outcome
    }

    async fn run_language(
        &self,
        entity: &SourceEntity,
        fields: &[FieldSpec],
        language: &str,
        force: bool,
        outcome: &mut LanguageOutcome,
    ) -> Result<LanguageStatus> {
        if self.languages.is_source(language) {
            return Err(TranslationError::SourceLanguageTarget(language.to_string()).into());
        }

        let existing = self
            .repository
            .find_translation(entity.kind, entity.id, language)
            .await?;

        let decision = decide(existing.as_ref(), force);
        debug!("{} #{} -> {}: {}", entity.kind, entity.id, language, decision);

        if decision == Decision::Skip {
            self.sink.emit(&TranslationEvent::TranslationSkipped {
                kind: entity.kind,
                entity_id: entity.id,
                language: language.to_string(),
            });
            return Ok(LanguageStatus::Skipped);
        }

        self.sink.emit(&TranslationEvent::TranslationStarted {
            kind: entity.kind,
            entity_id: entity.id,
            language: language.to_string(),
        });

        let wanted: BTreeSet<&str> = fields.iter().map(|f| f.name).collect();
        let source: ContentFields = entity
            .fields
            .iter()
            .filter(|(name, _)| wanted.contains(name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let translated = self
            .translator
            .translate_fields(&source, &self.languages.source, language)
            .await?;

        let serialized = serialize_fields(&translated);
        for skipped in &serialized.skipped {
            self.sink.emit(&TranslationEvent::SerializationFailed {
                kind: entity.kind,
                entity_id: entity.id,
                language: language.to_string(),
                field: skipped.field.clone(),
                error: skipped.error.to_string(),
            });
            outcome.skipped_fields.push(skipped.field.clone());
        }

        let record = self
            .repository
            .upsert_translation(entity.kind, entity.id, language, &serialized.fields, true)
            .await?;

        let created = decision == Decision::Create;
        self.sink.emit(&TranslationEvent::TranslationPersisted {
            kind: entity.kind,
            entity_id: entity.id,
            language: record.language,
            created,
            field_count: serialized.fields.len(),
        });

        Ok(if created {
            LanguageStatus::Created
        } else {
            LanguageStatus::Updated
        })
    }
}
