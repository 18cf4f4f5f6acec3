/*!
 * Batch controller.
 *
 * Translates every published entity of a content type, one entity at a
 * time. Each entity is isolated: an error or a panic while translating it is
 * recorded and the batch continues with the next id.
 */

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use indicatif::ProgressBar;
use log::{error, info};

use crate::entities::EntityKind;
use crate::events::TranslationEvent;
use crate::orchestrator::{EntityReport, TranslationPipeline, orchestrator_for};

/// Result of one entity within a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEntry {
    /// The entity ran; individual languages may still have failed
    Completed(EntityReport),
    /// The entity could not be processed at all
    Failed {
        /// Entity id
        entity_id: i64,
        /// Error or panic message
        error: String,
    },
}

impl BatchEntry {
    /// Id of the entity this entry is about
    pub fn entity_id(&self) -> i64 {
        match self {
            BatchEntry::Completed(report) => report.entity_id,
            BatchEntry::Failed { entity_id, .. } => *entity_id,
        }
    }
}

/// Result of a batch run over one content type
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    /// Content type
    pub kind: EntityKind,
    /// One entry per published entity, in id order
    pub entries: Vec<BatchEntry>,
    /// Set when the published ids could not be listed
    pub error: Option<String>,
}

impl BatchReport {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
            error: None,
        }
    }

    /// Number of entities attempted
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    /// Number of entities that failed as a whole
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, BatchEntry::Failed { .. }))
            .count()
    }

    /// Number of failed (entity, language) attempts among completed entities
    pub fn language_failures(&self) -> usize {
        self.entries
            .iter()
            .filter_map(|e| match e {
                BatchEntry::Completed(report) => Some(report.failed_count()),
                BatchEntry::Failed { .. } => None,
            })
            .sum()
    }

    /// Ids of entities that failed as a whole
    pub fn failed_ids(&self) -> Vec<i64> {
        self.entries
            .iter()
            .filter(|e| matches!(e, BatchEntry::Failed { .. }))
            .map(BatchEntry::entity_id)
            .collect()
    }
}

/// Runs the pipeline over every published entity of a kind
pub struct BatchController {
    pipeline: Arc<TranslationPipeline>,
    progress: ProgressBar,
}

impl BatchController {
    /// Create a controller without visible progress
    pub fn new(pipeline: Arc<TranslationPipeline>) -> Self {
        Self {
            pipeline,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on this bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Translate every published entity of one kind
    ///
    /// Fails only when the published ids cannot be listed.
    pub async fn translate_all(&self, kind: EntityKind, force: bool) -> Result<BatchReport> {
        let ids = self.pipeline.reader().list_published(kind).await?;
        info!("Translating {} published {} entities", ids.len(), kind);

        let orchestrator = orchestrator_for(kind);
        let mut report = BatchReport::new(kind);

        self.progress.set_length(ids.len() as u64);
        self.progress.set_position(0);
        self.progress.set_message(kind.to_string());

        for entity_id in ids {
            let run = self.pipeline.translate_entity(orchestrator, entity_id, force);
            let entry = match AssertUnwindSafe(run).catch_unwind().await {
                Ok(Ok(entity_report)) => BatchEntry::Completed(entity_report),
                Ok(Err(e)) => self.entity_failed(kind, entity_id, format!("{:#}", e)),
                Err(panic) => self.entity_failed(kind, entity_id, format!("panicked: {}", panic_message(&panic))),
            };
            report.entries.push(entry);
            self.progress.inc(1);
        }

        self.pipeline.sink().emit(&TranslationEvent::BatchCompleted {
            kind,
            total: report.total(),
            failed: report.failed(),
        });

        Ok(report)
    }

    /// Translate every published entity of every kind, in batch order
    ///
    /// A kind whose ids cannot be listed gets a report carrying the error.
    pub async fn translate_everything(&self, force: bool) -> Vec<BatchReport> {
        let mut reports = Vec::with_capacity(EntityKind::ALL.len());

        for kind in EntityKind::ALL {
            match self.translate_all(kind, force).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!("Could not list published {} entities: {:#}", kind, e);
                    let mut report = BatchReport::new(kind);
                    report.error = Some(format!("{:#}", e));
                    reports.push(report);
                }
            }
        }

        reports
    }

    fn entity_failed(&self, kind: EntityKind, entity_id: i64, error: String) -> BatchEntry {
        self.pipeline.sink().emit(&TranslationEvent::EntityFailed {
            kind,
            entity_id,
            error: error.clone(),
        });
        BatchEntry::Failed { entity_id, error }
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
