/*!
 * Entity orchestration.
 *
 * One orchestrator per content type decides which fields are translated and
 * what happens after a translation row is stored. The shared
 * `TranslationPipeline` runs the per-language loop for all of them.
 *
 * - `pipeline`: load, decide, translate, serialize and persist per language
 * - `entities`: the six content type orchestrators
 * - `navigation`: header section fan-out to its navigation items
 */

use async_trait::async_trait;

use crate::entities::{EntityKind, FieldSpec, SourceEntity};

pub mod entities;
pub mod navigation;
pub mod pipeline;

pub use entities::{
    BlogOrchestrator, GalleryOrchestrator, NavigationItemOrchestrator, PackageOrchestrator,
    SectionOrchestrator, TestimonialOrchestrator, orchestrator_for,
};
pub use pipeline::{EntityReport, LanguageOutcome, LanguageStatus, TranslationPipeline};

/// Per content type behavior plugged into the pipeline
#[async_trait]
pub trait EntityOrchestrator: Send + Sync {
    /// Content type handled
    fn kind(&self) -> EntityKind;

    /// Fields sent through the tree translator
    fn fields(&self) -> &'static [FieldSpec] {
        self.kind().fields()
    }

    /// Called after a translation row for `language` has been written
    ///
    /// Outcomes for related entities are returned for reporting; failures in
    /// here never affect the entity's own outcome.
    async fn after_persist(
        &self,
        _pipeline: &TranslationPipeline,
        _entity: &SourceEntity,
        _language: &str,
        _force: bool,
    ) -> Vec<LanguageOutcome> {
        Vec::new()
    }
}
