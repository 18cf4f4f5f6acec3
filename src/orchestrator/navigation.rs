//! Header section fan-out to navigation items.
//!
//! Once the header section is stored for a language, every navigation item
//! it renders is translated into that language with the same force flag.
//! Each item is decided, translated and written on its own; a failing item
//! is reported and the remaining items still run.

use log::warn;

use crate::entities::SourceEntity;
use crate::orchestrator::{
    EntityOrchestrator, LanguageOutcome, LanguageStatus, NavigationItemOrchestrator, TranslationPipeline,
};

/// Translate the navigation items of a header section into one language
pub async fn translate_header_navigation(
    pipeline: &TranslationPipeline,
    section: &SourceEntity,
    language: &str,
    force: bool,
) -> Vec<LanguageOutcome> {
    let items = match pipeline.reader().header_navigation_items(section.id).await {
        Ok(items) => items,
        Err(error) => {
            warn!(
                "Could not load navigation items of section #{}: {:#}",
                section.id, error
            );
            return Vec::new();
        }
    };

    let fields = NavigationItemOrchestrator.fields();
    let mut outcomes = Vec::with_capacity(items.len());
    for item in &items {
        let outcome = pipeline.translate_loaded(item, fields, language, force).await;
        if let LanguageStatus::Failed(error) = &outcome.status {
            warn!(
                "Navigation item #{} of section #{} failed for {}: {}",
                item.id, section.id, language, error
            );
        }
        outcomes.push(outcome);
    }

    outcomes
}
