/*!
 * Tests for batch runs over published content
 */

use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use cms_translate::database::{EntitySourceReader, Repository, TranslationRepository};
use cms_translate::entities::{EntityKind, SourceEntity};
use cms_translate::events::TranslationEvent;
use cms_translate::providers::MockProvider;
use cms_translate::{BatchController, BatchEntry};

use crate::common;

/// Reader that breaks on chosen ids and kinds
struct FlakyReader {
    inner: Arc<Repository>,
    failing_id: Option<i64>,
    panicking_id: Option<i64>,
    unlistable: Option<EntityKind>,
}

impl FlakyReader {
    fn new(inner: Arc<Repository>) -> Self {
        Self {
            inner,
            failing_id: None,
            panicking_id: None,
            unlistable: None,
        }
    }
}

#[async_trait]
impl EntitySourceReader for FlakyReader {
    async fn load_entity(&self, kind: EntityKind, entity_id: i64) -> Result<Option<SourceEntity>> {
        if self.failing_id == Some(entity_id) {
            return Err(anyhow!("source row #{} is unreadable", entity_id));
        }
        if self.panicking_id == Some(entity_id) {
            panic!("corrupted row #{}", entity_id);
        }
        self.inner.load_entity(kind, entity_id).await
    }

    async fn list_published(&self, kind: EntityKind) -> Result<Vec<i64>> {
        if self.unlistable == Some(kind) {
            return Err(anyhow!("{} table is locked", kind));
        }
        self.inner.list_published(kind).await
    }

    async fn header_navigation_items(&self, section_id: i64) -> Result<Vec<SourceEntity>> {
        self.inner.header_navigation_items(section_id).await
    }
}

async fn seed_blogs(repository: &Repository, count: usize) -> Vec<i64> {
    let mut ids = Vec::with_capacity(count);
    for n in 0..count {
        ids.push(
            common::insert_blog(repository, &format!("Wisata {}", n), r#"["pantai"]"#)
                .await
                .unwrap(),
        );
    }
    ids
}

/// Failing and panicking entities are recorded and the batch goes on
#[tokio::test]
async fn test_translateAll_withBrokenEntities_shouldContinueWithTheRest() {
    let repository = common::memory_repository();
    let ids = seed_blogs(&repository, 4).await;

    let mut reader = FlakyReader::new(repository.clone());
    reader.failing_id = Some(ids[1]);
    reader.panicking_id = Some(ids[2]);

    let (pipeline, sink) = common::pipeline_with_reader(
        Arc::new(reader),
        repository.clone(),
        MockProvider::working(),
        &["id", "en"],
    );
    let controller = BatchController::new(Arc::new(pipeline));

    let report = controller.translate_all(EntityKind::Blog, false).await.unwrap();

    assert_eq!(report.total(), 4);
    assert_eq!(report.failed(), 2);
    assert_eq!(report.failed_ids(), vec![ids[1], ids[2]]);
    assert!(matches!(&report.entries[2], BatchEntry::Failed { error, .. } if error.contains("panicked")));

    for id in [ids[0], ids[3]] {
        assert!(repository.find_translation(EntityKind::Blog, id, "en").await.unwrap().is_some());
    }

    assert_eq!(sink.count("entity_failed"), 2);
    assert!(sink.events().iter().any(|e| matches!(
        e,
        TranslationEvent::BatchCompleted { kind: EntityKind::Blog, total: 4, failed: 2 }
    )));
}

/// Per-language failures stay inside completed entities
#[tokio::test]
async fn test_translateAll_withFailingLanguage_shouldCountLanguageFailures() {
    let repository = common::memory_repository();
    seed_blogs(&repository, 2).await;
    let (pipeline, _sink) =
        common::mock_pipeline(repository, MockProvider::failing_for("ja"), &["id", "en", "ja"]);

    let report = BatchController::new(Arc::new(pipeline))
        .translate_all(EntityKind::Blog, false)
        .await
        .unwrap();

    assert_eq!(report.failed(), 0);
    assert_eq!(report.language_failures(), 2);
}

/// Re-running a batch without force calls the provider zero times
#[tokio::test]
async fn test_translateAll_rerunWithoutForce_shouldSkipEverything() {
    let repository = common::memory_repository();
    seed_blogs(&repository, 3).await;
    let provider = MockProvider::working();
    let (pipeline, sink) = common::mock_pipeline(repository, provider.clone(), &["id", "en"]);
    let controller = BatchController::new(Arc::new(pipeline));

    controller.translate_all(EntityKind::Blog, false).await.unwrap();
    let calls = provider.request_count();
    assert_eq!(calls, 6);

    controller.translate_all(EntityKind::Blog, false).await.unwrap();
    assert_eq!(provider.request_count(), calls);
    assert_eq!(sink.count("translation_skipped"), 3);
}

/// Only published rows are part of a batch
#[tokio::test]
async fn test_translateAll_withDrafts_shouldIgnoreThem() {
    let repository = common::memory_repository();
    let published = seed_blogs(&repository, 1).await;
    repository
        .insert_source_entity(
            EntityKind::Blog,
            vec![common::text("title", "Draf"), common::text("status", "draft")],
        )
        .await
        .unwrap();
    let (pipeline, _sink) = common::mock_pipeline(repository, MockProvider::working(), &["id", "en"]);

    let report = BatchController::new(Arc::new(pipeline))
        .translate_all(EntityKind::Blog, false)
        .await
        .unwrap();

    let attempted: Vec<i64> = report.entries.iter().map(BatchEntry::entity_id).collect();
    assert_eq!(attempted, published);
}

/// A kind that cannot be listed does not stop the other kinds
#[test]
fn test_translateEverything_withUnlistableKind_shouldReportAndContinue() {
    tokio_test::block_on(async {
        let repository = common::memory_repository();
        seed_blogs(&repository, 1).await;
        repository
            .insert_source_entity(
                EntityKind::Gallery,
                vec![common::text("title", "Pantai Kuta"), common::integer("is_published", 1)],
            )
            .await
            .unwrap();

        let mut reader = FlakyReader::new(repository.clone());
        reader.unlistable = Some(EntityKind::Testimonial);
        let (pipeline, _sink) = common::pipeline_with_reader(
            Arc::new(reader),
            repository.clone(),
            MockProvider::working(),
            &["id", "en"],
        );

        let reports = BatchController::new(Arc::new(pipeline)).translate_everything(false).await;

        let kinds: Vec<EntityKind> = reports.iter().map(|r| r.kind).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());

        let testimonial = reports.iter().find(|r| r.kind == EntityKind::Testimonial).unwrap();
        assert!(testimonial.error.is_some());

        let gallery = reports.iter().find(|r| r.kind == EntityKind::Gallery).unwrap();
        assert_eq!(gallery.total(), 1);
        assert_eq!(gallery.failed(), 0);

        let blog = reports.iter().find(|r| r.kind == EntityKind::Blog).unwrap();
        assert_eq!(blog.total(), 1);
    });
}
