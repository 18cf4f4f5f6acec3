/*!
 * End-to-end tests of single-entity pipeline runs against SQLite
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use cms_translate::content::{ContentFields, ContentValue};
use cms_translate::database::{EntitySourceReader, TranslationRepository};
use cms_translate::entities::{EntityKind, SourceEntity};
use cms_translate::errors::{AppError, TranslationError};
use cms_translate::events::{RecordingEventSink, TranslationEvent};
use cms_translate::orchestrator::{BlogOrchestrator, LanguageStatus, PackageOrchestrator};
use cms_translate::providers::MockProvider;
use cms_translate::translation::parse_stored_field;

use crate::common;

/// Create, then skip, then force-overwrite the Bromo blog post
#[tokio::test]
async fn test_translateEntity_bromoScenario_shouldCreateSkipThenOverwrite() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", r#"["gunung","sunrise"]"#)
        .await
        .unwrap();
    let provider = MockProvider::working();
    let (pipeline, sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en"]);

    // First run creates the English row
    let report = pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();
    assert_eq!(report.languages.len(), 1);
    assert_eq!(report.outcome("en").unwrap().status, LanguageStatus::Created);
    assert_eq!(provider.request_count(), 3);

    let created = repository
        .find_translation(EntityKind::Blog, id, "en")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(created.field("title"), Some("[en] Wisata Bromo"));
    assert_eq!(created.field("tags"), Some(r#"["[en] gunung","[en] sunrise"]"#));
    assert_eq!(created.field("content"), None);
    assert!(created.is_auto_translated);

    // Second run without force touches nothing
    let report = pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();
    assert_eq!(report.outcome("en").unwrap().status, LanguageStatus::Skipped);
    assert_eq!(provider.request_count(), 3);
    let unchanged = repository
        .find_translation(EntityKind::Blog, id, "en")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged, created);
    assert_eq!(sink.count("translation_skipped"), 1);

    // Forced run with a revised provider rewrites every field
    let revised = MockProvider::working().with_custom_response(|r| format!("<{}> {}", r.target_language, r.text));
    let (revised_pipeline, revised_sink) = common::mock_pipeline(repository.clone(), revised.clone(), &["id", "en"]);
    tokio::time::sleep(Duration::from_millis(5)).await;
    let report = revised_pipeline.translate_entity(&BlogOrchestrator, id, true).await.unwrap();
    assert_eq!(report.outcome("en").unwrap().status, LanguageStatus::Updated);
    assert_eq!(revised.request_count(), 3);
    assert_eq!(provider.request_count(), 3);

    let overwritten = repository
        .find_translation(EntityKind::Blog, id, "en")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(overwritten.created_at, created.created_at);
    assert_ne!(overwritten.updated_at, created.updated_at);
    assert_eq!(overwritten.field("title"), Some("<en> Wisata Bromo"));
    assert_eq!(overwritten.field("tags"), Some(r#"["<en> gunung","<en> sunrise"]"#));
    assert_eq!(repository.list_translations(EntityKind::Blog, id).await.unwrap().len(), 1);

    let persisted = |sink: &RecordingEventSink| -> Vec<bool> {
        sink.events()
            .into_iter()
            .filter_map(|e| match e {
                TranslationEvent::TranslationPersisted { created, .. } => Some(created),
                _ => None,
            })
            .collect()
    };
    assert_eq!(persisted(&sink), vec![true]);
    assert_eq!(persisted(&revised_sink), vec![false]);
}

/// Case variants and aliases of a site language share its single row
#[tokio::test]
async fn test_translateLanguage_withAliasedCode_shouldUseConfiguredCode() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", r#"["gunung"]"#).await.unwrap();
    let provider = MockProvider::working();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en"]);

    pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();
    assert_eq!(provider.request_count(), 2);

    for alias in ["EN", "eng"] {
        let report = pipeline
            .translate_language(&BlogOrchestrator, id, alias, false)
            .await
            .unwrap();
        let outcome = &report.languages[0];
        assert_eq!(outcome.language, "en");
        assert_eq!(outcome.status, LanguageStatus::Skipped);
    }
    assert_eq!(provider.request_count(), 2);

    let forced = pipeline
        .translate_language(&BlogOrchestrator, id, "EN", true)
        .await
        .unwrap();
    assert_eq!(forced.outcome("en").unwrap().status, LanguageStatus::Updated);

    let languages: Vec<String> = repository
        .list_translations(EntityKind::Blog, id)
        .await
        .unwrap()
        .into_iter()
        .map(|record| record.language)
        .collect();
    assert_eq!(languages, vec!["en".to_string()]);
}

/// One failing language does not stop the others
#[tokio::test]
async fn test_translateEntity_withOneFailingLanguage_shouldIsolateFailure() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", r#"["gunung"]"#).await.unwrap();
    let (pipeline, sink) =
        common::mock_pipeline(repository.clone(), MockProvider::failing_for("en"), &["id", "en", "ja"]);

    let report = pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();

    assert!(report.outcome("en").unwrap().status.is_failed());
    assert_eq!(report.outcome("ja").unwrap().status, LanguageStatus::Created);
    assert_eq!(report.failed_count(), 1);
    assert!(!report.is_success());
    assert_eq!(sink.count("translation_failed"), 1);

    assert!(repository.find_translation(EntityKind::Blog, id, "en").await.unwrap().is_none());
    let japanese = repository
        .find_translation(EntityKind::Blog, id, "ja")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(japanese.field("title"), Some("[ja] Wisata Bromo"));
}

/// A failed leaf leaves no partial row behind
#[tokio::test]
async fn test_translateEntity_withIntermittentProvider_shouldNotWritePartialRow() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", r#"["gunung","sunrise"]"#)
        .await
        .unwrap();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), MockProvider::intermittent(2), &["id", "en"]);

    let report = pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();

    assert!(report.outcome("en").unwrap().status.is_failed());
    assert!(repository.list_translations(EntityKind::Blog, id).await.unwrap().is_empty());
}

/// The source language is never a target
#[tokio::test]
async fn test_translateLanguage_withSourceLanguage_shouldRefuse() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", "[]").await.unwrap();
    let provider = MockProvider::working();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en"]);

    let error = pipeline
        .translate_language(&BlogOrchestrator, id, "id", false)
        .await
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<TranslationError>(),
        Some(TranslationError::SourceLanguageTarget(language)) if language == "id"
    ));

    pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();
    assert!(provider.requests().iter().all(|r| r.target_language != "id"));
    assert!(repository.find_translation(EntityKind::Blog, id, "id").await.unwrap().is_none());
}

/// Only site languages can be requested
#[tokio::test]
async fn test_translateLanguage_withUnsupportedLanguage_shouldFail() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", "[]").await.unwrap();
    let (pipeline, _sink) = common::mock_pipeline(repository, MockProvider::working(), &["id", "en"]);

    let error = pipeline
        .translate_language(&BlogOrchestrator, id, "fr", false)
        .await
        .unwrap_err();
    assert!(matches!(error.downcast_ref::<AppError>(), Some(AppError::Config(_))));
}

/// Unknown ids are an error for the caller
#[tokio::test]
async fn test_translateEntity_withMissingEntity_shouldReturnNotFound() {
    let repository = common::memory_repository();
    let (pipeline, sink) = common::mock_pipeline(repository, MockProvider::working(), &["id", "en"]);

    let error = pipeline.translate_entity(&BlogOrchestrator, 404, false).await.unwrap_err();

    assert!(matches!(
        error.downcast_ref::<AppError>(),
        Some(AppError::EntityNotFound { kind: EntityKind::Blog, id: 404 })
    ));
    assert!(sink.events().is_empty());
}

/// Nested package content keeps its shape through translation and storage
#[tokio::test]
async fn test_translateEntity_withNestedItinerary_shouldStoreSameStructure() {
    let repository = common::memory_repository();
    let itinerary = json!([
        {"day": 1, "title": "Tiba di Malang", "activities": ["Penjemputan", ""]},
        {"day": 2, "title": "Sunrise Bromo", "included": true}
    ]);
    let id = repository
        .insert_source_entity(
            EntityKind::Package,
            vec![
                common::text("title", "Paket Bromo"),
                common::text("itinerary", &itinerary.to_string()),
                common::text("status", "published"),
            ],
        )
        .await
        .unwrap();
    let provider = MockProvider::working();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en"]);

    pipeline.translate_entity(&PackageOrchestrator, id, false).await.unwrap();

    let record = repository
        .find_translation(EntityKind::Package, id, "en")
        .await
        .unwrap()
        .unwrap();
    let spec = EntityKind::Package.field("itinerary").unwrap();
    let stored = parse_stored_field(spec, record.fields.get("itinerary").cloned().flatten());
    let expected = ContentValue::from(json!([
        {"day": 1, "title": "[en] Tiba di Malang", "activities": ["[en] Penjemputan", ""]},
        {"day": 2, "title": "[en] Sunrise Bromo", "included": true}
    ]));
    assert_eq!(stored, expected);
    // title + three non-empty itinerary leaves
    assert_eq!(provider.request_count(), 4);
}

/// Source reader serving one fixed entity
struct FixedReader {
    entity: SourceEntity,
}

#[async_trait]
impl EntitySourceReader for FixedReader {
    async fn load_entity(&self, kind: EntityKind, entity_id: i64) -> Result<Option<SourceEntity>> {
        Ok((kind == self.entity.kind && entity_id == self.entity.id).then(|| self.entity.clone()))
    }

    async fn list_published(&self, kind: EntityKind) -> Result<Vec<i64>> {
        Ok(if kind == self.entity.kind { vec![self.entity.id] } else { Vec::new() })
    }

    async fn header_navigation_items(&self, _section_id: i64) -> Result<Vec<SourceEntity>> {
        Ok(Vec::new())
    }
}

/// A field that cannot be stored is skipped and the rest is still written
#[tokio::test]
async fn test_translateEntity_withUnserializableField_shouldWriteRemainingFields() {
    let repository = common::memory_repository();
    let id = repository
        .insert_source_entity(
            EntityKind::Package,
            vec![common::text("title", "Paket Bromo"), common::text("status", "published")],
        )
        .await
        .unwrap();

    let mut fields = ContentFields::new();
    fields.insert("title".to_string(), ContentValue::text("Paket Bromo"));
    fields.insert(
        "faqs".to_string(),
        ContentValue::Sequence(vec![ContentValue::Number(f64::NAN)]),
    );
    let reader = Arc::new(FixedReader {
        entity: SourceEntity::new(EntityKind::Package, id, fields),
    });

    let (pipeline, sink) =
        common::pipeline_with_reader(reader, repository.clone(), MockProvider::working(), &["id", "en"]);
    let report = pipeline.translate_entity(&PackageOrchestrator, id, false).await.unwrap();

    let outcome = report.outcome("en").unwrap();
    assert_eq!(outcome.status, LanguageStatus::Created);
    assert_eq!(outcome.skipped_fields, vec!["faqs".to_string()]);
    assert_eq!(sink.count("serialization_failed"), 1);

    let record = repository
        .find_translation(EntityKind::Package, id, "en")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.field("title"), Some("[en] Paket Bromo"));
    assert_eq!(record.field("faqs"), None);
}

/// Echoed output is stored but flagged
#[tokio::test]
async fn test_translateEntity_withEchoingProvider_shouldStoreAndFlag() {
    let repository = common::memory_repository();
    let id = common::insert_blog(&repository, "Wisata Bromo", "[]").await.unwrap();
    let (pipeline, sink) = common::mock_pipeline(repository.clone(), MockProvider::echo(), &["id", "en"]);

    let report = pipeline.translate_entity(&BlogOrchestrator, id, false).await.unwrap();

    assert_eq!(report.outcome("en").unwrap().status, LanguageStatus::Created);
    assert_eq!(sink.count("validation_suspect"), 1);
}
