/*!
 * Tests for the header section fan-out to navigation items
 */

use std::time::Duration;

use cms_translate::database::{Repository, TranslationRecord, TranslationRepository};
use cms_translate::entities::EntityKind;
use cms_translate::orchestrator::{LanguageStatus, SectionOrchestrator};
use cms_translate::providers::MockProvider;

use crate::common;

/// Every menu item gets one row per target language
#[tokio::test]
async fn test_translateEntity_withHeaderSection_shouldTranslateEveryNavigationItem() {
    let repository = common::memory_repository();
    let (section_id, item_ids) =
        common::insert_header_with_navigation(&repository, &["Beranda", "Paket Wisata", "Kontak"])
            .await
            .unwrap();
    let (pipeline, _sink) =
        common::mock_pipeline(repository.clone(), MockProvider::working(), &["id", "en", "ja"]);

    let report = pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();

    assert_eq!(report.languages.len(), 2);
    assert_eq!(report.related.len(), 6);
    assert!(report.related.iter().all(|o| o.kind == EntityKind::NavigationItem));
    assert!(report.related.iter().all(|o| o.status == LanguageStatus::Created));

    for language in ["en", "ja"] {
        for item_id in &item_ids {
            let record = repository
                .find_translation(EntityKind::NavigationItem, *item_id, language)
                .await
                .unwrap();
            assert!(record.is_some(), "item #{} missing {}", item_id, language);
        }
    }

    let home = repository
        .find_translation(EntityKind::NavigationItem, item_ids[0], "en")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(home.field("title"), Some("[en] Beranda"));

    // Menu order within one language
    let en_items: Vec<i64> = report
        .related
        .iter()
        .filter(|o| o.language == "en")
        .map(|o| o.entity_id)
        .collect();
    assert_eq!(en_items, item_ids);
}

/// Ordinary sections do not touch navigation items
#[tokio::test]
async fn test_translateEntity_withRegularSection_shouldNotFanOut() {
    let repository = common::memory_repository();
    let (_, item_ids) = common::insert_header_with_navigation(&repository, &["Beranda"]).await.unwrap();
    let section_id = repository
        .insert_source_entity(
            EntityKind::Section,
            vec![
                common::text("section_key", "hero"),
                common::text("title", "Petualangan menanti"),
            ],
        )
        .await
        .unwrap();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), MockProvider::working(), &["id", "en"]);

    let report = pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();

    assert_eq!(report.outcome("en").unwrap().status, LanguageStatus::Created);
    assert!(report.related.is_empty());
    assert!(repository
        .find_translation(EntityKind::NavigationItem, item_ids[0], "en")
        .await
        .unwrap()
        .is_none());
}

/// A skipped header does not fan out; forcing it re-translates the menu too
#[tokio::test]
async fn test_translateEntity_withSkippedHeader_shouldOnlyFanOutWhenPersisted() {
    let repository = common::memory_repository();
    let (section_id, _) = common::insert_header_with_navigation(&repository, &["Beranda"]).await.unwrap();
    let provider = MockProvider::working();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en"]);

    pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();

    let late_item = repository
        .insert_source_entity(
            EntityKind::NavigationItem,
            vec![
                common::integer("section_id", section_id),
                common::text("title", "Galeri"),
                common::integer("sort_order", 10),
            ],
        )
        .await
        .unwrap();

    let skipped = pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();
    assert_eq!(skipped.outcome("en").unwrap().status, LanguageStatus::Skipped);
    assert!(skipped.related.is_empty());
    assert!(repository
        .find_translation(EntityKind::NavigationItem, late_item, "en")
        .await
        .unwrap()
        .is_none());

    let forced = pipeline
        .translate_entity(&SectionOrchestrator, section_id, true)
        .await
        .unwrap();
    assert_eq!(forced.outcome("en").unwrap().status, LanguageStatus::Updated);
    let statuses: Vec<&LanguageStatus> = forced.related.iter().map(|o| &o.status).collect();
    assert_eq!(statuses, vec![&LanguageStatus::Updated, &LanguageStatus::Created]);
    assert!(repository
        .find_translation(EntityKind::NavigationItem, late_item, "en")
        .await
        .unwrap()
        .is_some());
}

/// Re-running the header leaves the menu alone; forcing it rewrites every item row
#[tokio::test]
async fn test_translateEntity_rerunningHeader_shouldFollowForceFlagForMenu() {
    let repository = common::memory_repository();
    let (section_id, item_ids) =
        common::insert_header_with_navigation(&repository, &["Beranda", "Kontak"]).await.unwrap();
    let provider = MockProvider::working();
    let (pipeline, _sink) = common::mock_pipeline(repository.clone(), provider.clone(), &["id", "en", "ja"]);

    pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();
    let calls = provider.request_count();
    let before = navigation_rows(&repository, &item_ids).await;
    assert_eq!(before.len(), 4);

    let rerun = pipeline
        .translate_entity(&SectionOrchestrator, section_id, false)
        .await
        .unwrap();
    assert!(rerun.languages.iter().all(|o| o.status == LanguageStatus::Skipped));
    assert!(rerun.related.is_empty());
    assert_eq!(provider.request_count(), calls);
    assert_eq!(navigation_rows(&repository, &item_ids).await, before);

    let revised = MockProvider::working().with_custom_response(|r| format!("<{}> {}", r.target_language, r.text));
    let (forced_pipeline, _sink) = common::mock_pipeline(repository.clone(), revised, &["id", "en", "ja"]);
    tokio::time::sleep(Duration::from_millis(5)).await;

    let forced = forced_pipeline
        .translate_entity(&SectionOrchestrator, section_id, true)
        .await
        .unwrap();
    assert_eq!(forced.related.len(), 4);
    assert!(forced.related.iter().all(|o| o.status == LanguageStatus::Updated));

    let after = navigation_rows(&repository, &item_ids).await;
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!((old.entity_id, &old.language), (new.entity_id, &new.language));
        assert_eq!(new.created_at, old.created_at);
        assert_ne!(new.updated_at, old.updated_at);
        assert_eq!(new.field("title").map(|t| t.starts_with('<')), Some(true));
    }
}

/// Stored navigation rows for the given items, in item then language order
async fn navigation_rows(repository: &Repository, item_ids: &[i64]) -> Vec<TranslationRecord> {
    let mut rows = Vec::new();
    for item_id in item_ids {
        rows.extend(
            repository
                .list_translations(EntityKind::NavigationItem, *item_id)
                .await
                .unwrap(),
        );
    }
    rows
}
