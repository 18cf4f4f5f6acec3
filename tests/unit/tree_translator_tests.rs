/*!
 * Tests for the tree translator and the scalar translator underneath it
 */

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use cms_translate::content::{ContentFields, ContentValue};
use cms_translate::errors::TranslationError;
use cms_translate::events::{RecordingEventSink, TranslationEvent};
use cms_translate::providers::{MockProvider, MockRequest};
use cms_translate::translation::{ScalarTranslator, TreeTranslator};
use cms_translate::validation::{OutputValidator, SuspectReason};

fn translator(provider: &MockProvider, sink: &Arc<RecordingEventSink>) -> TreeTranslator {
    TreeTranslator::new(ScalarTranslator::new(Arc::new(provider.clone())))
        .with_validator(OutputValidator::default())
        .with_sink(sink.clone())
}

fn nested(levels: usize, leaf: &str) -> ContentValue {
    (0..levels).fold(ContentValue::text(leaf), |inner, _| ContentValue::Sequence(vec![inner]))
}

/// Blank leaves never reach the provider
#[tokio::test]
async fn test_translateFields_withBlankStrings_shouldPassThroughWithoutCalls() {
    let provider = MockProvider::working();
    let sink = Arc::new(RecordingEventSink::new());

    let mut fields = ContentFields::new();
    fields.insert("title".to_string(), ContentValue::text(""));
    fields.insert("excerpt".to_string(), ContentValue::text("   "));
    fields.insert("tags".to_string(), ContentValue::from(json!(["", "\n"])));

    let translated = translator(&provider, &sink)
        .translate_fields(&fields, "id", "en")
        .await
        .unwrap();

    assert_eq!(translated, fields);
    assert_eq!(provider.request_count(), 0);
    assert_eq!(sink.count("validation_suspect"), 0);
}

/// Leaves at the ceiling are translated, deeper ones are kept as is
#[tokio::test]
async fn test_translateTree_atDefaultCeiling_shouldStopBelowDepthFive() {
    let provider = MockProvider::working();
    let sink = Arc::new(RecordingEventSink::new());
    let tree_translator = translator(&provider, &sink);
    assert_eq!(tree_translator.max_depth(), 5);

    let at_ceiling = tree_translator
        .translate_tree(&nested(5, "gunung"), "id", "en")
        .await
        .unwrap();
    assert_eq!(at_ceiling, nested(5, "[en] gunung"));
    assert_eq!(sink.count("depth_limit_reached"), 0);

    let beyond = nested(6, "gunung");
    let untouched = tree_translator.translate_tree(&beyond, "id", "en").await.unwrap();
    assert_eq!(untouched, beyond);
    assert_eq!(provider.request_count(), 1);

    let events = sink.events();
    assert!(events.iter().any(|e| matches!(
        e,
        TranslationEvent::DepthLimitReached { depth: 6, max_depth: 5, .. }
    )));
}

/// A leaf that still reads like the source language is flagged but kept
#[tokio::test]
async fn test_translateTree_withSourceWordsInOutput_shouldFlagLeak() {
    fn half_translated(_request: &MockRequest) -> String {
        "Tour dengan hotel dan transport".to_string()
    }
    let provider = MockProvider::working().with_custom_response(half_translated);
    let sink = Arc::new(RecordingEventSink::new());

    let translated = translator(&provider, &sink)
        .translate_tree(&ContentValue::text("Tur dengan hotel dan transportasi"), "id", "en")
        .await
        .unwrap();

    assert_eq!(translated, ContentValue::text("Tour dengan hotel dan transport"));
    let reasons: Vec<SuspectReason> = sink
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TranslationEvent::ValidationSuspect { reasons, .. } => Some(reasons),
            _ => None,
        })
        .flatten()
        .collect();
    assert!(reasons.iter().any(|r| matches!(r, SuspectReason::SourceLanguageLeak { matches } if matches.len() == 2)));
}

/// A disabled validator never emits suspects
#[tokio::test]
async fn test_translateTree_withDisabledValidator_shouldNotFlagEcho() {
    let provider = MockProvider::echo();
    let sink = Arc::new(RecordingEventSink::new());
    let tree_translator = TreeTranslator::new(ScalarTranslator::new(Arc::new(provider.clone())))
        .with_validator(OutputValidator::disabled())
        .with_sink(sink.clone());

    tree_translator
        .translate_tree(&ContentValue::text("Pantai Kuta"), "id", "en")
        .await
        .unwrap();

    assert_eq!(sink.count("validation_suspect"), 0);
}

/// A provider slower than the timeout fails the leaf
#[tokio::test]
async fn test_scalarTranslate_withSlowProvider_shouldTimeOut() {
    let provider = MockProvider::slow(500);
    let scalar = ScalarTranslator::new(Arc::new(provider)).with_timeout(Duration::from_millis(20));

    let error = scalar.translate("Selamat datang", "id", "en").await.unwrap_err();
    assert!(matches!(error, TranslationError::ProviderTimeout { .. }));
}

/// An empty provider answer aborts the whole tree
#[tokio::test]
async fn test_translateFields_withEmptyProviderAnswer_shouldFail() {
    let provider = MockProvider::empty();
    let sink = Arc::new(RecordingEventSink::new());

    let mut fields = ContentFields::new();
    fields.insert("title".to_string(), ContentValue::text("Wisata Bromo"));

    let error = translator(&provider, &sink)
        .translate_fields(&fields, "id", "en")
        .await
        .unwrap_err();
    assert!(matches!(error, TranslationError::EmptyResult));
}
