/*!
 * Tree translator.
 *
 * Walks a content tree and sends every non-blank text leaf through the
 * scalar translator, one leaf at a time in document order. Mapping keys,
 * numbers, booleans and nulls are copied. Subtrees nested deeper than the
 * configured ceiling are copied untranslated.
 *
 * Depth counts containers: a top-level field is at depth 0 and the children
 * of any sequence or mapping sit one level below their parent.
 */

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use indexmap::IndexMap;

use crate::content::{ContentFields, ContentValue};
use crate::errors::TranslationError;
use crate::events::{EventSink, LogEventSink, TranslationEvent};
use crate::translation::scalar::ScalarTranslator;
use crate::validation::OutputValidator;

/// Default nesting ceiling
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Recursive content tree translator
pub struct TreeTranslator {
    scalar: ScalarTranslator,
    validator: OutputValidator,
    sink: Arc<dyn EventSink>,
    max_depth: usize,
}

impl TreeTranslator {
    /// Create a tree translator with the default ceiling, no validation and log output
    pub fn new(scalar: ScalarTranslator) -> Self {
        Self {
            scalar,
            validator: OutputValidator::disabled(),
            sink: Arc::new(LogEventSink),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Check translated leaves with this validator
    pub fn with_validator(mut self, validator: OutputValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Send events to this sink
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Set the nesting ceiling
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nesting ceiling in use
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Translate every field of an entity
    ///
    /// Fields are visited in key order. The first failing leaf aborts the
    /// whole walk.
    pub async fn translate_fields(
        &self,
        fields: &ContentFields,
        source_language: &str,
        target_language: &str,
    ) -> Result<ContentFields, TranslationError> {
        let mut translated = ContentFields::new();
        for (name, value) in fields {
            let value = self
                .translate_node(value, source_language, target_language, 0)
                .await?;
            translated.insert(name.clone(), value);
        }
        Ok(translated)
    }

    /// Translate one tree starting at depth 0
    pub async fn translate_tree(
        &self,
        value: &ContentValue,
        source_language: &str,
        target_language: &str,
    ) -> Result<ContentValue, TranslationError> {
        self.translate_node(value, source_language, target_language, 0)
            .await
    }

    fn translate_node<'a>(
        &'a self,
        value: &'a ContentValue,
        source_language: &'a str,
        target_language: &'a str,
        depth: usize,
    ) -> BoxFuture<'a, Result<ContentValue, TranslationError>> {
        async move {
            if depth > self.max_depth {
                self.sink.emit(&TranslationEvent::DepthLimitReached {
                    language: target_language.to_string(),
                    depth,
                    max_depth: self.max_depth,
                });
                return Ok(value.clone());
            }

            match value {
                ContentValue::Text(text) if text.trim().is_empty() => Ok(value.clone()),
                ContentValue::Text(text) => {
                    let translated = self
                        .scalar
                        .translate(text, source_language, target_language)
                        .await?;
                    self.check_output(text, &translated, target_language);
                    Ok(ContentValue::Text(translated))
                }
                ContentValue::Sequence(items) => {
                    let mut translated = Vec::with_capacity(items.len());
                    for item in items {
                        translated.push(
                            self.translate_node(item, source_language, target_language, depth + 1)
                                .await?,
                        );
                    }
                    Ok(ContentValue::Sequence(translated))
                }
                ContentValue::Mapping(entries) => {
                    let mut translated = IndexMap::with_capacity(entries.len());
                    for (key, item) in entries {
                        let item = self
                            .translate_node(item, source_language, target_language, depth + 1)
                            .await?;
                        translated.insert(key.clone(), item);
                    }
                    Ok(ContentValue::Mapping(translated))
                }
                ContentValue::Number(_) | ContentValue::Bool(_) | ContentValue::Null => Ok(value.clone()),
            }
        }
        .boxed()
    }

    fn check_output(&self, original: &str, translated: &str, target_language: &str) {
        if !self.validator.is_enabled() {
            return;
        }

        let report = self.validator.check(original, translated, target_language);
        if !report.looks_valid() {
            self.sink.emit(&TranslationEvent::ValidationSuspect {
                language: target_language.to_string(),
                original: original.to_string(),
                translated: translated.to_string(),
                reasons: report.reasons,
            });
        }
    }
}
