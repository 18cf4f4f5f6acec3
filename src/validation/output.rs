/*!
 * Output validator for single translated leaves.
 *
 * Two heuristics flag a translation as suspect:
 * - the output equals the input after trimming and lowercasing
 * - the output still contains several distinct source-language function words
 *
 * Suspect results are warnings only; callers keep the translated text.
 */

use std::collections::BTreeSet;

use log::debug;
use regex::Regex;

use crate::app_config::ValidationConfig;
use crate::validation::keywords::builtin_keywords;

/// Default number of distinct source keywords that marks a leak
const DEFAULT_KEYWORD_THRESHOLD: usize = 2;

/// Why a translated leaf looks untranslated
#[derive(Debug, Clone, PartialEq)]
pub enum SuspectReason {
    /// Output is identical to the input, ignoring case and outer whitespace
    Unchanged,
    /// Output contains source-language function words
    SourceLanguageLeak {
        /// Distinct keywords found, lowercase, sorted
        matches: Vec<String>,
    },
}

impl std::fmt::Display for SuspectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuspectReason::Unchanged => write!(f, "Output is identical to the source text"),
            SuspectReason::SourceLanguageLeak { matches } => write!(
                f,
                "Output contains {} source-language keyword(s): {}",
                matches.len(),
                matches.join(", ")
            ),
        }
    }
}

/// Result of checking one translated leaf
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationReport {
    /// Target language of the translation
    pub target_language: String,
    /// Every heuristic that fired
    pub reasons: Vec<SuspectReason>,
}

impl ValidationReport {
    /// True when no heuristic fired
    pub fn looks_valid(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Heuristic checker for translated text
#[derive(Debug, Clone)]
pub struct OutputValidator {
    enabled: bool,
    threshold: usize,
    keyword_pattern: Option<Regex>,
}

impl OutputValidator {
    /// Create a validator from an explicit keyword list
    pub fn new<S: AsRef<str>>(keywords: &[S], threshold: usize) -> Self {
        Self {
            enabled: true,
            threshold: threshold.max(1),
            keyword_pattern: build_keyword_pattern(keywords),
        }
    }

    /// Create a validator for a source language from configuration
    ///
    /// Configured keywords take precedence over the built-in table. A source
    /// language without either only gets the identity check.
    pub fn for_source_language(source_language: &str, config: &ValidationConfig) -> Self {
        let mut validator = if !config.source_keywords.is_empty() {
            Self::new(config.source_keywords.as_slice(), config.keyword_threshold)
        } else if let Some(keywords) = builtin_keywords(source_language) {
            Self::new(keywords, config.keyword_threshold)
        } else {
            debug!(
                "No keyword table for source language '{}'; only identity checks apply",
                source_language
            );
            Self::new::<&str>(&[], config.keyword_threshold)
        };
        validator.enabled = config.enabled;
        validator
    }

    /// A validator that never flags anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_KEYWORD_THRESHOLD,
            keyword_pattern: None,
        }
    }

    /// Whether checks run at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Check a translated leaf against its original
    pub fn check(&self, original: &str, translated: &str, target_language: &str) -> ValidationReport {
        let mut reasons = Vec::new();

        if self.enabled {
            if original.trim().to_lowercase() == translated.trim().to_lowercase() {
                reasons.push(SuspectReason::Unchanged);
            }

            let matches = self.find_keywords(translated);
            if matches.len() >= self.threshold {
                reasons.push(SuspectReason::SourceLanguageLeak { matches });
            }
        }

        ValidationReport {
            target_language: target_language.to_string(),
            reasons,
        }
    }

    fn find_keywords(&self, text: &str) -> Vec<String> {
        let Some(pattern) = &self.keyword_pattern else {
            return Vec::new();
        };

        pattern
            .find_iter(text)
            .map(|m| m.as_str().to_lowercase())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl Default for OutputValidator {
    fn default() -> Self {
        Self::for_source_language("id", &ValidationConfig::default())
    }
}

/// Whole-word, case-insensitive alternation over the keywords
fn build_keyword_pattern<S: AsRef<str>>(keywords: &[S]) -> Option<Regex> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives.join("|"))).ok()
}
