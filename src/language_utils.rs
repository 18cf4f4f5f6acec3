//! Language code helpers
//!
//! Site languages are configured as ISO 639-1 codes (`id`, `en`), optionally
//! with a region subtag (`zh-CN`, `pt-BR`). These helpers validate them,
//! compare them and resolve human-readable names for provider prompts.

use anyhow::{Result, anyhow};
use isolang::Language;

/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Split a locale into its lowercase base language and optional region
///
/// `zh-CN` → (`zh`, Some(`CN`)), `pt_br` → (`pt`, Some(`BR`)), `en` → (`en`, None)
pub fn split_locale(code: &str) -> (String, Option<String>) {
    let trimmed = code.trim();
    let mut parts = trimmed.splitn(2, ['-', '_']);
    let base = parts.next().unwrap_or_default().to_lowercase();
    let region = parts
        .next()
        .filter(|r| !r.is_empty())
        .map(|r| r.to_uppercase());
    (base, region)
}

fn resolve_language(base: &str) -> Option<Language> {
    match base.len() {
        2 => Language::from_639_1(base),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == base)
                .map(|(_, t)| *t)
                .unwrap_or(base);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Validate a site language code, returning it in canonical form
///
/// The canonical form is the ISO 639-1 code when one exists (falling back to
/// ISO 639-3), followed by the uppercase region if one was given.
pub fn validate_language_code(code: &str) -> Result<String> {
    let (base, region) = split_locale(code);
    let language = resolve_language(&base).ok_or_else(|| anyhow!("Invalid language code: {}", code))?;

    let canonical_base = language
        .to_639_1()
        .map(|c| c.to_string())
        .unwrap_or_else(|| language.to_639_3().to_string());

    Ok(match region {
        Some(region) => format!("{}-{}", canonical_base, region),
        None => canonical_base,
    })
}

/// Check if two codes name the same language and region
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (validate_language_code(code1), validate_language_code(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Base language of a code, suitable for providers that ignore regions
pub fn base_language(code: &str) -> String {
    split_locale(code).0
}

/// Get the English language name for a code
pub fn get_language_name(code: &str) -> Result<String> {
    let (base, _) = split_locale(code);
    let language = resolve_language(&base)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(language.to_name().to_string())
}
