/*!
 * Built-in function-word tables.
 *
 * Short, very frequent words of a language that almost never survive a real
 * translation into another language. Finding several of them in a translated
 * string is a strong hint the provider returned source text.
 */

use once_cell::sync::Lazy;
use std::collections::HashMap;

static KEYWORDS: Lazy<HashMap<&'static str, &'static [&'static str]>> = Lazy::new(|| {
    let mut tables: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
    tables.insert(
        "id",
        &[
            "dan", "yang", "di", "dengan", "untuk", "ini", "dari", "ke", "adalah", "akan", "pada",
            "dalam", "tidak", "atau", "kami", "anda", "juga", "itu",
        ],
    );
    tables.insert(
        "en",
        &[
            "the", "and", "with", "for", "this", "from", "that", "is", "are", "will", "of", "to",
            "in", "not", "our", "your", "also",
        ],
    );
    tables
});

/// Built-in function words for a language, if a table exists
///
/// Region subtags are ignored, so `id-ID` uses the `id` table.
pub fn builtin_keywords(language: &str) -> Option<&'static [&'static str]> {
    let base = crate::language_utils::base_language(language);
    KEYWORDS.get(base.as_str()).copied()
}
