/*!
 * Database entity models.
 *
 * These structures map directly to the translation tables and provide
 * type-safe access to persisted data.
 */

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::EntityKind;

/// One stored translation of one entity into one language
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Content type
    pub kind: EntityKind,
    /// Id of the source entity
    pub entity_id: i64,
    /// Target language code
    pub language: String,
    /// Translatable columns; `None` is a stored NULL
    pub fields: BTreeMap<String, Option<String>>,
    /// Whether the row was produced by the pipeline
    pub is_auto_translated: bool,
    /// Creation timestamp (RFC 3339, UTC)
    pub created_at: String,
    /// Last write timestamp (RFC 3339, UTC)
    pub updated_at: String,
}

impl TranslationRecord {
    /// Create an empty record stamped with the current time
    pub fn new(kind: EntityKind, entity_id: i64, language: impl Into<String>) -> Self {
        let now = timestamp_now();
        Self {
            kind,
            entity_id,
            language: language.into(),
            fields: BTreeMap::new(),
            is_auto_translated: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Stored value of a column, if present and not NULL
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_deref())
    }
}

/// Current time in the format stored in the database
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
