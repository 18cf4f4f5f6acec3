/*!
 * Storage serializer.
 *
 * Translation tables store every field as nullable text. Text is stored
 * verbatim, numbers and booleans in their plain string form, and sequences or
 * mappings as compact JSON. A field that cannot be serialized is reported and
 * left out so the rest of the record can still be written.
 */

use std::collections::BTreeMap;

use log::warn;

use crate::content::{ContentFields, ContentValue};
use crate::entities::{FieldKind, FieldSpec};
use crate::errors::SerializeError;

/// A field left out of the storable payload
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedField {
    /// Field name
    pub field: String,
    /// Why it could not be serialized
    pub error: SerializeError,
}

/// Storable column values for one translation record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SerializedFields {
    /// Column name to value; `None` stores NULL
    pub fields: BTreeMap<String, Option<String>>,
    /// Fields that were dropped from `fields`
    pub skipped: Vec<SkippedField>,
}

/// Serialize a single value to its column form
pub fn serialize_value(value: &ContentValue) -> Result<Option<String>, SerializeError> {
    match value {
        ContentValue::Null => Ok(None),
        ContentValue::Text(text) => Ok(Some(text.clone())),
        ContentValue::Bool(flag) => Ok(Some(flag.to_string())),
        ContentValue::Number(_) | ContentValue::Sequence(_) | ContentValue::Mapping(_) => {
            Ok(Some(value.to_json()?.to_string()))
        }
    }
}

/// Serialize every present field; absent fields stay absent
pub fn serialize_fields(fields: &ContentFields) -> SerializedFields {
    let mut serialized = SerializedFields::default();

    for (name, value) in fields {
        match serialize_value(value) {
            Ok(column) => {
                serialized.fields.insert(name.clone(), column);
            }
            Err(error) => serialized.skipped.push(SkippedField {
                field: name.clone(),
                error,
            }),
        }
    }

    serialized
}

/// Parse a stored column back into a content value
///
/// Structured columns hold JSON; anything that does not parse is kept as
/// plain text so it still gets translated.
pub fn parse_stored_field(spec: &FieldSpec, column: Option<String>) -> ContentValue {
    let Some(raw) = column else {
        return ContentValue::Null;
    };

    match spec.kind {
        FieldKind::Text => ContentValue::Text(raw),
        FieldKind::Structured => match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => ContentValue::from(value),
            Err(e) => {
                warn!("Field '{}' is not valid JSON ({}); treating it as text", spec.name, e);
                ContentValue::Text(raw)
            }
        },
    }
}
