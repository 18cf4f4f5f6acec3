/*!
 * Content translation.
 *
 * - `scalar`: one provider call for one text, with a time budget
 * - `tree`: recursive walk over a content tree translating text leaves
 * - `serializer`: conversion of translated fields into storable column values
 * - `idempotency`: create/skip/overwrite decision for a target language
 */

pub mod idempotency;
pub mod scalar;
pub mod serializer;
pub mod tree;

pub use self::idempotency::{Decision, decide};
pub use self::scalar::ScalarTranslator;
pub use self::serializer::{SerializedFields, SkippedField, parse_stored_field, serialize_fields, serialize_value};
pub use self::tree::TreeTranslator;
