/*!
 * Output validation for translated text.
 *
 * - `output`: identity and source-language leak checks on single leaves
 * - `keywords`: built-in function-word tables per language
 */

pub mod keywords;
pub mod output;

pub use output::{OutputValidator, SuspectReason, ValidationReport};
