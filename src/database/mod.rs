/*!
 * SQLite persistence for source content and translations.
 *
 * - `connection`: connection wrapper with async-safe access
 * - `schema`: table definitions and schema versioning
 * - `models`: stored translation records
 * - `repository`: source reader and translation repository
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::{DatabaseConnection, DatabaseStats};
pub use models::TranslationRecord;
pub use repository::{EntitySourceReader, Repository, TranslationRepository};
