/*!
 * Repository layer for database operations.
 *
 * Two seams are defined here: `EntitySourceReader` loads source-language
 * content, `TranslationRepository` reads and writes translation rows. The
 * SQLite `Repository` implements both; SQL is built from the entity
 * descriptors so every content type shares one code path.
 */

use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use log::debug;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};

use super::connection::DatabaseConnection;
use super::models::{TranslationRecord, timestamp_now};
use crate::content::ContentFields;
use crate::entities::{EntityKind, SourceEntity};
use crate::translation::serializer::parse_stored_field;

/// Read access to canonical source-language content
#[async_trait]
pub trait EntitySourceReader: Send + Sync {
    /// Load one entity with its translatable fields, `None` if it does not exist
    async fn load_entity(&self, kind: EntityKind, entity_id: i64) -> Result<Option<SourceEntity>>;

    /// Ids of all published/approved/active entities of a kind, ascending
    async fn list_published(&self, kind: EntityKind) -> Result<Vec<i64>>;

    /// Navigation items rendered by a section, in menu order
    async fn header_navigation_items(&self, section_id: i64) -> Result<Vec<SourceEntity>>;
}

/// Read/write access to translation records
#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Stored translation for (entity, language), if any
    async fn find_translation(
        &self,
        kind: EntityKind,
        entity_id: i64,
        language: &str,
    ) -> Result<Option<TranslationRecord>>;

    /// Insert or update the translation for (entity, language)
    ///
    /// Only the given columns are written; on update, columns missing from
    /// `fields` keep their stored value. Returns the stored record.
    async fn upsert_translation(
        &self,
        kind: EntityKind,
        entity_id: i64,
        language: &str,
        fields: &BTreeMap<String, Option<String>>,
        is_auto_translated: bool,
    ) -> Result<TranslationRecord>;

    /// Every stored translation of an entity, ordered by language
    async fn list_translations(&self, kind: EntityKind, entity_id: i64) -> Result<Vec<TranslationRecord>>;
}

/// Repository for database operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Source rows
    // =========================================================================

    /// Insert a source row with arbitrary columns, returning its id
    ///
    /// Used for seeding and imports; column names must be plain identifiers.
    pub async fn insert_source_entity(
        &self,
        kind: EntityKind,
        columns: Vec<(String, SqlValue)>,
    ) -> Result<i64> {
        if columns.is_empty() {
            return Err(anyhow!("No columns given for {} row", kind));
        }
        if let Some((name, _)) = columns.iter().find(|(name, _)| !is_identifier(name)) {
            return Err(anyhow!("Invalid column name: {}", name));
        }

        self.db
            .execute_async(move |conn| {
                let now = timestamp_now();
                let mut names: Vec<&str> = columns.iter().map(|(name, _)| name.as_str()).collect();
                let mut values: Vec<SqlValue> = columns.iter().map(|(_, value)| value.clone()).collect();
                for stamp in ["created_at", "updated_at"] {
                    if !names.contains(&stamp) {
                        names.push(stamp);
                        values.push(SqlValue::Text(now.clone()));
                    }
                }

                let placeholders: Vec<String> = (1..=names.len()).map(|i| format!("?{}", i)).collect();
                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({})",
                    kind.source_table(),
                    names.join(", "),
                    placeholders.join(", ")
                );
                conn.execute(&sql, params_from_iter(values.iter()))?;
                Ok(conn.last_insert_rowid())
            })
            .await
    }

    fn load_entity_sync(conn: &Connection, kind: EntityKind, entity_id: i64) -> Result<Option<SourceEntity>> {
        let fields = kind.fields();
        let mut columns: Vec<&str> = fields.iter().map(|f| f.name).collect();
        if kind == EntityKind::Section {
            columns.push("section_key");
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            columns.join(", "),
            kind.source_table()
        );

        let row = conn
            .query_row(&sql, [entity_id], |row| {
                let mut values = Vec::with_capacity(columns.len());
                for index in 0..columns.len() {
                    values.push(row.get::<_, Option<String>>(index)?);
                }
                Ok(values)
            })
            .optional()?;

        let Some(mut values) = row else {
            return Ok(None);
        };

        let section_key = if kind == EntityKind::Section {
            values.pop().flatten()
        } else {
            None
        };

        let content: ContentFields = fields
            .iter()
            .zip(values)
            .map(|(spec, column)| (spec.name.to_string(), parse_stored_field(spec, column)))
            .collect();

        Ok(Some(SourceEntity {
            kind,
            id: entity_id,
            fields: content,
            section_key,
        }))
    }

    // =========================================================================
    // Translation rows
    // =========================================================================

    fn find_translation_sync(
        conn: &Connection,
        kind: EntityKind,
        entity_id: i64,
        language: &str,
    ) -> Result<Option<TranslationRecord>> {
        let sql = format!(
            "{} WHERE {} = ?1 AND language = ?2",
            select_translation_sql(kind),
            kind.foreign_key()
        );

        let record = conn
            .query_row(&sql, params![entity_id, language], |row| {
                read_translation_row(kind, row)
            })
            .optional()?;

        Ok(record)
    }
}

/// SELECT clause returning every column of a translation table
fn select_translation_sql(kind: EntityKind) -> String {
    let field_columns: Vec<&str> = kind.fields().iter().map(|f| f.name).collect();
    format!(
        "SELECT {}, language, {}, is_auto_translated, created_at, updated_at FROM {}",
        kind.foreign_key(),
        field_columns.join(", "),
        kind.translation_table()
    )
}

/// Map a row selected with `select_translation_sql`
fn read_translation_row(kind: EntityKind, row: &rusqlite::Row<'_>) -> rusqlite::Result<TranslationRecord> {
    let fields = kind.fields();
    let mut values = BTreeMap::new();
    for (offset, spec) in fields.iter().enumerate() {
        values.insert(spec.name.to_string(), row.get::<_, Option<String>>(2 + offset)?);
    }

    let base = 2 + fields.len();
    Ok(TranslationRecord {
        kind,
        entity_id: row.get(0)?,
        language: row.get(1)?,
        fields: values,
        is_auto_translated: row.get(base)?,
        created_at: row.get(base + 1)?,
        updated_at: row.get(base + 2)?,
    })
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

#[async_trait]
impl EntitySourceReader for Repository {
    async fn load_entity(&self, kind: EntityKind, entity_id: i64) -> Result<Option<SourceEntity>> {
        self.db
            .execute_async(move |conn| Self::load_entity_sync(conn, kind, entity_id))
            .await
    }

    async fn list_published(&self, kind: EntityKind) -> Result<Vec<i64>> {
        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "SELECT id FROM {} WHERE {} ORDER BY id",
                    kind.source_table(),
                    kind.published_predicate()
                );
                let mut stmt = conn.prepare(&sql)?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<rusqlite::Result<Vec<i64>>>()?;
                Ok(ids)
            })
            .await
    }

    async fn header_navigation_items(&self, section_id: i64) -> Result<Vec<SourceEntity>> {
        self.db
            .execute_async(move |conn| {
                let ids = {
                    let mut stmt = conn.prepare(
                        "SELECT id FROM navigation_items WHERE section_id = ?1 ORDER BY sort_order, id",
                    )?;
                    stmt.query_map([section_id], |row| row.get(0))?
                        .collect::<rusqlite::Result<Vec<i64>>>()?
                };

                let mut items = Vec::with_capacity(ids.len());
                for id in ids {
                    if let Some(item) = Self::load_entity_sync(conn, EntityKind::NavigationItem, id)? {
                        items.push(item);
                    }
                }
                Ok(items)
            })
            .await
    }
}

#[async_trait]
impl TranslationRepository for Repository {
    async fn find_translation(
        &self,
        kind: EntityKind,
        entity_id: i64,
        language: &str,
    ) -> Result<Option<TranslationRecord>> {
        let language = language.to_string();

        self.db
            .execute_async(move |conn| Self::find_translation_sync(conn, kind, entity_id, &language))
            .await
    }

    async fn upsert_translation(
        &self,
        kind: EntityKind,
        entity_id: i64,
        language: &str,
        fields: &BTreeMap<String, Option<String>>,
        is_auto_translated: bool,
    ) -> Result<TranslationRecord> {
        if let Some(unknown) = fields.keys().find(|name| kind.field(name).is_none()) {
            return Err(anyhow!("{} has no translatable field '{}'", kind, unknown));
        }

        let language = language.to_string();
        let fields = fields.clone();

        debug!(
            "Upserting {} #{} ({}) with {} field(s)",
            kind,
            entity_id,
            language,
            fields.len()
        );

        self.db
            .transaction_async(move |tx| {
                let now = timestamp_now();
                let fk = kind.foreign_key();

                let mut columns: Vec<&str> = vec![fk, "language"];
                let mut values: Vec<SqlValue> = vec![SqlValue::Integer(entity_id), SqlValue::Text(language.clone())];
                for (name, value) in &fields {
                    columns.push(name.as_str());
                    values.push(value.clone().map(SqlValue::Text).unwrap_or(SqlValue::Null));
                }
                columns.extend(["is_auto_translated", "created_at", "updated_at"]);
                values.push(SqlValue::Integer(i64::from(is_auto_translated)));
                values.push(SqlValue::Text(now.clone()));
                values.push(SqlValue::Text(now));

                let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{}", i)).collect();
                let updates: Vec<String> = fields
                    .keys()
                    .map(|name| name.as_str())
                    .chain(["is_auto_translated", "updated_at"])
                    .map(|name| format!("{} = excluded.{}", name, name))
                    .collect();

                let sql = format!(
                    "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}, language) DO UPDATE SET {}",
                    kind.translation_table(),
                    columns.join(", "),
                    placeholders.join(", "),
                    fk,
                    updates.join(", ")
                );
                tx.execute(&sql, params_from_iter(values.iter()))?;

                Self::find_translation_sync(tx, kind, entity_id, &language)?
                    .ok_or_else(|| anyhow!("Translation row vanished after upsert"))
            })
            .await
    }

    async fn list_translations(&self, kind: EntityKind, entity_id: i64) -> Result<Vec<TranslationRecord>> {
        self.db
            .execute_async(move |conn| {
                let sql = format!(
                    "{} WHERE {} = ?1 ORDER BY language",
                    select_translation_sql(kind),
                    kind.foreign_key()
                );
                let mut stmt = conn.prepare(&sql)?;
                let records = stmt
                    .query_map([entity_id], |row| read_translation_row(kind, row))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
            .await
    }
}
