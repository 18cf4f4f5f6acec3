/*!
 * Database connection management.
 *
 * This module handles SQLite database connection creation, initialization,
 * and provides async-safe access patterns using tokio's spawn_blocking.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::schema;
use crate::entities::EntityKind;

/// Default database filename
const DEFAULT_DB_FILENAME: &str = "content.db";

/// Default database directory name under user's data directory
const DEFAULT_DB_DIRNAME: &str = "cms-translate";

/// Database connection wrapper with thread-safe access
#[derive(Clone)]
pub struct DatabaseConnection {
    /// Path to the database file
    db_path: PathBuf,
    /// Shared connection; the lock does not poison when a closure panics
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Create a new database connection at the default location
    pub fn new_default() -> Result<Self> {
        let db_path = Self::default_database_path()?;
        Self::new(&db_path)
    }

    /// Create a new database connection at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        info!("Opening database at: {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn =
            Connection::open_in_memory().context("Failed to create in-memory database")?;

        schema::initialize_schema(&conn)?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the default database path
    pub fn default_database_path() -> Result<PathBuf> {
        let base_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .or_else(|| dirs::home_dir().map(|h| h.join(".local").join("share")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;

        Ok(base_dir.join(DEFAULT_DB_DIRNAME).join(DEFAULT_DB_FILENAME))
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection. For async contexts, use `execute_async`.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connection.lock();
        f(&conn)
    }

    /// Execute a database operation asynchronously using spawn_blocking
    pub async fn execute_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await
        .context("Database task panicked")?
    }

    /// Begin an async transaction and execute operations within it
    pub async fn transaction_async<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&rusqlite::Transaction) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock();

            let tx = conn.transaction()?;
            let result = f(&tx)?;
            tx.commit()?;

            Ok(result)
        })
        .await
        .context("Database transaction task panicked")?
    }

    /// Row counts per content type
    pub fn stats(&self) -> Result<DatabaseStats> {
        self.execute(|conn| {
            let mut kinds = Vec::with_capacity(EntityKind::ALL.len());

            for kind in EntityKind::ALL {
                let source_rows: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", kind.source_table()),
                    [],
                    |row| row.get(0),
                )?;
                let translation_rows: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) FROM {}", kind.translation_table()),
                    [],
                    |row| row.get(0),
                )?;
                kinds.push(KindStats {
                    kind,
                    source_rows,
                    translation_rows,
                });
            }

            let file_size_bytes = if self.db_path.to_string_lossy() != ":memory:" {
                std::fs::metadata(&self.db_path)
                    .map(|m| m.len())
                    .unwrap_or(0)
            } else {
                0
            };

            Ok(DatabaseStats {
                kinds,
                file_size_bytes,
            })
        })
    }
}

/// Row counts for one content type
#[derive(Debug, Clone)]
pub struct KindStats {
    /// Content type
    pub kind: EntityKind,
    /// Rows in the source table
    pub source_rows: i64,
    /// Rows in the translation table
    pub translation_rows: i64,
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    /// Per content type counts, in batch order
    pub kinds: Vec<KindStats>,
    /// Database file size in bytes
    pub file_size_bytes: u64,
}

impl std::fmt::Display for DatabaseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for stats in &self.kinds {
            writeln!(
                f,
                "{:<16} source: {:>5}  translations: {:>5}",
                stats.kind.to_string(),
                stats.source_rows,
                stats.translation_rows
            )?;
        }
        write!(f, "Size: {} KB", self.file_size_bytes / 1024)
    }
}
