/*!
 * Database schema definitions and migrations.
 *
 * Source tables hold the canonical source-language content edited in the
 * CMS. Each content type has a translation table with one row per
 * (entity, language); its columns are derived from the entity descriptors.
 */

use anyhow::{Context, Result};
use log::{debug, info};
use rusqlite::Connection;

use crate::entities::EntityKind;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;

    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Initializing database schema v{}", SCHEMA_VERSION);
        create_all_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version > SCHEMA_VERSION {
        return Err(anyhow::anyhow!(
            "Database schema v{} is newer than supported v{}",
            current_version,
            SCHEMA_VERSION
        ));
    } else {
        debug!("Database schema is up to date (v{})", current_version);
    }

    Ok(())
}

/// Get the current schema version from the database
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
            [],
            |row| row.get(0),
        )
        .context("Failed to check schema_version table existence")?;

    if !table_exists {
        return Ok(0);
    }

    let version: i32 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap_or(0);

    Ok(version)
}

/// Set the schema version in the database
fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO schema_version (id, version, updated_at) VALUES (1, ?1, datetime('now'))",
        [version],
    )?;
    Ok(())
}

/// Create all database tables
fn create_all_tables(conn: &Connection) -> Result<()> {
    // WAL keeps readers (the CMS) unblocked while a batch writes
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            version INTEGER NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute_batch(SOURCE_TABLES)
        .context("Failed to create source tables")?;

    for kind in EntityKind::ALL {
        conn.execute_batch(&translation_table_ddl(kind))
            .with_context(|| format!("Failed to create {}", kind.translation_table()))?;
    }

    info!("Database schema created successfully");
    Ok(())
}

/// Source-language content tables
const SOURCE_TABLES: &str = r#"
    CREATE TABLE IF NOT EXISTS packages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT UNIQUE,
        title TEXT,
        short_description TEXT,
        description TEXT,
        location TEXT,
        duration TEXT,
        highlights TEXT,
        itinerary TEXT,
        includes TEXT,
        excludes TEXT,
        faqs TEXT,
        price REAL,
        status TEXT NOT NULL DEFAULT 'draft',
        created_at TEXT,
        updated_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_packages_status ON packages(status);

    CREATE TABLE IF NOT EXISTS blog_posts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        slug TEXT UNIQUE,
        title TEXT,
        excerpt TEXT,
        content TEXT,
        category TEXT,
        tags TEXT,
        status TEXT NOT NULL DEFAULT 'draft',
        published_at TEXT,
        created_at TEXT,
        updated_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_blog_posts_status ON blog_posts(status);

    CREATE TABLE IF NOT EXISTS testimonials (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_name TEXT,
        content TEXT,
        designation TEXT,
        trip_name TEXT,
        rating INTEGER,
        is_approved INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    );

    CREATE TABLE IF NOT EXISTS gallery_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        image_url TEXT,
        title TEXT,
        description TEXT,
        category TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        is_published INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT
    );

    CREATE TABLE IF NOT EXISTS sections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        section_key TEXT,
        page TEXT,
        title TEXT,
        subtitle TEXT,
        description TEXT,
        cta_label TEXT,
        cta_url TEXT,
        content TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT,
        updated_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_sections_key ON sections(section_key);

    CREATE TABLE IF NOT EXISTS navigation_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        section_id INTEGER REFERENCES sections(id) ON DELETE CASCADE,
        parent_id INTEGER REFERENCES navigation_items(id) ON DELETE SET NULL,
        title TEXT,
        url TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        is_active INTEGER NOT NULL DEFAULT 1,
        created_at TEXT,
        updated_at TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_navigation_items_section ON navigation_items(section_id);
"#;

/// DDL for the translation table of one content type
pub fn translation_table_ddl(kind: EntityKind) -> String {
    let table = kind.translation_table();
    let fk = kind.foreign_key();

    let field_columns: String = kind
        .fields()
        .iter()
        .map(|field| format!("            {} TEXT,\n", field.name))
        .collect();

    format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            {fk} INTEGER NOT NULL REFERENCES {source}(id) ON DELETE CASCADE,
            language TEXT NOT NULL,
{field_columns}            is_auto_translated INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            UNIQUE({fk}, language)
        );

        CREATE INDEX IF NOT EXISTS idx_{table}_language ON {table}(language);
        "#,
        table = table,
        fk = fk,
        source = kind.source_table(),
        field_columns = field_columns,
    )
}
