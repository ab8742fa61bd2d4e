//! Database access for vinfo-decoder
//!
//! SQLite holds the vehicle type templates; everything else is computed per
//! request.

pub mod templates;

use sqlx::SqlitePool;
use std::path::Path;
use vinfo_common::Result;

/// Initialize database connection pool
///
/// Creates the parent directory and the database file when missing, then
/// ensures the schema exists.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    init_tables(&pool).await?;

    Ok(pool)
}

/// Create template tables and indexes if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS vehicle_type_templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            make TEXT NOT NULL,
            model TEXT NOT NULL,
            engine_code TEXT,
            production_year INTEGER,
            type_label TEXT,
            wheels_and_tyres TEXT,
            extra_records TEXT,
            default_notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One template per key; absent key parts compare equal to each other
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_vehicle_type_templates_key
        ON vehicle_type_templates (
            make,
            model,
            IFNULL(engine_code, ''),
            IFNULL(production_year, -1),
            IFNULL(type_label, '')
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (vehicle_type_templates)");

    Ok(())
}
