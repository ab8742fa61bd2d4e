//! SQLite-backed template store
//!
//! Lookup: exact make and model, other key parts filter only when present.
//! Upsert: select-then-insert/update inside one transaction, so readers never
//! observe a half-written template.

use crate::templates::{TemplateKey, TemplateStore, TemplateUpsert, VehicleTypeTemplate};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, info};
use vinfo_common::{Error, Result};

const SELECT_COLUMNS: &str = "SELECT id, make, model, engine_code, production_year, type_label, \
     wheels_and_tyres, extra_records, default_notes, created_at, updated_at \
     FROM vehicle_type_templates";

#[derive(Debug, FromRow)]
struct TemplateRow {
    id: i64,
    make: String,
    model: String,
    engine_code: Option<String>,
    production_year: Option<i32>,
    type_label: Option<String>,
    wheels_and_tyres: Option<String>,
    extra_records: Option<String>,
    default_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for VehicleTypeTemplate {
    fn from(row: TemplateRow) -> Self {
        Self {
            id: row.id,
            key: TemplateKey {
                make: row.make,
                model: row.model,
                engine_code: row.engine_code,
                production_year: row.production_year,
                type_label: row.type_label,
            },
            wheels_and_tyres: row.wheels_and_tyres,
            extra_records: row.extra_records,
            default_notes: row.default_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Template store over a shared SQLite pool
#[derive(Clone)]
pub struct SqliteTemplateStore {
    pool: SqlitePool,
}

impl SqliteTemplateStore {
    /// Wrap a pool whose schema was created by `db::init_tables`
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for SqliteTemplateStore {
    async fn find_template(&self, key: &TemplateKey) -> Result<Option<VehicleTypeTemplate>> {
        let sql = format!(
            "{} WHERE make = ? AND model = ? \
             AND (? IS NULL OR engine_code = ?) \
             AND (? IS NULL OR production_year = ?) \
             AND (? IS NULL OR type_label = ?) \
             ORDER BY id LIMIT 1",
            SELECT_COLUMNS
        );

        let row: Option<TemplateRow> = sqlx::query_as(&sql)
            .bind(&key.make)
            .bind(&key.model)
            .bind(&key.engine_code)
            .bind(&key.engine_code)
            .bind(key.production_year)
            .bind(key.production_year)
            .bind(&key.type_label)
            .bind(&key.type_label)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            make = %key.make,
            model = %key.model,
            found = row.is_some(),
            "Template lookup"
        );
        Ok(row.map(VehicleTypeTemplate::from))
    }

    async fn upsert_template(&self, upsert: TemplateUpsert) -> Result<VehicleTypeTemplate> {
        upsert.validate()?;
        let now = Utc::now();
        let key = &upsert.key;

        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM vehicle_type_templates \
             WHERE make = ? AND model = ? AND engine_code IS ? \
             AND production_year IS ? AND type_label IS ?",
        )
        .bind(&key.make)
        .bind(&key.model)
        .bind(&key.engine_code)
        .bind(key.production_year)
        .bind(&key.type_label)
        .fetch_optional(&mut *tx)
        .await?;

        let id = match existing {
            Some((id,)) => {
                sqlx::query(
                    "UPDATE vehicle_type_templates \
                     SET wheels_and_tyres = ?, extra_records = ?, default_notes = ?, updated_at = ? \
                     WHERE id = ?",
                )
                .bind(&upsert.wheels_and_tyres)
                .bind(&upsert.extra_records)
                .bind(&upsert.default_notes)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await?;
                info!(make = %key.make, model = %key.model, id, "Updated vehicle type template");
                id
            }
            None => {
                let result = sqlx::query(
                    "INSERT INTO vehicle_type_templates \
                     (make, model, engine_code, production_year, type_label, \
                      wheels_and_tyres, extra_records, default_notes, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&key.make)
                .bind(&key.model)
                .bind(&key.engine_code)
                .bind(key.production_year)
                .bind(&key.type_label)
                .bind(&upsert.wheels_and_tyres)
                .bind(&upsert.extra_records)
                .bind(&upsert.default_notes)
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;
                let id = result.last_insert_rowid();
                info!(make = %key.make, model = %key.model, id, "Created vehicle type template");
                id
            }
        };

        let row: TemplateRow = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row.into())
    }
}
