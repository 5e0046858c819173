use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::services::NewFoodLog;
use crate::nutrition::{FoodLogEntry, NutrientTable};

pub const LIST_LIMIT: i64 = 100;

/// Nutrient columns are read as nullable so a damaged row surfaces as a
/// malformed entry instead of failing the whole query.
#[derive(Debug, Clone, FromRow)]
pub struct FoodLogRow {
    pub id: Uuid,
    pub food_name: String,
    pub portion_size: f64,
    pub portion_unit: String,
    pub protein_g: Option<f64>,
    pub potassium_mg: Option<f64>,
    pub phosphorus_mg: Option<f64>,
    pub sodium_mg: Option<f64>,
    pub confidence_score: f64,
    pub image_url: Option<String>,
    pub logged_at: OffsetDateTime,
}

impl From<FoodLogRow> for FoodLogEntry {
    fn from(row: FoodLogRow) -> Self {
        Self {
            id: row.id,
            food_name: row.food_name,
            portion_size: row.portion_size,
            portion_unit: row.portion_unit,
            nutrients: NutrientTable {
                protein: row.protein_g,
                potassium: row.potassium_mg,
                phosphorus: row.phosphorus_mg,
                sodium: row.sodium_mg,
            },
            confidence_score: row.confidence_score,
            image_url: row.image_url,
            logged_at: row.logged_at,
        }
    }
}

const COLUMNS: &str = "id, food_name, portion_size, portion_unit, protein_g, potassium_mg, \
                       phosphorus_mg, sodium_mg, confidence_score, image_url, logged_at";

pub async fn insert(db: &PgPool, user_id: Uuid, log: &NewFoodLog) -> anyhow::Result<FoodLogEntry> {
    let sql = format!(
        r#"
        INSERT INTO food_logs (user_id, food_name, portion_size, portion_unit, protein_g,
                               potassium_mg, phosphorus_mg, sodium_mg, confidence_score,
                               image_url, logged_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING {COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, FoodLogRow>(&sql)
        .bind(user_id)
        .bind(&log.food_name)
        .bind(log.portion_size)
        .bind(&log.portion_unit)
        .bind(log.nutrients.protein)
        .bind(log.nutrients.potassium)
        .bind(log.nutrients.phosphorus)
        .bind(log.nutrients.sodium)
        .bind(log.confidence_score)
        .bind(&log.image_url)
        .bind(log.logged_at)
        .fetch_one(db)
        .await
        .context("insert food log")?;
    Ok(row.into())
}

/// Newest first, optionally bounded by `[start, end)`.
pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> anyhow::Result<Vec<FoodLogEntry>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM food_logs
        WHERE user_id = $1
          AND ($2::timestamptz IS NULL OR logged_at >= $2)
          AND ($3::timestamptz IS NULL OR logged_at < $3)
        ORDER BY logged_at DESC
        LIMIT $4
        "#
    );
    let rows = sqlx::query_as::<_, FoodLogRow>(&sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .bind(LIST_LIMIT)
        .fetch_all(db)
        .await
        .context("list food logs")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

/// Every entry in the half-open window `[start, end)`, oldest first.
pub async fn list_in_window(
    db: &PgPool,
    user_id: Uuid,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> anyhow::Result<Vec<FoodLogEntry>> {
    let sql = format!(
        r#"
        SELECT {COLUMNS}
        FROM food_logs
        WHERE user_id = $1 AND logged_at >= $2 AND logged_at < $3
        ORDER BY logged_at ASC
        "#
    );
    let rows = sqlx::query_as::<_, FoodLogRow>(&sql)
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
        .context("list food logs in window")?;
    Ok(rows.into_iter().map(Into::into).collect())
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM food_logs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await
        .context("delete food log")?;
    Ok(result.rows_affected() > 0)
}
