use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::{PatientProfile, ProfileRow};

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<ProfileRow>> {
    let row = sqlx::query_as::<_, ProfileRow>(
        r#"
        SELECT age, ckd_stage, weight_kg, activity_level
          FROM users
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load profile")?;
    Ok(row)
}

/// Returns false when the user no longer exists.
pub async fn update(db: &PgPool, user_id: Uuid, profile: &PatientProfile) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
           SET age = $2, ckd_stage = $3, weight_kg = $4, activity_level = $5
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(i16::from(profile.age))
    .bind(i16::from(profile.ckd_stage))
    .bind(profile.weight_kg)
    .bind(profile.activity_level.as_str())
    .execute(db)
    .await
    .context("update profile")?;
    Ok(result.rows_affected() == 1)
}
