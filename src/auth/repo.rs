use crate::auth::repo_types::User;
use crate::profile::model::PatientProfile;
use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    /// Inserts credentials and profile in one row.
    pub async fn create(
        db: &PgPool,
        email: &str,
        password_hash: &str,
        profile: &PatientProfile,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, age, ckd_stage, weight_kg, activity_level)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(i16::from(profile.age))
        .bind(i16::from(profile.ckd_stage))
        .bind(profile.weight_kg)
        .bind(profile.activity_level.as_str())
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }
}

const UNIQUE_VIOLATION: &str = "23505";

/// True when `err` wraps a Postgres unique-constraint violation.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct PgError(&'static str);

    impl fmt::Display for PgError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "postgres error {}", self.0)
        }
    }

    impl StdError for PgError {}

    impl sqlx::error::DatabaseError for PgError {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(self.0))
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            match self.0 {
                UNIQUE_VIOLATION => sqlx::error::ErrorKind::UniqueViolation,
                _ => sqlx::error::ErrorKind::Other,
            }
        }
    }

    fn insert_failure(code: &'static str) -> anyhow::Error {
        Err::<(), _>(sqlx::Error::Database(Box::new(PgError(code))))
            .context("insert user")
            .unwrap_err()
    }

    #[test]
    fn duplicate_email_is_detected_through_context() {
        assert!(is_unique_violation(&insert_failure("23505")));
    }

    #[test]
    fn other_failures_are_not_duplicates() {
        assert!(!is_unique_violation(&insert_failure("23514")));
        assert!(!is_unique_violation(&anyhow::Error::new(sqlx::Error::RowNotFound)));
        assert!(!is_unique_violation(&anyhow::anyhow!("pool timed out")));
    }
}
