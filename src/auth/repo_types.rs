use sqlx::FromRow;
use uuid::Uuid;

/// Credential columns of the `users` table. Profile columns are read
/// through `profile::model::ProfileRow`.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}
