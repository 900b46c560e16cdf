use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A live login session. The cookie carries the raw token; only its SHA-256
/// hash is stored. Deleting the row invalidates the session immediately.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
