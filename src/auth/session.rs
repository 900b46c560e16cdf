use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;

pub const SESSION_COOKIE: &str = "session";

pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Open a session for the user and return the raw token destined for the
/// cookie. Only the token's hash reaches the database.
pub async fn issue(pool: &PgPool, user_id: Uuid, ttl_hours: i64) -> Result<String, sqlx::Error> {
    let token = generate_token();
    let expires_at = Utc::now() + Duration::hours(ttl_hours);
    db::sessions::create(pool, user_id, &hash_token(&token), expires_at).await?;
    Ok(token)
}

/// Invalidate the session carried by the given raw token. Later requests
/// presenting the same cookie are treated as unauthenticated.
pub async fn revoke(pool: &PgPool, token: &str) -> Result<(), sqlx::Error> {
    db::sessions::delete_by_hash(pool, &hash_token(token)).await
}
