use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{NewOpportunity, Opportunity, OpportunityWithOwner, DEFAULT_STATUS};

/// Insert a new record owned by `owner_id`. The creation timestamp is
/// assigned by the database; a blank status falls back to "In Process".
pub async fn insert(
    pool: &PgPool,
    owner_id: Uuid,
    new: &NewOpportunity,
) -> Result<Opportunity, sqlx::Error> {
    let status = if new.status.trim().is_empty() {
        DEFAULT_STATUS
    } else {
        new.status.as_str()
    };

    sqlx::query_as::<_, Opportunity>(
        "INSERT INTO opportunities
             (owner_id, name, client, salesperson, product,
              requested_date, delivery_date, status,
              status_description, comments, deal_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         RETURNING *",
    )
    .bind(owner_id)
    .bind(&new.name)
    .bind(&new.client)
    .bind(&new.salesperson)
    .bind(&new.product)
    .bind(new.requested_date)
    .bind(new.delivery_date)
    .bind(status)
    .bind(&new.status_description)
    .bind(&new.comments)
    .bind(&new.deal_id)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Opportunity>, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>("SELECT * FROM opportunities WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Single-record lookup restricted to the owning user.
pub async fn find_by_id_owned(
    pool: &PgPool,
    id: i64,
    owner_id: Uuid,
) -> Result<Option<Opportunity>, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>(
        "SELECT * FROM opportunities WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await
}

pub async fn list_by_owner(
    pool: &PgPool,
    owner_id: Uuid,
) -> Result<Vec<Opportunity>, sqlx::Error> {
    sqlx::query_as::<_, Opportunity>(
        "SELECT * FROM opportunities WHERE owner_id = $1 ORDER BY id",
    )
    .bind(owner_id)
    .fetch_all(pool)
    .await
}

pub async fn list_all_with_owner(
    pool: &PgPool,
) -> Result<Vec<OpportunityWithOwner>, sqlx::Error> {
    sqlx::query_as::<_, OpportunityWithOwner>(
        "SELECT o.*, u.username AS owner_username
         FROM opportunities o
         JOIN users u ON o.owner_id = u.id
         ORDER BY o.id",
    )
    .fetch_all(pool)
    .await
}

/// Post-creation edit. Status description and comments are the only mutable
/// columns; everything else is fixed at insert.
pub async fn update_status_fields(
    pool: &PgPool,
    id: i64,
    status_description: Option<&str>,
    comments: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE opportunities SET status_description = $2, comments = $3 WHERE id = $1",
    )
    .bind(id)
    .bind(status_description)
    .bind(comments)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
