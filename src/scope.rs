//! Record visibility rules.
//!
//! Every read of opportunity data goes through here: admins see all records
//! (annotated with the owning username), regular users see exactly their own.
//! The same rule gates single-record detail and edit lookups.

use sqlx::PgPool;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::models::Opportunity;

/// An opportunity as visible to a given caller. `owner` is resolved only for
/// admin callers; listings and the CSV export leave it blank otherwise.
#[derive(Debug, Clone)]
pub struct VisibleOpportunity {
    pub record: Opportunity,
    pub owner: Option<String>,
}

/// The full record set the caller may see, in insertion order.
pub async fn visible_set(
    pool: &PgPool,
    auth: &AuthUser,
) -> Result<Vec<VisibleOpportunity>, sqlx::Error> {
    if auth.is_admin() {
        let rows = db::opportunities::list_all_with_owner(pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| VisibleOpportunity {
                record: row.opportunity,
                owner: Some(row.owner_username),
            })
            .collect())
    } else {
        let rows = db::opportunities::list_by_owner(pool, auth.user_id).await?;
        Ok(rows
            .into_iter()
            .map(|record| VisibleOpportunity { record, owner: None })
            .collect())
    }
}

/// Authorize and fetch a single record for viewing or editing.
///
/// Admins may reach any record (missing id is NotFound). Non-admins get the
/// same Forbidden for a record they do not own and for one that does not
/// exist, so a denied response never reveals whether the id is real.
pub async fn fetch_scoped(
    pool: &PgPool,
    auth: &AuthUser,
    id: i64,
) -> Result<Opportunity, AppError> {
    if auth.is_admin() {
        db::opportunities::find_by_id(pool, id)
            .await?
            .ok_or_else(|| AppError::NotFound("Opportunity not found".to_string()))
    } else {
        db::opportunities::find_by_id_owned(pool, id, auth.user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Not authorized".to_string()))
    }
}
