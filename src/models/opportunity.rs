use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status assigned to a record when the submission leaves the field blank.
pub const DEFAULT_STATUS: &str = "In Process";

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    pub owner_id: Uuid,
    pub name: String,
    pub client: String,
    pub salesperson: String,
    pub product: String,
    pub requested_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub status_description: Option<String>,
    pub comments: Option<String>,
    pub deal_id: Option<String>,
}

/// Fields accepted at submission time. Owner and creation timestamp are
/// assigned server-side; everything except `status_description` and
/// `comments` is immutable once inserted.
#[derive(Debug, Clone)]
pub struct NewOpportunity {
    pub name: String,
    pub client: String,
    pub salesperson: String,
    pub product: String,
    pub requested_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub status: String,
    pub status_description: Option<String>,
    pub comments: Option<String>,
    pub deal_id: Option<String>,
}

/// An opportunity joined with its owner's username, for admin listings.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct OpportunityWithOwner {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub opportunity: Opportunity,
    pub owner_username: String,
}
