use askama::Template;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::export;
use crate::models::NewOpportunity;
use crate::scope::{self, VisibleOpportunity};
use crate::state::SharedState;

/// Choices offered by the submission form's salesperson dropdown.
const SALESPEOPLE: [&str; 3] = ["Vendedor 1", "Vendedor 2", "Vendedor 3"];

#[derive(Template)]
#[template(path = "registro.html")]
struct RegistroTemplate {
    username: String,
    is_admin: bool,
    salespeople: Vec<String>,
}

#[derive(Template)]
#[template(path = "oportunidades.html")]
struct OportunidadesTemplate {
    username: String,
    is_admin: bool,
    rows: Vec<OpportunityRow>,
}

#[derive(Template)]
#[template(path = "detalles.html")]
struct DetallesTemplate {
    username: String,
    is_admin: bool,
    row: OpportunityDetail,
}

#[derive(Template)]
#[template(path = "editar.html")]
struct EditarTemplate {
    username: String,
    is_admin: bool,
    id: i64,
    name: String,
    status_description: String,
    comments: String,
}

struct OpportunityRow {
    id: i64,
    created_at: String,
    owner: String,
    name: String,
    client: String,
    salesperson: String,
    product: String,
    requested_date: String,
    delivery_date: String,
    status: String,
}

struct OpportunityDetail {
    id: i64,
    created_at: String,
    name: String,
    client: String,
    salesperson: String,
    product: String,
    requested_date: String,
    delivery_date: String,
    status: String,
    status_description: String,
    comments: String,
    deal_id: String,
}

#[derive(Deserialize)]
pub struct RegistroForm {
    pub name: String,
    pub client: String,
    pub salesperson: String,
    pub product: String,
    pub requested_date: String,
    pub delivery_date: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_description: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub deal_id: String,
}

#[derive(Deserialize)]
pub struct EditarForm {
    #[serde(default)]
    pub status_description: String,
    #[serde(default)]
    pub comments: String,
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid {field}: expected YYYY-MM-DD")))
}

pub async fn registro_page(auth: AuthUser) -> impl IntoResponse {
    let template = RegistroTemplate {
        username: auth.username.clone(),
        is_admin: auth.is_admin(),
        salespeople: SALESPEOPLE.iter().map(|s| s.to_string()).collect(),
    };
    Html(template.render().unwrap_or_default())
}

pub async fn registro_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<RegistroForm>,
) -> Result<Redirect, AppError> {
    for (value, field) in [
        (&form.name, "name"),
        (&form.client, "client"),
        (&form.salesperson, "salesperson"),
        (&form.product, "product"),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::BadRequest(format!("Missing required field: {field}")));
        }
    }

    let new = NewOpportunity {
        name: form.name.trim().to_string(),
        client: form.client.trim().to_string(),
        salesperson: form.salesperson.trim().to_string(),
        product: form.product.trim().to_string(),
        requested_date: parse_date(&form.requested_date, "requested date")?,
        delivery_date: parse_date(&form.delivery_date, "delivery date")?,
        status: form.status,
        status_description: non_empty(form.status_description),
        comments: non_empty(form.comments),
        deal_id: non_empty(form.deal_id),
    };

    let record = db::opportunities::insert(&state.pool, auth.user_id, &new).await?;
    tracing::info!(id = record.id, owner = %auth.username, "opportunity registered");

    Ok(Redirect::to("/registro"))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let visible = scope::visible_set(&state.pool, &auth).await?;

    let tz = state.config.display_tz;
    let rows: Vec<OpportunityRow> = visible
        .iter()
        .map(|v| {
            let o = &v.record;
            OpportunityRow {
                id: o.id,
                // List view shows local time; the export stays in UTC
                created_at: o
                    .created_at
                    .with_timezone(&tz)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                owner: v.owner.clone().unwrap_or_default(),
                name: o.name.clone(),
                client: o.client.clone(),
                salesperson: o.salesperson.clone(),
                product: o.product.clone(),
                requested_date: o.requested_date.format("%Y-%m-%d").to_string(),
                delivery_date: o.delivery_date.format("%Y-%m-%d").to_string(),
                status: o.status.clone(),
            }
        })
        .collect();

    let template = OportunidadesTemplate {
        username: auth.username.clone(),
        is_admin: auth.is_admin(),
        rows,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn detalles(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let o = scope::fetch_scoped(&state.pool, &auth, id).await?;

    let row = OpportunityDetail {
        id: o.id,
        created_at: o
            .created_at
            .with_timezone(&state.config.display_tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        name: o.name,
        client: o.client,
        salesperson: o.salesperson,
        product: o.product,
        requested_date: o.requested_date.format("%Y-%m-%d").to_string(),
        delivery_date: o.delivery_date.format("%Y-%m-%d").to_string(),
        status: o.status,
        status_description: o.status_description.unwrap_or_default(),
        comments: o.comments.unwrap_or_default(),
        deal_id: o.deal_id.unwrap_or_default(),
    };

    let template = DetallesTemplate {
        username: auth.username.clone(),
        is_admin: auth.is_admin(),
        row,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn editar_page(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let o = scope::fetch_scoped(&state.pool, &auth, id).await?;

    let template = EditarTemplate {
        username: auth.username.clone(),
        is_admin: auth.is_admin(),
        id: o.id,
        name: o.name,
        status_description: o.status_description.unwrap_or_default(),
        comments: o.comments.unwrap_or_default(),
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn editar_submit(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<i64>,
    Form(form): Form<EditarForm>,
) -> Result<Redirect, AppError> {
    // Authorization first; the update itself touches only the two mutable fields
    scope::fetch_scoped(&state.pool, &auth, id).await?;

    db::opportunities::update_status_fields(
        &state.pool,
        id,
        non_empty(form.status_description).as_deref(),
        non_empty(form.comments).as_deref(),
    )
    .await?;

    Ok(Redirect::to("/oportunidades"))
}

pub async fn exportar(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    let visible: Vec<VisibleOpportunity> = scope::visible_set(&state.pool, &auth).await?;
    let csv = export::format_csv(&visible);
    let filename = export::export_filename(Utc::now());

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}
