use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect};
use axum::Form;
use serde::Deserialize;

use crate::auth::extractor::AuthUser;
use crate::auth::password;
use crate::db;
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    username: String,
    is_admin: bool,
    rows: Vec<AdminRow>,
}

#[derive(Template)]
#[template(path = "create_admin.html")]
struct CreateAdminTemplate {
    error: Option<String>,
}

struct AdminRow {
    id: i64,
    created_at: String,
    owner: String,
    name: String,
    client: String,
    product: String,
    status: String,
}

#[derive(Deserialize)]
pub struct CreateAccountForm {
    pub username: String,
    pub password: String,
}

fn validate_account(form: &CreateAccountForm) -> Result<(), AppError> {
    if form.username.trim().is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }
    if form.password.len() < 8 {
        return Err(AppError::BadRequest(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

async fn create_account(
    state: &SharedState,
    form: &CreateAccountForm,
    role: Role,
) -> Result<(), AppError> {
    validate_account(form)?;

    let pw_hash = password::hash(&form.password).map_err(AppError::Internal)?;

    db::users::create(&state.pool, form.username.trim(), &pw_hash, role)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict("A user with this username already exists".to_string())
            }
            _ => AppError::Database(e),
        })?;

    Ok(())
}

/// All records across owners, with each owner's username resolved.
pub async fn admin_page(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, AppError> {
    auth.require_admin()?;

    let records = db::opportunities::list_all_with_owner(&state.pool).await?;

    let tz = state.config.display_tz;
    let rows: Vec<AdminRow> = records
        .into_iter()
        .map(|row| {
            let o = row.opportunity;
            AdminRow {
                id: o.id,
                created_at: o
                    .created_at
                    .with_timezone(&tz)
                    .format("%Y-%m-%d %H:%M:%S")
                    .to_string(),
                owner: row.owner_username,
                name: o.name,
                client: o.client,
                product: o.product,
                status: o.status,
            }
        })
        .collect();

    let template = AdminTemplate {
        username: auth.username.clone(),
        is_admin: true,
        rows,
    };
    Ok(Html(template.render().unwrap_or_default()))
}

pub async fn create_admin_page() -> impl IntoResponse {
    let template = CreateAdminTemplate { error: None };
    Html(template.render().unwrap_or_default())
}

/// Bootstrap path: provision an ADMIN account. Unauthenticated, as in the
/// deployments this replaces.
pub async fn create_admin(
    State(state): State<SharedState>,
    Form(form): Form<CreateAccountForm>,
) -> Result<Redirect, AppError> {
    create_account(&state, &form, Role::Admin).await?;
    tracing::info!(username = %form.username.trim(), "admin account created");
    Ok(Redirect::to("/login"))
}

/// Admin-only provisioning of regular USER accounts.
pub async fn create_user(
    auth: AuthUser,
    State(state): State<SharedState>,
    Form(form): Form<CreateAccountForm>,
) -> Result<Redirect, AppError> {
    auth.require_admin()?;
    create_account(&state, &form, Role::User).await?;
    tracing::info!(username = %form.username.trim(), by = %auth.username, "user account created");
    Ok(Redirect::to("/admin"))
}
