use askama::Template;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::auth::password;
use crate::auth::session::{self, SESSION_COOKIE};
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "login.html")]
struct LoginTemplate {
    error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

fn session_cookie(token: &str, ttl_hours: i64) -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(ttl_hours))
        .build();
    CookieJar::new().add(cookie)
}

fn clear_session_cookie() -> CookieJar {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(cookie)
}

/// One generic failure for unknown username and wrong password alike.
fn login_failure(state: &SharedState, username: &str) -> Response {
    state.login_limiter.record_failure(username);
    let template = LoginTemplate {
        error: Some("Invalid username or password. Try again.".to_string()),
    };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn login_page(State(state): State<SharedState>, jar: CookieJar) -> Response {
    // Already logged in, straight to the submission form
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let hash = session::hash_token(cookie.value());
        if let Ok(Some(_)) = db::sessions::find_user_by_hash(&state.pool, &hash).await {
            return Redirect::to("/registro").into_response();
        }
    }

    let template = LoginTemplate { error: None };
    Html(template.render().unwrap_or_default()).into_response()
}

pub async fn login(
    State(state): State<SharedState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if state.login_limiter.check(&form.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let Some(user) = db::users::find_by_username(&state.pool, &form.username).await? else {
        return Ok(login_failure(&state, &form.username));
    };

    let valid = password::verify(&form.password, &user.password_hash)
        .map_err(AppError::Internal)?;
    if !valid {
        return Ok(login_failure(&state, &form.username));
    }

    let token = session::issue(&state.pool, user.id, state.config.session_ttl_hours).await?;
    tracing::info!(username = %user.username, "login");

    let jar = session_cookie(&token, state.config.session_ttl_hours);
    Ok((jar, Redirect::to("/registro")).into_response())
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        session::revoke(&state.pool, cookie.value()).await?;
    }

    Ok((clear_session_cookie(), Redirect::to("/login")))
}
