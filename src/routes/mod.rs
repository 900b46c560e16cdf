pub mod admin;
pub mod auth;
pub mod opportunities;

use axum::response::Redirect;
use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

async fn home() -> Redirect {
    Redirect::to("/login")
}

pub fn page_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(home))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Opportunities
        .route(
            "/registro",
            get(opportunities::registro_page).post(opportunities::registro_submit),
        )
        .route("/oportunidades", get(opportunities::list))
        .route("/detalles/{id}", get(opportunities::detalles))
        .route(
            "/editar/{id}",
            get(opportunities::editar_page).post(opportunities::editar_submit),
        )
        .route("/exportar", get(opportunities::exportar))
        // Admin
        .route(
            "/create_admin",
            get(admin::create_admin_page).post(admin::create_admin),
        )
        .route("/admin", get(admin::admin_page))
        .route("/admin/users", post(admin::create_user))
}
