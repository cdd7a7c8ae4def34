use axum::{routing::get, Router};

use crate::state::AppState;

pub mod debug;
pub mod pages;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(pages::login_page))
        .route("/dashboard", get(pages::dashboard_page))
        .route("/api/debug/db", get(debug::db_status))
        .route("/health", get(|| async { "ok" }))
}
