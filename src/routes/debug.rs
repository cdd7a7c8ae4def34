use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::{error, instrument};

use crate::{
    state::AppState,
    users::{StoreError, DEFAULT_ADMIN_USERNAME},
};

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

/// Store connectivity and bootstrap account status.
#[instrument(skip(state))]
pub async fn db_status(State(state): State<AppState>) -> impl IntoResponse {
    let probe = async {
        let count = state.store.count_users().await?;
        let admin = state.store.find_by_username(DEFAULT_ADMIN_USERNAME).await?;
        Ok::<_, StoreError>((count, admin))
    };

    match probe.await {
        Ok((count, admin)) => (
            StatusCode::OK,
            Json(json!({
                "database": "connected",
                "store": state.config.store.kind(),
                "userCount": count,
                "adminUser": admin.map(|u| json!({
                    "username": u.username,
                    "created_at": u.created_at.format(&Rfc3339).unwrap_or_default(),
                })),
                "timestamp": now_rfc3339(),
            })),
        ),
        Err(e) => {
            error!(error = %e, "database debug probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "database": "error",
                    "error": e.to_string(),
                    "timestamp": now_rfc3339(),
                })),
            )
        }
    }
}
