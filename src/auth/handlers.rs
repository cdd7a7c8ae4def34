use axum::{
    body::Bytes,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use tokio::sync::OnceCell;
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{CredentialsRequest, LoginResponse, RegisterResponse},
        password::{hash_password_blocking, verify_password_blocking},
        session,
    },
    error::{ApiError, MSG_MISSING_FIELDS, MSG_PASSWORD_TOO_SHORT},
    state::AppState,
    users::StoreError,
};

/// Minimum password length, counted in Unicode scalar values (`char`s), not bytes.
pub const MIN_PASSWORD_CHARS: usize = 6;

const LOGIN_INTERNAL: &str = "Authentication error";
const REGISTER_INTERNAL: &str = "Registration error";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
}

/// Hash verified when the username is unknown, so both failure paths cost
/// one Argon2 verification.
async fn decoy_hash() -> Option<&'static str> {
    static DECOY: OnceCell<Option<String>> = OnceCell::const_new();
    DECOY
        .get_or_init(|| async { hash_password_blocking("decoy-password".into()).await.ok() })
        .await
        .as_deref()
}

#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let Some((username, password)) = CredentialsRequest::from_body(&body).into_parts() else {
        warn!("login missing fields");
        return Err(ApiError::Validation(MSG_MISSING_FIELDS));
    };

    let user = state
        .store
        .find_by_username(&username)
        .await
        .map_err(|e| {
            error!(error = %e, "find_by_username failed");
            ApiError::Internal(LOGIN_INTERNAL)
        })?;

    let Some(user) = user else {
        if let Some(decoy) = decoy_hash().await {
            let _ = verify_password_blocking(password, decoy.to_owned()).await;
        }
        warn!(%username, "login unknown username");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = verify_password_blocking(password, user.password_hash.clone())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "verify_password failed");
            ApiError::Internal(LOGIN_INTERNAL)
        })?;

    if !ok {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((
        [(header::SET_COOKIE, session::issue_cookie())],
        Json(LoginResponse { ok: true }),
    ))
}

#[instrument(skip(state, body))]
pub async fn register(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RegisterResponse>, ApiError> {
    let Some((username, password)) = CredentialsRequest::from_body(&body).into_parts() else {
        warn!("register missing fields");
        return Err(ApiError::Validation(MSG_MISSING_FIELDS));
    };

    if password.chars().count() < MIN_PASSWORD_CHARS {
        warn!(%username, "password too short");
        return Err(ApiError::Validation(MSG_PASSWORD_TOO_SHORT));
    }

    let user = match state.store.create_user(&username, &password).await {
        Ok(u) => u,
        Err(StoreError::AlreadyExists) => {
            warn!(%username, "username already registered");
            return Err(ApiError::AlreadyExists);
        }
        Err(e) => {
            error!(error = %e, %username, "create_user failed");
            return Err(ApiError::Internal(REGISTER_INTERNAL));
        }
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(Json(RegisterResponse {
        message: "User created successfully",
        user_id: user.id,
    }))
}

/// Clears the session marker. Nothing server side to revoke.
#[instrument]
pub async fn logout() -> impl IntoResponse {
    info!("session marker cleared");
    (
        [(header::SET_COOKIE, session::clear_cookie())],
        Json(LoginResponse { ok: true }),
    )
}
