use anyhow::Context;

mod app;
mod auth;
mod config;
mod error;
mod routes;
mod state;
mod users;

use crate::{app::build_app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bunkerdesk=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env().context("load configuration")?;
    let addr = config.bind_addr();
    let seed_admin = config.seed_admin;

    let app_state = AppState::init(config).await?;

    if seed_admin {
        app_state
            .store
            .seed_default_account()
            .await
            .context("seed bootstrap account")?;
    } else {
        tracing::info!("bootstrap account seeding disabled");
    }

    app::serve(build_app(app_state), &addr).await
}
