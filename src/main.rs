//! Sweet Shop Management System API
//! Mission: Authenticated catalog and stock management over HTTP

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sweetshop_backend::{
    auth::{JwtHandler, UserStore},
    config::Config,
    inventory::SweetStore,
    server::{build_router, AppState},
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = Config::from_env()?;

    let users = Arc::new(UserStore::new(&config.database_path)?);
    let sweets = Arc::new(SweetStore::new(&config.database_path)?);
    let jwt = Arc::new(JwtHandler::new(
        config.jwt_secret.clone(),
        config.token_ttl_secs,
    ));

    if let Some(admin) = &config.admin_bootstrap {
        users
            .ensure_admin(&admin.username, &admin.email, &admin.password)
            .context("Failed to bootstrap admin user")?;
    }

    let app = build_router(AppState {
        users,
        sweets,
        jwt,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🍬 Sweet shop API listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sweetshop_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
