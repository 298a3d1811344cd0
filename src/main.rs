//! Entry point: load config, wire dependencies, and run the server.

use credo::auth::JwtSecret;
use credo::config::Config;
use credo::db;
use credo::notify::TracingMailer;
use credo::repositories::RevocationStore;
use credo::verification::LinkSigner;
use credo::{create_app, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("config: {}", e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let db_pool = db::create_pool(&config.database_url, config.db_max_connections).await?;
    let revocations = RevocationStore::new(&config.redis_url)?;
    let jwt = JwtSecret::new(config.jwt_secret.clone(), config.token_ttl_minutes);
    let links = LinkSigner::new(config.link_secret.clone(), config.link_ttl_hours);

    let state = AppState {
        db: db_pool,
        jwt,
        links,
        revocations,
        mailer: Arc::new(TracingMailer),
        app_url: config.app_url.clone(),
    };

    let app = create_app(state);

    tracing::info!(addr = %config.server_addr, "listening");
    let listener = tokio::net::TcpListener::bind(config.server_addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
