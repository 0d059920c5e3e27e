/*
 * Responsibility
 * - Config loading → dependency construction → Router assembly
 * - middleware application (CORS / request-id / trace)
 * - axum::serve() startup
 */
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::config::{AuthScheme, Config};
use crate::middleware::{cors, http};
use crate::repos::MongoStore;
use crate::services::auth::{
    Authenticator, FirebaseAuthenticator, SignedTokenAuthenticator, TokenCodec,
};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,smart_deals_server=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        "smart deals server is running on port: {}",
        config.addr.port()
    );
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    // One long-lived client handle, shared by all concurrent requests.
    let client = mongodb::Client::with_uri_str(&config.mongodb_uri)
        .await
        .context("connecting to MongoDB")?;
    let store = MongoStore::new(client.database(&config.db_name));
    store
        .ensure_indexes()
        .await
        .context("creating store indexes")?;

    let token_codec = Arc::new(TokenCodec::new(config.jwt_secret.as_bytes()));

    let authenticator: Arc<dyn Authenticator> = match &config.auth_scheme {
        AuthScheme::Firebase { project_id } => {
            Arc::new(FirebaseAuthenticator::new(project_id).context("building identity verifier")?)
        }
        AuthScheme::Signed => Arc::new(SignedTokenAuthenticator::new(token_codec.clone())),
    };

    Ok(AppState::new(
        Arc::new(store),
        authenticator,
        token_codec,
        chrono::Duration::seconds(config.signed_token_ttl_seconds),
    ))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state);
    let router = cors::apply(router, config);
    http::apply(router)
}
