use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use shared::constants::{API_PREFIX, HEALTH_CHECK_ENDPOINT};
use shared::prize_catalog::PrizeCatalog;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;
use crate::handlers::health_check;
use crate::promo::backend_lucky_wheel::create_router as create_lucky_wheel_router;
use crate::services::claim_service::{ClaimStore, MemoryClaimStore};
use crate::services::mail_service::{DiscountMailer, LogMailer};

mod config;
mod error;
mod handlers;
mod logging;
mod promo;
mod services;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<PrizeCatalog>,
    pub claims: Arc<dyn ClaimStore>,
    pub mailer: Arc<dyn DiscountMailer>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            catalog: Arc::new(PrizeCatalog::default()),
            claims: Arc::new(MemoryClaimStore::new()),
            mailer: Arc::new(LogMailer),
            config: Arc::new(config),
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origins.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let api_routes = Router::new()
        .route(HEALTH_CHECK_ENDPOINT, get(health_check))
        .merge(create_lucky_wheel_router());

    Router::new()
        .nest(API_PREFIX, api_routes)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::from_path(".env").ok();
    logging::setup()?;

    let config = Config::from_env()?;
    let addr = config.addr;
    let state = AppState::new(config);
    info!("Loaded {} prizes", state.catalog.len());

    let app = build_app(state);

    info!("listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
