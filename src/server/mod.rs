pub mod api;

use crate::error::AppError;
use crate::services::{CryptoClient, EquityClient, NewsClient};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers
///
/// Clients are created once at startup; no request-scoped state is kept
/// between requests.
#[derive(Clone)]
pub struct AppState {
    pub equity: Arc<EquityClient>,
    pub crypto: Arc<CryptoClient>,
    pub news: Arc<NewsClient>,
    pub started_at: Instant,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) | AppError::InsufficientData => StatusCode::BAD_REQUEST,
            AppError::Upstream { .. } | AppError::Network(_) | AppError::Parse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Config(_) | AppError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Start the axum server
pub async fn serve(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting markethub server");

    // Public read-only API: permissive CORS, GET only
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  GET /symbol/{{symbol}}?period=1mo");
    tracing::info!("  GET /crypto/{{symbol}}?period=1mo");
    tracing::info!("  GET /indicators/{{symbol}}");
    tracing::info!("  GET /search?query=");
    tracing::info!("  GET /batch?symbols=a,b,c&asset_class=");
    tracing::info!("  GET /market-overview");
    tracing::info!("  GET /crypto-market-overview");
    tracing::info!("  GET /news?topic=");
    tracing::info!("  GET /health");

    let app = Router::new()
        .route("/symbol/{symbol}", get(api::get_symbol_handler))
        .route("/crypto/{symbol}", get(api::get_crypto_handler))
        .route("/indicators/{symbol}", get(api::get_indicators_handler))
        .route("/search", get(api::search_handler))
        .route("/batch", get(api::batch_handler))
        .route("/market-overview", get(api::market_overview_handler))
        .route(
            "/crypto-market-overview",
            get(api::crypto_market_overview_handler),
        )
        .route("/news", get(api::news_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
