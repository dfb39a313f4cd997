//! Axum-based RPC server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use listwise_claims::ClaimService;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RpcError;
use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimService>,
}

/// Build the full API router.
pub fn router(service: Arc<ClaimService>) -> Router {
    let api = Router::new()
        .route("/businesses", post(handlers::register_business))
        .route("/businesses/:id", get(handlers::get_business))
        .route("/businesses/:id/vacate", post(handlers::vacate_business))
        .route("/businesses/:id/claims", post(handlers::initiate_claim))
        .route("/businesses/:id/claims/verify", post(handlers::verify_claim))
        .route("/businesses/:id/claims/resend", post(handlers::resend_code))
        .route("/businesses/:id/claims/mine", get(handlers::my_claim))
        .route("/claims", get(handlers::list_claims))
        .route("/claims/:id/decision", post(handlers::decide_claim))
        .route("/notifications", get(handlers::notifications))
        .route(
            "/notifications/:id/read",
            post(handlers::mark_notification_read),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api/v1", api)
        .with_state(AppState { service })
}

pub struct RpcServer {
    pub port: u16,
    service: Arc<ClaimService>,
}

impl RpcServer {
    pub fn new(port: u16, service: Arc<ClaimService>) -> Self {
        Self { port, service }
    }

    /// Serve until `shutdown` fires. In-flight requests are drained first.
    pub async fn start(&self, mut shutdown: broadcast::Receiver<()>) -> Result<(), RpcError> {
        let app = router(self.service.clone())
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| RpcError::Server(format!("bind {addr}: {e}")))?;
        info!(%addr, "RPC server listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                info!("RPC server shutting down");
            })
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
