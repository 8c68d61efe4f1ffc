//! Liveness endpoint for the hosting platform.
//!
//! Any method on `/` answers with a fixed body, `/health` mirrors it for
//! platforms that poll that path. Holds no application state.

use axum::{http::StatusCode, response::IntoResponse, routing::any, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Body returned on the root path
pub const LIVENESS_BODY: &str = "OK - bot ishlayapti";

/// Build the liveness router.
pub fn liveness_router() -> Router {
    Router::new()
        .route("/", any(root_handler))
        .route("/health", any(health_handler))
}

/// Start the liveness server and serve until the process exits.
pub async fn start_web_server(port: u16) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    log::info!("Starting liveness server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, liveness_router()).await
}

/// `/` — always OK.
async fn root_handler() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_BODY)
}

/// `/health` — simple health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
