//! Process liveness surface.
//!
//! A single unauthenticated endpoint returning a static string. Runs on
//! HEALTH_PORT alongside the dispatcher; there is no other HTTP surface.

use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// Start the health check server.
pub async fn start_web_server(port: u16) -> Result<(), std::io::Error> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new().route("/health", get(health_handler));

    log::info!("Starting health server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// GET /health, simple liveness check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
