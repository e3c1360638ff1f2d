/// Liveness and store-connectivity probes
///
/// - Liveness: is the gateway process alive? Never touches the store.
/// - Readiness: can the gateway serve traffic? Pings the store.
use crate::{context::AppContext, error::GatewayResult};
use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde_json::json;

/// Build health check routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/health", get(health_basic))
        .route("/health/ready", get(readiness_probe))
        .route("/test-ipfs", get(store_probe))
}

/// Basic liveness check
pub async fn health_basic() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness probe; 503 when the store does not answer
pub async fn readiness_probe(
    State(ctx): State<AppContext>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    match ctx.store.version().await {
        Ok(_) => Ok(Json(json!({
            "status": "ready",
            "version": env!("CARGO_PKG_VERSION")
        }))),
        Err(e) => {
            tracing::warn!(error = %e, "readiness_probe_failed: store check failed");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Store connectivity probe, reports the node version
pub async fn store_probe(
    State(ctx): State<AppContext>,
) -> GatewayResult<Json<serde_json::Value>> {
    let version = ctx.store.version().await?;

    Ok(Json(json!({
        "success": true,
        "ipfsApiUrl": ctx.config.store.api_url,
        "ipfsVersion": version,
    })))
}
