/// HTTP server setup and routing
use crate::{
    api,
    context::AppContext,
    error::{GatewayError, GatewayResult},
    metrics,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    response::Json,
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Build the main application router
/// Returns Router<()> because state is already provided
pub fn build_router(ctx: AppContext) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let upload_limit = ctx.config.upload.max_size;

    Router::new()
        // Metrics endpoint (no state)
        .route("/metrics", get(serve_metrics))
        // API routes - merge before with_state
        .merge(api::routes())
        // Provide state - converts Router<AppContext> to Router<()>
        .with_state(ctx)
        // Cap request bodies; oversize uploads fail while the body streams in
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

/// Prometheus text exposition
async fn serve_metrics() -> String {
    metrics::gather()
}

/// 404 handler
async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "NotFound",
            "details": "Endpoint not found"
        })),
    )
}

/// Start the HTTP server
pub async fn serve(ctx: AppContext) -> GatewayResult<()> {
    let addr = format!("{}:{}", ctx.config.service.hostname, ctx.config.service.port);

    info!("IPFS gateway listening on {}", addr);
    info!("   Store API: {}", ctx.config.store.api_url);
    info!("   Read gateway: {}", ctx.config.store.gateway_url);

    let app = build_router(ctx);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GatewayError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| GatewayError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
