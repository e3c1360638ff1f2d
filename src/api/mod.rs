/// API routes and handlers
pub mod health;
pub mod retrieve;
pub mod upload;

use crate::context::AppContext;
use axum::{
    routing::{get, post},
    Router,
};

/// Build API routes
///
/// The `/:content_id` capture stays behind every literal route so it never
/// shadows `/upload` or the probes.
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/", get(upload::list_files))
        .route("/upload", post(upload::upload_file))
        .merge(health::routes())
        .route("/:content_id", get(retrieve::get_content))
}
