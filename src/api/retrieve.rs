/// Retrieval endpoint: stream content back by identifier
use crate::{
    context::AppContext,
    error::{GatewayError, GatewayResult},
    metrics,
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

/// Stream content for an identifier
///
/// The store does not report the original MIME type, so framing is a fixed
/// text/plain default rather than a guess.
pub async fn get_content(
    State(ctx): State<AppContext>,
    Path(content_id): Path<String>,
) -> GatewayResult<Response> {
    if !is_plausible_content_id(&content_id) {
        return Err(GatewayError::NotFound(content_id));
    }

    let stream = match ctx.store.cat(&content_id).await {
        Ok(stream) => stream,
        Err(e) => {
            metrics::RETRIEVALS_TOTAL.with_label_values(&["error"]).inc();
            return Err(e);
        }
    };
    metrics::RETRIEVALS_TOTAL.with_label_values(&["ok"]).inc();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.txt\"", content_id),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| GatewayError::Internal(format!("Failed to build response: {}", e)))
}

/// Cheap syntactic gate; real resolution is the store's job
fn is_plausible_content_id(content_id: &str) -> bool {
    !content_id.is_empty() && content_id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_content_ids() {
        assert!(is_plausible_content_id(
            "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG"
        ));
        assert!(is_plausible_content_id(
            "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi"
        ));
    }

    #[test]
    fn test_malformed_content_ids() {
        assert!(!is_plausible_content_id(""));
        assert!(!is_plausible_content_id("not-a-cid"));
        assert!(!is_plausible_content_id("../etc/passwd"));
        assert!(!is_plausible_content_id("Qm abc"));
    }
}
