/// Upload endpoint: multipart file in, content descriptor out
use crate::{
    context::AppContext,
    error::{GatewayError, GatewayResult},
    metrics,
};
use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Descriptor returned on successful upload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    /// Content identifier derived by the store
    pub hash: String,
    pub name: String,
    /// Uploaded byte count, not the store's block size
    pub size: u64,
    /// Read URL through the public gateway
    pub ipfs_url: String,
    /// Read URL against the store API directly
    pub api_url: String,
}

/// Placeholder listing; the gateway keeps no file index
pub async fn list_files() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "File listing requires a durable index",
        "note": "Use /upload to add files and /{contentId} to retrieve them"
    }))
}

/// Accept one file and forward it to the content store
pub async fn upload_file(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> GatewayResult<Json<UploadResponse>> {
    let (name, mime_type, data) =
        extract_file(&mut multipart, ctx.config.upload.max_size).await?;

    let size = data.len() as u64;
    let added = match ctx.store.add(data, &name, &mime_type).await {
        Ok(added) => added,
        Err(e) => {
            metrics::UPLOADS_TOTAL.with_label_values(&["error"]).inc();
            return Err(e);
        }
    };

    metrics::UPLOADS_TOTAL.with_label_values(&["ok"]).inc();
    tracing::info!(hash = %added.hash, size, "Uploaded {} to content store", name);

    Ok(Json(UploadResponse {
        success: true,
        ipfs_url: format!("{}/ipfs/{}", ctx.config.store.gateway_url, added.hash),
        api_url: format!("{}/api/v0/cat?arg={}", ctx.config.store.api_url, added.hash),
        hash: added.hash,
        name,
        size,
    }))
}

/// Pull exactly one `file` field out of the multipart body
///
/// Other fields are ignored; a second `file` field is an error rather than
/// a silent overwrite.
async fn extract_file(
    multipart: &mut Multipart,
    limit: usize,
) -> GatewayResult<(String, String, Bytes)> {
    let mut file: Option<(String, String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(e, limit))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(GatewayError::InvalidUpload(
                "Request contains more than one file field".to_string(),
            ));
        }

        let name = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| map_multipart_error(e, limit))?;

        file = Some((name, mime_type, data));
    }

    file.ok_or(GatewayError::MissingFile)
}

fn map_multipart_error(err: MultipartError, limit: usize) -> GatewayError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge { limit }
    } else {
        GatewayError::InvalidUpload(err.body_text())
    }
}
