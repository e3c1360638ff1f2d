/// HTTP API adapter for an IPFS-compatible node
///
/// Talks to the node's `/api/v0` endpoints over a pooled reqwest client.
/// Every operation first takes a slot from a fixed-size semaphore; for
/// retrievals the slot is held until the response stream is dropped, so a
/// disconnecting client releases its capacity immediately.
use crate::{
    error::{GatewayError, GatewayResult},
    metrics,
    store::{AddedContent, ContentStore, ContentStream, StoreVersion},
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use reqwest::{multipart, StatusCode};
use serde::Deserialize;
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;

/// Wire shape of the node's add response
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Name", default)]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
}

/// Wire shape of the node's error body
#[derive(Debug, Deserialize)]
struct NodeError {
    #[serde(rename = "Message")]
    message: String,
}

/// Content store adapter for the IPFS HTTP API
pub struct IpfsApiStore {
    http: reqwest::Client,
    api_url: String,
    timeout: Duration,
    slots: Arc<Semaphore>,
}

impl IpfsApiStore {
    /// Create an adapter for the node at `api_url`
    pub fn new(api_url: &str, op_timeout: Duration, max_concurrency: usize) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(op_timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            timeout: op_timeout,
            slots: Arc::new(Semaphore::new(max_concurrency.max(1))),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Take a slot from the bounded operation pool
    async fn acquire_slot(&self) -> GatewayResult<OwnedSemaphorePermit> {
        Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| GatewayError::Internal("Store operation pool closed".to_string()))
    }

    fn map_transport(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.timeout.as_secs())
        } else {
            GatewayError::StoreUnavailable(err.to_string())
        }
    }
}

/// Extract the node's diagnostic message from an error body
fn node_message(body: &str) -> String {
    serde_json::from_str::<NodeError>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Diagnostics the node emits for identifiers it cannot resolve
fn looks_unknown(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    [
        "invalid path",
        "invalid cid",
        "not found",
        "could not resolve",
        "no link named",
    ]
    .iter()
    .any(|needle| message.contains(needle))
}

/// Map a non-success retrieval status to the error taxonomy
fn map_retrieval_error(content_id: &str, status: StatusCode, body: &str) -> GatewayError {
    let message = node_message(body);
    if status.is_client_error() || looks_unknown(&message) {
        GatewayError::NotFound(content_id.to_string())
    } else {
        GatewayError::StoreRejected(message)
    }
}

#[async_trait]
impl ContentStore for IpfsApiStore {
    async fn add(
        &self,
        data: Bytes,
        filename: &str,
        mime_type: &str,
    ) -> GatewayResult<AddedContent> {
        let size = data.len() as u64;
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(filename.to_string())
            .mime_str(mime_type)
            .map_err(|e| GatewayError::InvalidUpload(format!("Unparseable MIME type: {}", e)))?;
        let form = multipart::Form::new().part("file", part);

        let _slot = self.acquire_slot().await?;
        metrics::STORE_OPS_TOTAL.with_label_values(&["add"]).inc();
        let timer = metrics::STORE_OP_DURATION_SECONDS
            .with_label_values(&["add"])
            .start_timer();

        let request = async {
            let response = self
                .http
                .post(self.endpoint("/api/v0/add"))
                .query(&[("pin", "true")])
                .multipart(form)
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::StoreRejected(node_message(&body)));
            }

            response
                .json::<AddResponse>()
                .await
                .map_err(|e| self.map_transport(e))
        };

        let outcome = timeout(self.timeout, request).await;
        timer.observe_duration();

        let added = match outcome {
            Err(_) => {
                metrics::STORE_ERRORS_TOTAL.with_label_values(&["add"]).inc();
                tracing::error!(
                    operation = "add",
                    filename,
                    "Content store did not respond within {:?}",
                    self.timeout
                );
                return Err(GatewayError::Timeout(self.timeout.as_secs()));
            }
            Ok(Err(e)) => {
                metrics::STORE_ERRORS_TOTAL.with_label_values(&["add"]).inc();
                tracing::error!(operation = "add", filename, error = %e, "Content store add failed");
                return Err(e);
            }
            Ok(Ok(added)) => added,
        };

        Ok(AddedContent {
            name: if added.name.is_empty() {
                filename.to_string()
            } else {
                added.name
            },
            hash: added.hash,
            size,
        })
    }

    async fn cat(&self, content_id: &str) -> GatewayResult<ContentStream> {
        let slot = self.acquire_slot().await?;
        metrics::STORE_OPS_TOTAL.with_label_values(&["cat"]).inc();
        let timer = metrics::STORE_OP_DURATION_SECONDS
            .with_label_values(&["cat"])
            .start_timer();

        let request = async {
            let response = self
                .http
                .post(self.endpoint("/api/v0/cat"))
                .query(&[("arg", content_id)])
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(map_retrieval_error(content_id, status, &body));
            }

            Ok(response)
        };

        let outcome = timeout(self.timeout, request).await;
        timer.observe_duration();

        let response = match outcome {
            Err(_) => {
                metrics::STORE_ERRORS_TOTAL.with_label_values(&["cat"]).inc();
                tracing::error!(
                    operation = "cat",
                    content_id,
                    "Content store did not respond within {:?}",
                    self.timeout
                );
                return Err(GatewayError::Timeout(self.timeout.as_secs()));
            }
            Ok(Err(e)) => {
                metrics::STORE_ERRORS_TOTAL.with_label_values(&["cat"]).inc();
                tracing::error!(operation = "cat", content_id, error = %e, "Content store retrieval failed");
                return Err(e);
            }
            Ok(Ok(response)) => response,
        };

        // The slot rides inside the stream; dropping the stream (completion
        // or client disconnect) closes the connection and frees the slot.
        let stream = response
            .bytes_stream()
            .map(move |chunk| {
                let _slot = &slot;
                chunk.map_err(std::io::Error::other)
            })
            .boxed();

        Ok(stream)
    }

    async fn version(&self) -> GatewayResult<StoreVersion> {
        let _slot = self.acquire_slot().await?;
        metrics::STORE_OPS_TOTAL.with_label_values(&["version"]).inc();

        let request = async {
            let response = self
                .http
                .post(self.endpoint("/api/v0/version"))
                .send()
                .await
                .map_err(|e| self.map_transport(e))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GatewayError::StoreRejected(node_message(&body)));
            }

            response
                .json::<StoreVersion>()
                .await
                .map_err(|e| self.map_transport(e))
        };

        match timeout(self.timeout, request).await {
            Err(_) => {
                metrics::STORE_ERRORS_TOTAL
                    .with_label_values(&["version"])
                    .inc();
                Err(GatewayError::Timeout(self.timeout.as_secs()))
            }
            Ok(Err(e)) => {
                metrics::STORE_ERRORS_TOTAL
                    .with_label_values(&["version"])
                    .inc();
                tracing::warn!(operation = "version", error = %e, "Content store probe failed");
                Err(e)
            }
            Ok(Ok(version)) => Ok(version),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn store_for(server: &MockServer) -> IpfsApiStore {
        IpfsApiStore::new(&server.uri(), Duration::from_secs(5), 4).unwrap()
    }

    async fn collect(mut stream: ContentStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_add_returns_store_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/add"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Name": "note.txt",
                "Hash": "QmTest123",
                "Size": "18"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let added = store
            .add(Bytes::from_static(b"hello world"), "note.txt", "text/plain")
            .await
            .unwrap();

        assert_eq!(added.hash, "QmTest123");
        assert_eq!(added.name, "note.txt");
        assert_eq!(added.size, 11);
    }

    #[tokio::test]
    async fn test_add_rejected_by_store() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/add"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "Message": "disk quota exhausted",
                "Code": 0,
                "Type": "error"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store
            .add(Bytes::from_static(b"data"), "note.txt", "text/plain")
            .await
            .unwrap_err();

        match err {
            GatewayError::StoreRejected(msg) => assert!(msg.contains("disk quota")),
            other => panic!("expected StoreRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cat_streams_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"0123456789".to_vec()))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let stream = store.cat("QmTest123").await.unwrap();
        assert_eq!(collect(stream).await, b"0123456789");
    }

    #[tokio::test]
    async fn test_cat_unknown_identifier_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "Message": "invalid path \"QmBogus\": selected encoding not supported",
                "Code": 0,
                "Type": "error"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let err = store.cat("QmBogus").await.map(|_| ()).unwrap_err();

        match err {
            GatewayError::NotFound(id) => assert_eq!(id, "QmBogus"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cat_client_status_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let store = store_for(&server);
        assert!(matches!(
            store.cat("QmGone").await.map(|_| ()).unwrap_err(),
            GatewayError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_cat_server_error_maps_to_store_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "Message": "merkledag node corrupt",
                "Code": 0,
                "Type": "error"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        match store.cat("QmCorrupt").await.map(|_| ()).unwrap_err() {
            GatewayError::StoreRejected(msg) => assert!(msg.contains("corrupt")),
            other => panic!("expected StoreRejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_store_maps_to_unavailable() {
        // Nothing listens on port 1
        let store = IpfsApiStore::new("http://127.0.0.1:1", Duration::from_secs(2), 4).unwrap();
        let err = store.cat("QmAnything").await.map(|_| ()).unwrap_err();
        assert!(matches!(
            err,
            GatewayError::StoreUnavailable(_) | GatewayError::Timeout(_)
        ));
    }

    #[tokio::test]
    async fn test_slow_store_times_out_within_bound() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let store = IpfsApiStore::new(&server.uri(), Duration::from_millis(200), 4).unwrap();

        let start = std::time::Instant::now();
        let err = store.cat("QmSlow").await.map(|_| ()).unwrap_err();
        assert!(matches!(err, GatewayError::Timeout(_)));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_slot_released_when_stream_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/cat"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"chunk".to_vec()))
            .mount(&server)
            .await;

        // Single slot: the second call can only proceed once the first
        // stream has been dropped.
        let store = IpfsApiStore::new(&server.uri(), Duration::from_secs(5), 1).unwrap();

        let first = store.cat("QmOne").await.unwrap();
        drop(first);

        let second = store.cat("QmTwo").await.unwrap();
        assert_eq!(collect(second).await, b"chunk");
    }

    #[tokio::test]
    async fn test_version_reports_node_version() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v0/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Version": "0.29.0",
                "Commit": "abc1234"
            })))
            .mount(&server)
            .await;

        let store = store_for(&server);
        let version = store.version().await.unwrap();
        assert_eq!(version.version, "0.29.0");
        assert_eq!(version.commit, "abc1234");
    }

    #[test]
    fn test_node_message_prefers_json_diagnostic() {
        assert_eq!(
            node_message(r#"{"Message":"invalid path","Code":0,"Type":"error"}"#),
            "invalid path"
        );
        assert_eq!(node_message("plain text failure\n"), "plain text failure");
    }

    #[test]
    fn test_looks_unknown_matches_resolver_diagnostics() {
        assert!(looks_unknown("invalid path \"xyz\""));
        assert!(looks_unknown("merkledag: not found"));
        assert!(looks_unknown("could not resolve name"));
        assert!(!looks_unknown("disk quota exhausted"));
    }
}
