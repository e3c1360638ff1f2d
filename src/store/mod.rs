/// Content Store Client
///
/// Single seam between the gateway and the external content-addressable
/// store. Exactly one transport is implemented: the node's HTTP API
/// (see `ipfs::IpfsApiStore`), configurable by endpoint URL.

pub mod ipfs;

pub use ipfs::IpfsApiStore;

use crate::error::GatewayResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Byte stream handed back by `cat`; chunks are forwarded as they arrive
/// from the store, never buffered whole.
pub type ContentStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Descriptor for content accepted by the store
///
/// The identifier is derived solely from content by the store; the gateway
/// never invents or rewrites it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddedContent {
    pub hash: String,
    pub name: String,
    pub size: u64,
}

/// Version report from the store node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreVersion {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Commit", default)]
    pub commit: String,
}

/// Content store seam
///
/// Implementations talk to an IPFS-compatible node. Operations are bounded
/// by the configured timeout and draw from a fixed-size slot pool.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Send content to the store and return its descriptor
    async fn add(&self, data: Bytes, filename: &str, mime_type: &str)
        -> GatewayResult<AddedContent>;

    /// Retrieve content by identifier as a chunk stream
    async fn cat(&self, content_id: &str) -> GatewayResult<ContentStream>;

    /// Report the store node's version; doubles as the connectivity probe
    async fn version(&self) -> GatewayResult<StoreVersion>;
}
