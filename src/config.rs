/// Configuration management for the gateway
use crate::error::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub service: ServiceConfig,
    pub store: StoreConfig,
    pub upload: UploadConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
}

/// Content store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// HTTP API endpoint of the IPFS-compatible node
    pub api_url: String,
    /// Public read gateway used to derive download URLs
    pub gateway_url: String,
    /// Per-operation timeout in seconds
    pub timeout_secs: u64,
    /// Maximum concurrent in-flight store operations
    pub max_concurrency: usize,
}

/// Upload handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Maximum accepted upload size in bytes
    pub max_size: usize,
}

impl GatewayConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> GatewayResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("GATEWAY_HOSTNAME").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("GATEWAY_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse()
            .map_err(|_| GatewayError::Config("Invalid port number".to_string()))?;

        let api_url = env::var("IPFS_API_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5001".to_string())
            .trim_end_matches('/')
            .to_string();
        let gateway_url = env::var("IPFS_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = env::var("GATEWAY_STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()
            .unwrap_or(30);
        let max_concurrency = env::var("GATEWAY_STORE_MAX_CONCURRENCY")
            .unwrap_or_else(|_| "32".to_string())
            .parse()
            .unwrap_or(32);

        let max_size = env::var("GATEWAY_UPLOAD_LIMIT")
            .unwrap_or_else(|_| "52428800".to_string()) // 50 MiB
            .parse()
            .unwrap_or(52_428_800);

        Ok(GatewayConfig {
            service: ServiceConfig { hostname, port },
            store: StoreConfig {
                api_url,
                gateway_url,
                timeout_secs,
                max_concurrency,
            },
            upload: UploadConfig { max_size },
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> GatewayResult<()> {
        if self.service.hostname.is_empty() {
            return Err(GatewayError::Config("Hostname cannot be empty".to_string()));
        }

        for (name, url) in [
            ("IPFS_API_URL", &self.store.api_url),
            ("IPFS_GATEWAY_URL", &self.store.gateway_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(GatewayError::Config(format!(
                    "{} must be an http(s) URL, got {:?}",
                    name, url
                )));
            }
        }

        if !(1..=300).contains(&self.store.timeout_secs) {
            return Err(GatewayError::Config(
                "Store timeout must be between 1 and 300 seconds".to_string(),
            ));
        }

        if self.store.max_concurrency == 0 {
            return Err(GatewayError::Config(
                "Store concurrency limit must be at least 1".to_string(),
            ));
        }

        if self.upload.max_size == 0 {
            return Err(GatewayError::Config(
                "Upload size limit must be at least 1 byte".to_string(),
            ));
        }

        Ok(())
    }

    /// Per-operation store timeout
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store.timeout_secs)
    }
}
