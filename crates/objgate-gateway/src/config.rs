//! Gateway configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Backing store selection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// In-memory store (data lost on restart)
    Memory,
    /// Local directory store
    Directory(PathBuf),
}

/// Gateway server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Bearer token required on every request; `None` leaves the gateway open
    #[serde(skip_serializing)]
    pub auth_token: Option<String>,
    /// Backing store
    pub store: StoreBackend,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable CORS
    pub cors_enabled: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8787,
            auth_token: None,
            store: StoreBackend::Memory,
            max_body_size: 5 * 1024 * 1024 * 1024, // 5 GB
            cors_enabled: false,
        }
    }
}

impl GatewayConfig {
    /// Get the bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Set the auth token; an empty secret leaves the gateway open
    pub fn with_auth_token(mut self, token: Option<String>) -> Self {
        self.auth_token = token.filter(|t| !t.is_empty());
        self
    }

    /// Whether requests must carry a bearer token
    pub fn auth_enabled(&self) -> bool {
        self.auth_token.is_some()
    }
}
