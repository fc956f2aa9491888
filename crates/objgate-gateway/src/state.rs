//! Application state

use crate::auth::AuthToken;
use crate::config::{GatewayConfig, StoreBackend};
use objgate_store::{FsObjectStore, MemoryObjectStore, ObjectStore};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
pub struct AppState {
    /// Gateway configuration
    pub config: GatewayConfig,
    /// Backing object store
    pub store: Arc<dyn ObjectStore>,
    /// Bearer secret captured at construction
    pub auth_token: Option<AuthToken>,
}

impl AppState {
    /// Create application state, opening the configured store
    pub async fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn ObjectStore> = match &config.store {
            StoreBackend::Memory => {
                info!("Using in-memory object store (data will not persist)");
                Arc::new(MemoryObjectStore::new())
            }
            StoreBackend::Directory(root) => {
                let store = FsObjectStore::open(root).await?;
                info!("Using directory object store at {}", root.display());
                Arc::new(store)
            }
        };

        Ok(Self::with_store(config, store))
    }

    /// Create application state around an existing store handle
    pub fn with_store(config: GatewayConfig, store: Arc<dyn ObjectStore>) -> Self {
        if store.is_persistent() {
            info!("✓ Storage mode: persistent");
        } else {
            warn!("⚠ Storage mode: In-memory (NOT persistent - for development only)");
        }

        let auth_token = config
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(AuthToken::new);

        if auth_token.is_none() {
            warn!("⚠️  No AUTH_TOKEN configured - gateway is open to every client");
        }

        Self {
            config,
            store,
            auth_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_state() {
        let state = AppState::new(GatewayConfig::default()).await.unwrap();
        assert!(!state.store.is_persistent());
        assert!(state.auth_token.is_none());
    }

    #[tokio::test]
    async fn test_directory_state_with_token() {
        let dir = tempfile::tempdir().unwrap();
        let config = GatewayConfig {
            store: StoreBackend::Directory(dir.path().to_path_buf()),
            ..Default::default()
        }
        .with_auth_token(Some("s3cret".into()));

        let state = AppState::new(config).await.unwrap();
        assert!(state.store.is_persistent());
        assert!(state.auth_token.unwrap().verify("s3cret"));
    }
}
