//! # objgate Store
//!
//! Object storage abstraction consumed by the objgate gateway.
//!
//! This crate provides:
//! - **ObjectStore trait**: put / get / delete with conditional and range options
//! - **Conditional evaluation**: RFC 9110 precondition checks (strong ETag comparison)
//! - **Byte ranges**: single-range `bytes=` parsing and resolution
//! - **Backends**: in-memory store and a local directory store
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              HTTP Gateway               │
//! ├─────────────────────────────────────────┤
//! │           ObjectStore Trait             │
//! ├────────────────────┬────────────────────┤
//! │  MemoryObjectStore │   FsObjectStore    │
//! ├────────────────────┴────────────────────┤
//! │   conditional::ConditionalPredicate     │
//! │   range::RangeSpec                      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use objgate_store::{MemoryObjectStore, ObjectStore, PutOptions, GetOptions, body};
//!
//! let store = MemoryObjectStore::new();
//! store.put("mixes/set.mp3", body::once(data), PutOptions::default()).await?;
//! let outcome = store.get("mixes/set.mp3", GetOptions::default()).await?;
//! ```

pub mod body;
pub mod conditional;
pub mod error;
pub mod fs;
pub mod memory;
pub mod metadata;
pub mod range;

pub use body::ByteStream;
pub use conditional::{ConditionalPredicate, EntityTag, Operation};
pub use error::{Result, StoreError};
pub use fs::FsObjectStore;
pub use memory::MemoryObjectStore;
pub use metadata::{HttpMetadata, ObjectMetadata};
pub use range::{ByteRange, RangeSpec};

use async_trait::async_trait;
use std::collections::BTreeMap;

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 1024;

/// Options applied to a write
#[derive(Clone, Debug, Default)]
pub struct PutOptions {
    /// Preconditions the current object must satisfy before it is replaced
    pub conditions: ConditionalPredicate,
    /// HTTP metadata stored alongside the object
    pub http_metadata: HttpMetadata,
    /// Custom metadata stored alongside the object
    pub custom_metadata: BTreeMap<String, String>,
}

/// Options applied to a read
#[derive(Clone, Debug, Default)]
pub struct GetOptions {
    /// Preconditions the current object must satisfy for the body to be returned
    pub conditions: ConditionalPredicate,
    /// Raw `Range` header value, evaluated only after preconditions pass
    pub range: Option<String>,
}

/// Result of a write
#[derive(Debug)]
pub enum PutOutcome {
    /// Object was written
    Stored(ObjectMetadata),
    /// Preconditions rejected the write; nothing was stored
    PreconditionFailed,
}

/// Result of a read against an existing object
pub enum GetOutcome {
    /// Preconditions passed; body holds the whole object or the honored range
    Found {
        metadata: ObjectMetadata,
        body: ByteStream,
        range: Option<ByteRange>,
    },
    /// Object exists but the preconditions rejected it
    PreconditionFailed { metadata: ObjectMetadata },
}

impl GetOutcome {
    /// Metadata of the current object, present in both cases
    pub fn metadata(&self) -> &ObjectMetadata {
        match self {
            Self::Found { metadata, .. } | Self::PreconditionFailed { metadata } => metadata,
        }
    }
}

impl std::fmt::Debug for GetOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Found { metadata, range, .. } => f
                .debug_struct("Found")
                .field("metadata", metadata)
                .field("range", range)
                .finish_non_exhaustive(),
            Self::PreconditionFailed { metadata } => f
                .debug_struct("PreconditionFailed")
                .field("metadata", metadata)
                .finish(),
        }
    }
}

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `body` under `key` if the preconditions in `options` hold
    async fn put(&self, key: &str, body: ByteStream, options: PutOptions) -> Result<PutOutcome>;

    /// Read `key`; `None` when no object exists
    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<GetOutcome>>;

    /// Remove `key`; succeeds whether or not it existed
    async fn delete(&self, key: &str) -> Result<()>;

    /// Whether objects survive a restart
    fn is_persistent(&self) -> bool {
        false
    }
}

/// Reject keys no backend can hold
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::InvalidKey(format!(
            "key is {} bytes, maximum is {}",
            key.len(),
            MAX_KEY_LEN
        )));
    }
    Ok(())
}
