//! In-memory object store for testing and development

use crate::body::{self, ByteStream, DEFAULT_READ_CHUNK};
use crate::conditional::Operation;
use crate::range::RangeSpec;
use crate::{
    validate_key, GetOptions, GetOutcome, ObjectMetadata, ObjectStore, PutOptions, PutOutcome,
    Result,
};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
struct StoredObject {
    metadata: ObjectMetadata,
    data: Bytes,
}

/// An in-memory object store
#[derive(Clone)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, StoredObject>>,
    read_chunk: usize,
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryObjectStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
            read_chunk: DEFAULT_READ_CHUNK,
        }
    }

    /// Set the chunk size used when streaming bodies out
    pub fn with_read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk.max(1);
        self
    }

    /// Get the number of objects stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Get total size of all objects
    pub fn total_size(&self) -> u64 {
        self.objects.iter().map(|entry| entry.value().metadata.size).sum()
    }

    /// Current metadata for a key, without preconditions
    pub fn metadata(&self, key: &str) -> Option<ObjectMetadata> {
        self.objects.get(key).map(|entry| entry.value().metadata.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, body: ByteStream, options: PutOptions) -> Result<PutOutcome> {
        validate_key(key)?;

        // Fail fast before draining the body; the check is repeated at commit.
        if !options.conditions.is_empty() {
            let current = self.metadata(key);
            if !options.conditions.evaluate(current.as_ref(), Operation::Write) {
                debug!(key, "put rejected by preconditions");
                return Ok(PutOutcome::PreconditionFailed);
            }
        }

        let (data, etag) = body::collect(body).await?;
        let metadata = ObjectMetadata::new(key, data.len() as u64, etag)
            .with_http(options.http_metadata)
            .with_custom(options.custom_metadata);

        let stored = StoredObject {
            metadata: metadata.clone(),
            data,
        };

        match self.objects.entry(key.to_string()) {
            Entry::Occupied(mut entry) => {
                if !options
                    .conditions
                    .evaluate(Some(&entry.get().metadata), Operation::Write)
                {
                    debug!(key, "put rejected by preconditions at commit");
                    return Ok(PutOutcome::PreconditionFailed);
                }
                entry.insert(stored);
            }
            Entry::Vacant(entry) => {
                if !options.conditions.evaluate(None, Operation::Write) {
                    debug!(key, "put rejected by preconditions at commit");
                    return Ok(PutOutcome::PreconditionFailed);
                }
                entry.insert(stored);
            }
        }

        debug!(key, size = metadata.size, etag = %metadata.etag, "stored object");
        Ok(PutOutcome::Stored(metadata))
    }

    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<GetOutcome>> {
        validate_key(key)?;

        let Some(object) = self.objects.get(key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };

        if !options
            .conditions
            .evaluate(Some(&object.metadata), Operation::Read)
        {
            return Ok(Some(GetOutcome::PreconditionFailed {
                metadata: object.metadata,
            }));
        }

        let range = options
            .range
            .as_deref()
            .and_then(RangeSpec::parse)
            .map(|spec| spec.resolve(object.metadata.size))
            .transpose()?;

        let data = match &range {
            Some(r) => object.data.slice(r.start as usize..=r.end as usize),
            None => object.data,
        };

        Ok(Some(GetOutcome::Found {
            metadata: object.metadata,
            body: body::chunked(data, self.read_chunk),
            range,
        }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.objects.remove(key);
        Ok(())
    }
}
