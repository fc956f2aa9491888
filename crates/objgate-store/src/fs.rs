//! Local directory object store
//!
//! Layout under the root directory:
//!
//! ```text
//! root/
//! ├── objects/<hex key segments>/k<last segment>.data
//! ├── objects/<hex key segments>/k<last segment>.meta.json
//! └── tmp/<random>
//! ```
//!
//! Keys are hex encoded, so no key can escape the root. Long keys are split
//! into directory segments to stay under file name limits.
//!
//! Uploads spool into `tmp/` behind a [`TempPath`] that deletes the file when
//! dropped, so a cancelled `put` leaves nothing behind. Anything left in
//! `tmp/` by a previous process is cleared on [`FsObjectStore::open`].

use crate::body::{ByteStream, EtagHasher, DEFAULT_READ_CHUNK};
use crate::conditional::Operation;
use crate::range::RangeSpec;
use crate::{
    validate_key, GetOptions, GetOutcome, ObjectMetadata, ObjectStore, PutOptions, PutOutcome,
    Result, StoreError,
};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::{NamedTempFile, TempPath};
use tokio::fs::{self, File};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Number of lock stripes serializing writers per key
const LOCK_STRIPES: usize = 64;

/// Hex characters per path segment
const SEGMENT_LEN: usize = 200;

struct ObjectPaths {
    data: PathBuf,
    meta: PathBuf,
}

/// Object store backed by a local directory
#[derive(Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    locks: Arc<Vec<Mutex<()>>>,
    read_chunk: usize,
}

impl FsObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    ///
    /// Clears `tmp/`, so a root must not be shared by two live stores.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("objects")).await?;
        fs::create_dir_all(root.join("tmp")).await?;

        let cleared = clear_dir(&root.join("tmp")).await?;
        if cleared > 0 {
            warn!(root = %root.display(), cleared, "removed stale temp files");
        }

        debug!(root = %root.display(), "opened directory store");

        Ok(Self {
            root,
            locks: Arc::new((0..LOCK_STRIPES).map(|_| Mutex::new(())).collect()),
            read_chunk: DEFAULT_READ_CHUNK,
        })
    }

    /// Set the chunk size used when streaming bodies out
    pub fn with_read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk.max(1);
        self
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn paths(&self, key: &str) -> ObjectPaths {
        let encoded = hex::encode(key.as_bytes());
        let segments: Vec<&str> = (0..encoded.len())
            .step_by(SEGMENT_LEN)
            .map(|start| &encoded[start..(start + SEGMENT_LEN).min(encoded.len())])
            .collect();

        let mut dir = self.root.join("objects");
        let last = match segments.split_last() {
            Some((last, parents)) => {
                for segment in parents {
                    dir.push(segment);
                }
                *last
            }
            None => "",
        };

        ObjectPaths {
            data: dir.join(format!("k{last}.data")),
            meta: dir.join(format!("k{last}.meta.json")),
        }
    }

    fn stripe(&self, key: &str) -> &Mutex<()> {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        &self.locks[(hasher.finish() as usize) % self.locks.len()]
    }

    /// Fresh file under `tmp/`, deleted on drop unless persisted
    fn temp_file(&self) -> Result<(File, TempPath)> {
        let (file, path) = NamedTempFile::new_in(self.root.join("tmp"))?.into_parts();
        Ok((File::from_std(file), path))
    }

    async fn read_metadata(path: &Path) -> Result<Option<ObjectMetadata>> {
        match fs::read(path).await {
            Ok(raw) => Ok(Some(serde_json::from_slice(&raw)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Stream the body into a fresh temp file, returning its path, size and ETag.
    ///
    /// The file is removed when the returned [`TempPath`] is dropped, including
    /// when this future is dropped mid-body.
    async fn spool(&self, mut body: ByteStream) -> Result<(TempPath, u64, String)> {
        let (mut file, path) = self.temp_file()?;
        let mut hasher = EtagHasher::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
        }
        file.sync_all().await?;
        Ok((path, hasher.len(), hasher.finalize()))
    }

    async fn commit(&self, spooled: TempPath, paths: &ObjectPaths, metadata: &ObjectMetadata) -> Result<()> {
        if let Some(parent) = paths.data.parent() {
            fs::create_dir_all(parent).await?;
        }

        let (mut meta_file, meta_tmp) = self.temp_file()?;
        meta_file.write_all(&serde_json::to_vec(metadata)?).await?;
        meta_file.sync_all().await?;

        spooled.persist(&paths.data).map_err(|e| e.error)?;
        meta_tmp.persist(&paths.meta).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(&self, key: &str, body: ByteStream, options: PutOptions) -> Result<PutOutcome> {
        validate_key(key)?;
        let paths = self.paths(key);

        // Fail fast before spooling the body; the check is repeated under the lock.
        if !options.conditions.is_empty() {
            let current = Self::read_metadata(&paths.meta).await?;
            if !options.conditions.evaluate(current.as_ref(), Operation::Write) {
                debug!(key, "put rejected by preconditions");
                return Ok(PutOutcome::PreconditionFailed);
            }
        }

        let (spooled, size, etag) = self.spool(body).await?;
        let metadata = ObjectMetadata::new(key, size, etag)
            .with_http(options.http_metadata)
            .with_custom(options.custom_metadata);

        let _guard = self.stripe(key).lock().await;

        let current = Self::read_metadata(&paths.meta).await?;
        if !options.conditions.evaluate(current.as_ref(), Operation::Write) {
            debug!(key, "put rejected by preconditions at commit");
            return Ok(PutOutcome::PreconditionFailed);
        }

        self.commit(spooled, &paths, &metadata).await?;

        debug!(key, size, etag = %metadata.etag, "stored object");
        Ok(PutOutcome::Stored(metadata))
    }

    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<GetOutcome>> {
        validate_key(key)?;
        let paths = self.paths(key);

        let (metadata, file, range) = {
            let _guard = self.stripe(key).lock().await;

            let Some(metadata) = Self::read_metadata(&paths.meta).await? else {
                return Ok(None);
            };

            if !options.conditions.evaluate(Some(&metadata), Operation::Read) {
                return Ok(Some(GetOutcome::PreconditionFailed { metadata }));
            }

            let range = options
                .range
                .as_deref()
                .and_then(RangeSpec::parse)
                .map(|spec| spec.resolve(metadata.size))
                .transpose()?;

            let file = File::open(&paths.data).await.map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    StoreError::Backend(format!("data file missing for key {key}"))
                } else {
                    e.into()
                }
            })?;

            (metadata, file, range)
        };

        let (start, len) = match &range {
            Some(r) => (r.start, r.len()),
            None => (0, metadata.size),
        };

        Ok(Some(GetOutcome::Found {
            body: read_stream(file, start, len, self.read_chunk),
            metadata,
            range,
        }))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        let paths = self.paths(key);

        let _guard = self.stripe(key).lock().await;
        for path in [&paths.meta, &paths.data] {
            match fs::remove_file(path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        true
    }
}

/// Stream `len` bytes of `file` starting at `start`
fn read_stream(file: File, start: u64, len: u64, chunk: usize) -> ByteStream {
    struct ReadState {
        file: File,
        remaining: u64,
        seeked: bool,
    }

    let state = ReadState {
        file,
        remaining: len,
        seeked: start == 0,
    };

    stream::try_unfold(state, move |mut state| async move {
        if state.remaining == 0 {
            return Ok::<_, StoreError>(None);
        }
        if !state.seeked {
            state.file.seek(SeekFrom::Start(start)).await?;
            state.seeked = true;
        }

        let want = chunk.min(state.remaining as usize);
        let mut buf = vec![0u8; want];
        let read = state.file.read(&mut buf).await?;
        if read == 0 {
            return Err(StoreError::Backend(format!(
                "object truncated, {} bytes missing",
                state.remaining
            )));
        }
        buf.truncate(read);
        state.remaining -= read as u64;
        Ok(Some((Bytes::from(buf), state)))
    })
    .boxed()
}

/// Remove every file in `dir`, returning how many were removed
async fn clear_dir(dir: &Path) -> Result<usize> {
    let mut removed = 0;
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body, ConditionalPredicate, HttpMetadata};
    use std::time::Duration;

    async fn open_store() -> (tempfile::TempDir, FsObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::open(dir.path()).await.unwrap().with_read_chunk(3);
        (dir, store)
    }

    async fn read_all(outcome: GetOutcome) -> Bytes {
        match outcome {
            GetOutcome::Found { body, .. } => body::collect(body).await.unwrap().0,
            GetOutcome::PreconditionFailed { .. } => panic!("expected body"),
        }
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let (_dir, store) = open_store().await;
        let options = PutOptions {
            http_metadata: HttpMetadata::default().with_content_type("audio/mpeg"),
            ..Default::default()
        };
        let outcome = store
            .put("audio/set 1.mp3", body::chunked(Bytes::from_static(b"abcdefghij"), 4), options)
            .await
            .unwrap();
        let PutOutcome::Stored(meta) = outcome else {
            panic!("unconditional put rejected");
        };
        assert_eq!(meta.size, 10);

        let found = store
            .get("audio/set 1.mp3", GetOptions::default())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.metadata().http.content_type.as_deref(), Some("audio/mpeg"));
        assert_eq!(read_all(found).await, Bytes::from_static(b"abcdefghij"));
    }

    #[tokio::test]
    async fn test_fs_store_survives_reopen() {
        let (dir, store) = open_store().await;
        store.put("k", body::once("persisted"), PutOptions::default()).await.unwrap();
        drop(store);

        let reopened = FsObjectStore::open(dir.path()).await.unwrap();
        assert!(reopened.is_persistent());
        let found = reopened.get("k", GetOptions::default()).await.unwrap().unwrap();
        assert_eq!(read_all(found).await, Bytes::from_static(b"persisted"));
    }

    #[tokio::test]
    async fn test_fs_store_range_read() {
        let (_dir, store) = open_store().await;
        store.put("k", body::once("0123456789"), PutOptions::default()).await.unwrap();

        let options = GetOptions {
            range: Some("bytes=-4".to_string()),
            ..Default::default()
        };
        let found = store.get("k", options).await.unwrap().unwrap();
        assert_eq!(read_all(found).await, Bytes::from_static(b"6789"));
    }

    #[tokio::test]
    async fn test_fs_store_precondition_failed_keeps_object() {
        let (_dir, store) = open_store().await;
        store.put("k", body::once("v1"), PutOptions::default()).await.unwrap();

        let options = PutOptions {
            conditions: ConditionalPredicate::new().with_if_none_match("*"),
            ..Default::default()
        };
        let outcome = store.put("k", body::once("v2"), options).await.unwrap();
        assert!(matches!(outcome, PutOutcome::PreconditionFailed));
        assert_eq!(temp_entries(&store).await, 0);

        let found = store.get("k", GetOptions::default()).await.unwrap().unwrap();
        assert_eq!(read_all(found).await, Bytes::from_static(b"v1"));
    }

    #[tokio::test]
    async fn test_fs_store_long_and_empty_keys() {
        let (_dir, store) = open_store().await;
        let long_key = "x".repeat(300);

        store.put(&long_key, body::once("long"), PutOptions::default()).await.unwrap();
        store.put("", body::once("empty"), PutOptions::default()).await.unwrap();

        let long = store.get(&long_key, GetOptions::default()).await.unwrap().unwrap();
        assert_eq!(read_all(long).await, Bytes::from_static(b"long"));
        let empty = store.get("", GetOptions::default()).await.unwrap().unwrap();
        assert_eq!(read_all(empty).await, Bytes::from_static(b"empty"));
    }

    #[tokio::test]
    async fn test_fs_store_delete() {
        let (_dir, store) = open_store().await;
        store.put("../escape", body::once("x"), PutOptions::default()).await.unwrap();

        store.delete("../escape").await.unwrap();
        store.delete("../escape").await.unwrap();
        assert!(store.get("../escape", GetOptions::default()).await.unwrap().is_none());
    }

    async fn temp_entries(store: &FsObjectStore) -> usize {
        let mut entries = fs::read_dir(store.root().join("tmp")).await.unwrap();
        let mut count = 0;
        while entries.next_entry().await.unwrap().is_some() {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn test_fs_store_cancelled_put_leaves_no_temp() {
        let (_dir, store) = open_store().await;
        let stalled: ByteStream = body::once("partial").chain(stream::pending()).boxed();

        let put = store.put("k", stalled, PutOptions::default());
        let result = tokio::time::timeout(Duration::from_millis(200), put).await;

        assert!(result.is_err());
        assert_eq!(temp_entries(&store).await, 0);
        assert!(store.get("k", GetOptions::default()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_store_open_clears_stale_temp() {
        let (dir, store) = open_store().await;
        std::fs::write(dir.path().join("tmp").join("left-over"), b"half an upload").unwrap();
        store.put("k", body::once("kept"), PutOptions::default()).await.unwrap();
        drop(store);

        let reopened = FsObjectStore::open(dir.path()).await.unwrap();
        assert_eq!(temp_entries(&reopened).await, 0);
        let found = reopened.get("k", GetOptions::default()).await.unwrap().unwrap();
        assert_eq!(read_all(found).await, Bytes::from_static(b"kept"));
    }

    #[tokio::test]
    async fn test_fs_store_failed_upload_leaves_no_temp() {
        let (_dir, store) = open_store().await;
        let failing: ByteStream = stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(StoreError::Backend("client disconnected".into())),
        ])
        .boxed();

        assert!(store.put("k", failing, PutOptions::default()).await.is_err());
        assert!(store.get("k", GetOptions::default()).await.unwrap().is_none());
        assert_eq!(temp_entries(&store).await, 0);
    }
}
