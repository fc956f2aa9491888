//! Streaming object bodies and ETag computation

use crate::Result;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use md5::{Digest, Md5};

/// A stream of body chunks flowing into or out of a store
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Chunk size used when streaming stored bytes back out (64 KB)
pub const DEFAULT_READ_CHUNK: usize = 64 * 1024;

/// Wrap a single buffer as a body stream
pub fn once(data: impl Into<Bytes>) -> ByteStream {
    let data = data.into();
    stream::once(async move { Ok(data) }).boxed()
}

/// An empty body stream
pub fn empty() -> ByteStream {
    stream::empty().boxed()
}

/// Split a buffer into `chunk_size` pieces without copying
pub fn chunked(data: Bytes, chunk_size: usize) -> ByteStream {
    let chunk_size = chunk_size.max(1);
    let chunks: Vec<Bytes> = (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect();
    stream::iter(chunks.into_iter().map(Ok)).boxed()
}

/// Incremental MD5 ETag computation over body chunks
#[derive(Default)]
pub struct EtagHasher {
    hasher: Md5,
    len: u64,
}

impl EtagHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, chunk: &[u8]) {
        self.hasher.update(chunk);
        self.len += chunk.len() as u64;
    }

    /// Bytes seen so far
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Lowercase hex digest, unquoted
    pub fn finalize(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// ETag (unquoted hex MD5) of a complete buffer
pub fn etag_of(data: &[u8]) -> String {
    let mut hasher = EtagHasher::new();
    hasher.update(data);
    hasher.finalize()
}

/// Drain a body stream into memory, returning the bytes and their ETag
pub async fn collect(mut body: ByteStream) -> Result<(Bytes, String)> {
    let mut buf = BytesMut::new();
    let mut hasher = EtagHasher::new();
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        hasher.update(&chunk);
        buf.extend_from_slice(&chunk);
    }
    Ok((buf.freeze(), hasher.finalize()))
}
