//! Request and response types

use bytes::Bytes;
use std::collections::BTreeMap;

/// Options for an upload
#[derive(Clone, Debug, Default)]
pub struct PutRequest {
    pub content_type: Option<String>,
    pub cache_control: Option<String>,
    /// Only replace the object if its ETag matches
    pub if_match: Option<String>,
    /// `*` makes the upload create-only
    pub if_none_match: Option<String>,
    /// Custom metadata, sent as `x-amz-meta-*`
    pub metadata: BTreeMap<String, String>,
}

impl PutRequest {
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Fail with `PreconditionFailed` if the key already exists
    pub fn create_only(mut self) -> Self {
        self.if_none_match = Some("*".to_string());
        self
    }
}

/// Options for a download
#[derive(Clone, Debug, Default)]
pub struct GetRequest {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
    /// Raw `Range` header, e.g. `bytes=0-1023`
    pub range: Option<String>,
}

impl GetRequest {
    /// Request bytes `start..=end`
    pub fn with_range(mut self, start: u64, end: u64) -> Self {
        self.range = Some(format!("bytes={start}-{end}"));
        self
    }

    pub fn with_if_none_match(mut self, etag: impl Into<String>) -> Self {
        self.if_none_match = Some(etag.into());
        self
    }
}

/// A downloaded object
#[derive(Clone, Debug)]
pub struct GetObjectResult {
    /// 200 or 206
    pub status: u16,
    /// Quoted ETag
    pub etag: Option<String>,
    pub content_type: Option<String>,
    pub content_range: Option<String>,
    pub last_modified: Option<String>,
    pub data: Bytes,
}

impl GetObjectResult {
    /// True when only part of the object was returned
    pub fn is_partial(&self) -> bool {
        self.status == 206
    }
}
