//! Object metadata types

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP-facing metadata stored with an object
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpMetadata {
    /// Content type (MIME type)
    pub content_type: Option<String>,
    /// Content language
    pub content_language: Option<String>,
    /// Content disposition
    pub content_disposition: Option<String>,
    /// Content encoding
    pub content_encoding: Option<String>,
    /// Cache control directive
    pub cache_control: Option<String>,
    /// Expiry date, kept as sent
    pub expires: Option<String>,
}

impl HttpMetadata {
    /// Set content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set cache control
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }
}

/// Metadata for a stored object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size: u64,

    /// Strong validator, unquoted (hex MD5 of the content)
    pub etag: String,

    /// Last modified timestamp, whole seconds
    pub last_modified: DateTime<Utc>,

    /// HTTP metadata
    #[serde(default)]
    pub http: HttpMetadata,

    /// Custom metadata
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Create metadata for an object written now
    pub fn new(key: impl Into<String>, size: u64, etag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size,
            etag: etag.into(),
            last_modified: Utc::now().trunc_subsecs(0),
            http: HttpMetadata::default(),
            custom: BTreeMap::new(),
        }
    }

    /// Set HTTP metadata
    pub fn with_http(mut self, http: HttpMetadata) -> Self {
        self.http = http;
        self
    }

    /// Set custom metadata
    pub fn with_custom(mut self, custom: BTreeMap<String, String>) -> Self {
        self.custom = custom;
        self
    }

    /// ETag as it appears in an `ETag` header (quoted)
    pub fn http_etag(&self) -> String {
        format!("\"{}\"", self.etag)
    }

    /// Last-Modified in IMF-fixdate form
    pub fn http_last_modified(&self) -> String {
        http_date(&self.last_modified)
    }
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`)
pub fn http_date(when: &DateTime<Utc>) -> String {
    when.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date, accepting RFC 2822 and RFC 3339 forms
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|parsed| parsed.with_timezone(&Utc))
        .ok()
}
