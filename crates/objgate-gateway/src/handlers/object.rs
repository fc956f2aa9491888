//! Object operation handlers

use crate::{ApiError, AppState};
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use futures::{StreamExt, TryStreamExt};
use objgate_store::{
    ConditionalPredicate, GetOptions, GetOutcome, HttpMetadata, ObjectMetadata, PutOptions,
    PutOutcome, StoreError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Prefix for custom metadata headers
pub const CUSTOM_METADATA_PREFIX: &str = "x-amz-meta-";

/// PUT /{key} - Put object
pub async fn put_object(
    state: Arc<AppState>,
    key: &str,
    headers: &HeaderMap,
    body: Body,
) -> Result<Response, ApiError> {
    let options = PutOptions {
        conditions: conditions_from_headers(headers),
        http_metadata: http_metadata_from_headers(headers),
        custom_metadata: custom_metadata_from_headers(headers),
    };

    let body = body
        .into_data_stream()
        .map_err(|e| StoreError::Body(e.to_string()))
        .boxed();

    tracing::debug!(key, "Storing object");
    match state.store.put(key, body, options).await? {
        PutOutcome::Stored(metadata) => {
            tracing::debug!(key, size = metadata.size, etag = %metadata.etag, "Stored object");
            Ok((StatusCode::OK, format!("Put {key} successfully!")).into_response())
        }
        PutOutcome::PreconditionFailed => Err(ApiError::precondition_failed(key)),
    }
}

/// GET /{key} - Get object with Range and conditional request support
pub async fn get_object(
    state: Arc<AppState>,
    key: &str,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let options = GetOptions {
        conditions: conditions_from_headers(headers),
        range: header_string(headers, header::RANGE),
    };

    let outcome = state
        .store
        .get(key, options)
        .await?
        .ok_or_else(|| ApiError::not_found(key))?;

    match outcome {
        GetOutcome::Found {
            metadata,
            body,
            range,
        } => {
            let mut response_headers = HeaderMap::new();
            write_http_metadata(&metadata, &mut response_headers);
            response_headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

            let (status, length) = match range.filter(|r| r.is_partial()) {
                Some(partial) => {
                    insert_header(
                        &mut response_headers,
                        header::CONTENT_RANGE,
                        &partial.content_range(),
                    );
                    (StatusCode::PARTIAL_CONTENT, partial.len())
                }
                None => (StatusCode::OK, range.map_or(metadata.size, |r| r.len())),
            };
            insert_header(&mut response_headers, header::CONTENT_LENGTH, &length.to_string());

            tracing::debug!(key, status = status.as_u16(), length, "Serving object");
            Ok((status, response_headers, Body::from_stream(body)).into_response())
        }
        GetOutcome::PreconditionFailed { metadata } => {
            let mut response_headers = HeaderMap::new();
            write_http_metadata(&metadata, &mut response_headers);

            tracing::debug!(key, etag = %metadata.etag, "Preconditions failed");
            Ok((StatusCode::PRECONDITION_FAILED, response_headers, Body::empty()).into_response())
        }
    }
}

/// DELETE /{key} - Delete object
pub async fn delete_object(state: Arc<AppState>, key: &str) -> Result<Response, ApiError> {
    state.store.delete(key).await?;
    tracing::debug!(key, "Deleted object");
    Ok((StatusCode::OK, "Deleted!").into_response())
}

/// Preconditions forwarded verbatim to the store
pub fn conditions_from_headers(headers: &HeaderMap) -> ConditionalPredicate {
    ConditionalPredicate {
        if_match: header_string(headers, header::IF_MATCH),
        if_none_match: header_string(headers, header::IF_NONE_MATCH),
        if_modified_since: header_string(headers, header::IF_MODIFIED_SINCE),
        if_unmodified_since: header_string(headers, header::IF_UNMODIFIED_SINCE),
    }
}

/// HTTP metadata a client may attach to an upload
pub fn http_metadata_from_headers(headers: &HeaderMap) -> HttpMetadata {
    HttpMetadata {
        content_type: header_string(headers, header::CONTENT_TYPE),
        content_language: header_string(headers, header::CONTENT_LANGUAGE),
        content_disposition: header_string(headers, header::CONTENT_DISPOSITION),
        content_encoding: header_string(headers, header::CONTENT_ENCODING),
        cache_control: header_string(headers, header::CACHE_CONTROL),
        expires: header_string(headers, header::EXPIRES),
    }
}

/// Custom metadata (x-amz-meta-*)
pub fn custom_metadata_from_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(CUSTOM_METADATA_PREFIX)?;
            let value = value.to_str().ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Write stored metadata plus `etag` and `last-modified` onto response headers
pub fn write_http_metadata(metadata: &ObjectMetadata, headers: &mut HeaderMap) {
    let http = &metadata.http;
    let fields = [
        (header::CONTENT_TYPE, &http.content_type),
        (header::CONTENT_LANGUAGE, &http.content_language),
        (header::CONTENT_DISPOSITION, &http.content_disposition),
        (header::CONTENT_ENCODING, &http.content_encoding),
        (header::CACHE_CONTROL, &http.cache_control),
        (header::EXPIRES, &http.expires),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            insert_header(headers, name, value);
        }
    }

    for (key, value) in &metadata.custom {
        match HeaderName::try_from(format!("{CUSTOM_METADATA_PREFIX}{key}")) {
            Ok(name) => insert_header(headers, name, value),
            Err(_) => tracing::warn!(key = %key, "Skipping unrepresentable metadata key"),
        }
    }

    insert_header(headers, header::LAST_MODIFIED, &metadata.http_last_modified());
    insert_header(headers, header::ETAG, &metadata.http_etag());
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "Skipping unrepresentable header value"),
    }
}

fn header_string(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}
