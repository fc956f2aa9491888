//! Main client implementation

use crate::{types::*, ClientError, Config, Result};
use bytes::Bytes;
use reqwest::{header, Client, RequestBuilder, Response};
use std::path::Path;
use tracing::{debug, instrument};

/// objgate gateway client
pub struct GatewayClient {
    config: Config,
    http: Client,
}

impl GatewayClient {
    /// Create a new client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            config
                .user_agent
                .parse()
                .map_err(|_| ClientError::Config("invalid user agent".into()))?,
        );

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { config, http })
    }

    /// Create with endpoint URL
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        Self::new(Config::new(endpoint))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Put an object from memory
    #[instrument(skip(self, data, request))]
    pub async fn put_object(
        &self,
        key: &str,
        data: impl Into<Bytes>,
        request: PutRequest,
    ) -> Result<()> {
        let data = data.into();
        let builder = self
            .with_put_headers(self.http.put(self.config.object_url(key)), &request)
            .header(header::CONTENT_LENGTH, data.len())
            .body(data);
        self.send(key, builder).await?;
        Ok(())
    }

    /// Stream a file to the gateway, returning its size
    #[instrument(skip(self, request))]
    pub async fn put_file(&self, key: &str, path: &Path, request: PutRequest) -> Result<u64> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();

        let builder = self
            .with_put_headers(self.http.put(self.config.object_url(key)), &request)
            .header(header::CONTENT_LENGTH, size)
            .body(file);
        self.send(key, builder).await?;

        debug!(key, size, "Uploaded file");
        Ok(size)
    }

    /// Get an object
    #[instrument(skip(self, request))]
    pub async fn get_object(&self, key: &str, request: GetRequest) -> Result<GetObjectResult> {
        let mut builder = self.http.get(self.config.object_url(key));
        let conditional = [
            (header::IF_MATCH, &request.if_match),
            (header::IF_NONE_MATCH, &request.if_none_match),
            (header::IF_MODIFIED_SINCE, &request.if_modified_since),
            (header::IF_UNMODIFIED_SINCE, &request.if_unmodified_since),
            (header::RANGE, &request.range),
        ];
        for (name, value) in conditional {
            if let Some(value) = value {
                builder = builder.header(name, value);
            }
        }

        let response = self.send(key, builder).await?;
        let status = response.status().as_u16();
        let headers = response.headers();
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        };

        let etag = header_str(header::ETAG);
        let content_type = header_str(header::CONTENT_TYPE);
        let content_range = header_str(header::CONTENT_RANGE);
        let last_modified = header_str(header::LAST_MODIFIED);
        let data = response.bytes().await?;

        Ok(GetObjectResult {
            status,
            etag,
            content_type,
            content_range,
            last_modified,
            data,
        })
    }

    /// Delete an object; succeeds whether or not it existed
    #[instrument(skip(self))]
    pub async fn delete_object(&self, key: &str) -> Result<()> {
        self.send(key, self.http.delete(self.config.object_url(key)))
            .await?;
        Ok(())
    }

    fn with_put_headers(&self, mut builder: RequestBuilder, request: &PutRequest) -> RequestBuilder {
        let fields = [
            (header::CONTENT_TYPE, &request.content_type),
            (header::CACHE_CONTROL, &request.cache_control),
            (header::IF_MATCH, &request.if_match),
            (header::IF_NONE_MATCH, &request.if_none_match),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                builder = builder.header(name, value);
            }
        }
        for (k, v) in &request.metadata {
            builder = builder.header(format!("x-amz-meta-{}", k), v);
        }
        builder
    }

    async fn send(&self, key: &str, mut builder: RequestBuilder) -> Result<Response> {
        if let Some(token) = &self.config.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        debug!(key, status = status.as_u16(), "Gateway rejected request");
        Err(ClientError::from_status(status.as_u16(), key, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> GatewayClient {
        GatewayClient::new(Config::new(server.uri()).with_token("s3cret")).unwrap()
    }

    #[tokio::test]
    async fn test_put_sends_token_and_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/audio/a.mp3"))
            .and(header_eq("authorization", "Bearer s3cret"))
            .and(header_eq("content-type", "audio/mpeg"))
            .and(header_eq("if-none-match", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_string("Put audio/a.mp3 successfully!"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let request = PutRequest::default().with_content_type("audio/mpeg").create_only();
        client.put_object("audio/a.mp3", "ID3", request).await.unwrap();
    }

    #[tokio::test]
    async fn test_get_partial() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/k"))
            .and(header_eq("range", "bytes=0-3"))
            .respond_with(
                ResponseTemplate::new(206)
                    .insert_header("etag", "\"abc\"")
                    .insert_header("content-range", "bytes 0-3/10")
                    .set_body_bytes(b"0123".to_vec()),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let result = client
            .get_object("k", GetRequest::default().with_range(0, 3))
            .await
            .unwrap();

        assert!(result.is_partial());
        assert_eq!(result.etag.as_deref(), Some("\"abc\""));
        assert_eq!(result.content_range.as_deref(), Some("bytes 0-3/10"));
        assert_eq!(result.data, Bytes::from_static(b"0123"));
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Object Not Found"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/stale"))
            .respond_with(ResponseTemplate::new(412))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/locked"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server).await;

        let err = client.get_object("missing", GetRequest::default()).await.unwrap_err();
        assert!(err.is_not_found());

        let err = client
            .get_object("stale", GetRequest::default().with_if_none_match("\"abc\""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::PreconditionFailed(_)));

        let err = client.delete_object("locked").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized));
    }
}
