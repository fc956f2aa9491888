//! Bearer token authorization

use axum::http::{header, HeaderMap};

/// The configured bearer secret.
///
/// Only the BLAKE3 digest is kept. `blake3::Hash` equality is constant time.
#[derive(Clone)]
pub struct AuthToken {
    digest: blake3::Hash,
}

impl AuthToken {
    pub fn new(secret: &str) -> Self {
        Self {
            digest: blake3::hash(secret.as_bytes()),
        }
    }

    /// Exact match against a presented token
    pub fn verify(&self, presented: &str) -> bool {
        blake3::hash(presented.as_bytes()) == self.digest
    }
}

impl std::fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Why a request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No `Authorization` header
    Missing,
    /// Header present but not `Bearer <token>`
    Malformed,
    /// Token does not match
    Mismatch,
}

impl Denial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing credential",
            Self::Malformed => "malformed Authorization header",
            Self::Mismatch => "token mismatch",
        }
    }
}

/// Extract the token from `Bearer <token>`; the scheme is case-sensitive
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    let (scheme, token) = auth_header.split_once(' ')?;
    if scheme != "Bearer" || token.is_empty() {
        return None;
    }
    Some(token)
}

/// Decide whether a request may proceed
pub fn authorize(token: Option<&AuthToken>, headers: &HeaderMap) -> Result<(), Denial> {
    let Some(expected) = token else {
        return Ok(());
    };

    let header = headers.get(header::AUTHORIZATION).ok_or(Denial::Missing)?;
    let header = header.to_str().map_err(|_| Denial::Malformed)?;
    let presented = extract_bearer_token(header).ok_or(Denial::Malformed)?;

    if expected.verify(presented) {
        Ok(())
    } else {
        Err(Denial::Mismatch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use rstest::rstest;

    fn headers_with(auth: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = auth {
            headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc123"), Some("abc123"));
        assert_eq!(extract_bearer_token("bearer abc123"), None);
        assert_eq!(extract_bearer_token("Basic xyz"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer"), None);
    }

    #[test]
    fn test_open_gateway_allows_everything() {
        assert_eq!(authorize(None, &headers_with(None)), Ok(()));
        assert_eq!(authorize(None, &headers_with(Some("Bearer junk"))), Ok(()));
    }

    #[rstest]
    #[case(None, Err(Denial::Missing))]
    #[case(Some("Bearer s3cret"), Ok(()))]
    #[case(Some("Bearer wrong"), Err(Denial::Mismatch))]
    #[case(Some("bearer s3cret"), Err(Denial::Malformed))]
    #[case(Some("Basic s3cret"), Err(Denial::Malformed))]
    #[case(Some("Bearer s3cret extra"), Err(Denial::Mismatch))]
    fn test_authorize(#[case] auth: Option<&'static str>, #[case] expected: Result<(), Denial>) {
        let token = AuthToken::new("s3cret");
        assert_eq!(authorize(Some(&token), &headers_with(auth)), expected);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AuthToken::new("s3cret");
        assert!(!format!("{token:?}").contains("s3cret"));
    }
}
