//! Conditional request evaluation (If-Match family)
//!
//! The gateway forwards the raw header values; stores evaluate them here
//! against the current object in RFC 9110 §13.2.2 order:
//!
//! 1. `If-Match`, or `If-Unmodified-Since` when `If-Match` is absent
//! 2. `If-None-Match`, or `If-Modified-Since` (reads only) when `If-None-Match` is absent
//!
//! ETags are compared strongly: a weak validator never matches.

use crate::metadata::{parse_http_date, ObjectMetadata};

/// Kind of operation the predicate guards
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

/// A single entity tag from an ETag list
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityTag {
    pub weak: bool,
    pub opaque: String,
}

impl EntityTag {
    /// Strong comparison against an unquoted stored ETag
    pub fn strong_eq(&self, etag: &str) -> bool {
        !self.weak && self.opaque == etag
    }
}

/// Parsed `If-Match` / `If-None-Match` value
#[derive(Clone, Debug, PartialEq, Eq)]
enum EtagList {
    Any,
    Tags(Vec<EntityTag>),
}

impl EtagList {
    fn parse(raw: &str) -> Self {
        if raw.trim() == "*" {
            Self::Any
        } else {
            Self::Tags(parse_etag_list(raw))
        }
    }

    fn matches(&self, current: &ObjectMetadata) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|tag| tag.strong_eq(&current.etag)),
        }
    }
}

/// Parse a comma separated entity-tag list.
///
/// Quoted tags may contain commas; unquoted tokens are accepted leniently.
pub fn parse_etag_list(raw: &str) -> Vec<EntityTag> {
    let mut tags = Vec::new();
    let mut rest = raw;

    loop {
        rest = rest.trim_start_matches(|c: char| c == ',' || c.is_whitespace());
        if rest.is_empty() {
            break;
        }

        let weak = rest.starts_with("W/");
        if weak {
            rest = &rest[2..];
        }

        if let Some(quoted) = rest.strip_prefix('"') {
            match quoted.find('"') {
                Some(end) => {
                    tags.push(EntityTag {
                        weak,
                        opaque: quoted[..end].to_string(),
                    });
                    rest = &quoted[end + 1..];
                }
                None => {
                    tags.push(EntityTag {
                        weak,
                        opaque: quoted.trim_end().to_string(),
                    });
                    break;
                }
            }
        } else {
            let end = rest.find(',').unwrap_or(rest.len());
            let token = rest[..end].trim();
            if !token.is_empty() {
                tags.push(EntityTag {
                    weak,
                    opaque: token.to_string(),
                });
            }
            rest = &rest[end..];
        }
    }

    tags
}

/// Preconditions extracted verbatim from request headers
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConditionalPredicate {
    pub if_match: Option<String>,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
}

impl ConditionalPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_if_match(mut self, value: impl Into<String>) -> Self {
        self.if_match = Some(value.into());
        self
    }

    pub fn with_if_none_match(mut self, value: impl Into<String>) -> Self {
        self.if_none_match = Some(value.into());
        self
    }

    pub fn with_if_modified_since(mut self, value: impl Into<String>) -> Self {
        self.if_modified_since = Some(value.into());
        self
    }

    pub fn with_if_unmodified_since(mut self, value: impl Into<String>) -> Self {
        self.if_unmodified_since = Some(value.into());
        self
    }

    /// True when no precondition was supplied
    pub fn is_empty(&self) -> bool {
        self.if_match.is_none()
            && self.if_none_match.is_none()
            && self.if_modified_since.is_none()
            && self.if_unmodified_since.is_none()
    }

    /// Evaluate against the current object (`None` when the key is absent).
    ///
    /// Returns `true` when the operation may proceed.
    pub fn evaluate(&self, current: Option<&ObjectMetadata>, op: Operation) -> bool {
        if let Some(raw) = &self.if_match {
            let passed = current.is_some_and(|meta| EtagList::parse(raw).matches(meta));
            if !passed {
                return false;
            }
        } else if let (Some(raw), Some(meta)) = (&self.if_unmodified_since, current) {
            if let Some(since) = parse_http_date(raw) {
                if meta.last_modified.timestamp() > since.timestamp() {
                    return false;
                }
            }
        }

        if let Some(raw) = &self.if_none_match {
            if current.is_some_and(|meta| EtagList::parse(raw).matches(meta)) {
                return false;
            }
        } else if let (Operation::Read, Some(raw), Some(meta)) =
            (op, &self.if_modified_since, current)
        {
            if let Some(since) = parse_http_date(raw) {
                if meta.last_modified.timestamp() <= since.timestamp() {
                    return false;
                }
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn object(etag: &str) -> ObjectMetadata {
        let mut meta = ObjectMetadata::new("k", 3, etag);
        meta.last_modified = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        meta
    }

    #[test]
    fn test_parse_etag_list() {
        let tags = parse_etag_list(r#""abc", W/"weak" , "x,y",bare"#);

        assert_eq!(tags.len(), 4);
        assert_eq!(tags[0], EntityTag { weak: false, opaque: "abc".into() });
        assert!(tags[1].weak);
        assert_eq!(tags[2].opaque, "x,y");
        assert_eq!(tags[3].opaque, "bare");
    }

    #[test]
    fn test_empty_predicate_always_passes() {
        let predicate = ConditionalPredicate::new();
        assert!(predicate.is_empty());
        assert!(predicate.evaluate(Some(&object("abc")), Operation::Read));
        assert!(predicate.evaluate(None, Operation::Write));
    }

    #[rstest]
    #[case("\"abc\"", true)]
    #[case("\"zzz\", \"abc\"", true)]
    #[case("*", true)]
    #[case("\"zzz\"", false)]
    #[case("W/\"abc\"", false)]
    fn test_if_match(#[case] header: &str, #[case] expected: bool) {
        let predicate = ConditionalPredicate::new().with_if_match(header);
        assert_eq!(predicate.evaluate(Some(&object("abc")), Operation::Read), expected);
    }

    #[rstest]
    #[case("\"abc\"", false)]
    #[case("*", false)]
    #[case("\"zzz\"", true)]
    #[case("W/\"abc\"", true)]
    fn test_if_none_match(#[case] header: &str, #[case] expected: bool) {
        let predicate = ConditionalPredicate::new().with_if_none_match(header);
        assert_eq!(predicate.evaluate(Some(&object("abc")), Operation::Read), expected);
    }

    #[test]
    fn test_if_match_on_missing_object_fails() {
        let predicate = ConditionalPredicate::new().with_if_match("*");
        assert!(!predicate.evaluate(None, Operation::Write));
    }

    #[test]
    fn test_create_only_write() {
        let predicate = ConditionalPredicate::new().with_if_none_match("*");
        assert!(predicate.evaluate(None, Operation::Write));
        assert!(!predicate.evaluate(Some(&object("abc")), Operation::Write));
    }

    #[rstest]
    #[case("Sat, 01 Feb 2026 00:00:00 GMT", true)]
    #[case("Thu, 15 Jan 2026 10:00:00 GMT", true)]
    #[case("Wed, 01 Jan 2025 00:00:00 GMT", false)]
    #[case("not a date", true)]
    fn test_if_unmodified_since(#[case] header: &str, #[case] expected: bool) {
        let predicate = ConditionalPredicate::new().with_if_unmodified_since(header);
        assert_eq!(predicate.evaluate(Some(&object("abc")), Operation::Read), expected);
    }

    #[rstest]
    #[case("Wed, 01 Jan 2025 00:00:00 GMT", true)]
    #[case("Thu, 15 Jan 2026 10:00:00 GMT", false)]
    #[case("Sat, 01 Feb 2026 00:00:00 GMT", false)]
    fn test_if_modified_since(#[case] header: &str, #[case] expected: bool) {
        let predicate = ConditionalPredicate::new().with_if_modified_since(header);
        assert_eq!(predicate.evaluate(Some(&object("abc")), Operation::Read), expected);
    }

    #[test]
    fn test_if_modified_since_ignored_for_writes() {
        let predicate =
            ConditionalPredicate::new().with_if_modified_since("Sat, 01 Feb 2026 00:00:00 GMT");
        assert!(predicate.evaluate(Some(&object("abc")), Operation::Write));
    }

    #[test]
    fn test_if_match_takes_precedence_over_if_unmodified_since() {
        let predicate = ConditionalPredicate::new()
            .with_if_match("\"abc\"")
            .with_if_unmodified_since("Wed, 01 Jan 2025 00:00:00 GMT");
        assert!(predicate.evaluate(Some(&object("abc")), Operation::Read));
    }

    #[test]
    fn test_if_none_match_takes_precedence_over_if_modified_since() {
        let predicate = ConditionalPredicate::new()
            .with_if_none_match("\"other\"")
            .with_if_modified_since("Sat, 01 Feb 2026 00:00:00 GMT");
        assert!(predicate.evaluate(Some(&object("abc")), Operation::Read));
    }
}
