//! Byte range requests

use crate::{Result, StoreError};

/// A single `bytes=` range as requested by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeSpec {
    /// `bytes=start-end`, both inclusive
    Bounded { start: u64, end: u64 },
    /// `bytes=start-`
    From { start: u64 },
    /// `bytes=-len`, the last `len` bytes
    Suffix { len: u64 },
}

impl RangeSpec {
    /// Parse a `Range` header value.
    ///
    /// Returns `None` for anything that is not a single, well-formed byte
    /// range; such headers are ignored and the full object is served.
    pub fn parse(header: &str) -> Option<Self> {
        let spec = header.trim().strip_prefix("bytes=")?.trim();
        if spec.contains(',') {
            return None;
        }

        let (start, end) = spec.split_once('-')?;
        let (start, end) = (start.trim(), end.trim());

        match (start.is_empty(), end.is_empty()) {
            (true, false) => Some(Self::Suffix {
                len: end.parse().ok()?,
            }),
            (false, true) => Some(Self::From {
                start: start.parse().ok()?,
            }),
            (false, false) => {
                let start: u64 = start.parse().ok()?;
                let end: u64 = end.parse().ok()?;
                if start > end {
                    return None;
                }
                Some(Self::Bounded { start, end })
            }
            (true, true) => None,
        }
    }

    /// Resolve against an object of `size` bytes
    pub fn resolve(&self, size: u64) -> Result<ByteRange> {
        let unsatisfiable = || StoreError::RangeNotSatisfiable { size };
        if size == 0 {
            return Err(unsatisfiable());
        }

        let (start, end) = match *self {
            Self::Bounded { start, end } => {
                if start >= size {
                    return Err(unsatisfiable());
                }
                (start, end.min(size - 1))
            }
            Self::From { start } => {
                if start >= size {
                    return Err(unsatisfiable());
                }
                (start, size - 1)
            }
            Self::Suffix { len } => {
                if len == 0 {
                    return Err(unsatisfiable());
                }
                (size.saturating_sub(len), size - 1)
            }
        };

        Ok(ByteRange {
            start,
            end,
            total: size,
        })
    }
}

/// A range resolved against a concrete object
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte, inclusive
    pub start: u64,
    /// Last byte, inclusive
    pub end: u64,
    /// Size of the whole object
    pub total: u64,
}

impl ByteRange {
    /// Number of bytes in the range
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// A resolved range always holds at least one byte
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True unless the range covers the whole object
    pub fn is_partial(&self) -> bool {
        self.start > 0 || self.end + 1 < self.total
    }

    /// `Content-Range` header value
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bytes=0-4", Some(RangeSpec::Bounded { start: 0, end: 4 }))]
    #[case("bytes=5-", Some(RangeSpec::From { start: 5 }))]
    #[case("bytes=-3", Some(RangeSpec::Suffix { len: 3 }))]
    #[case(" bytes=2-2 ", Some(RangeSpec::Bounded { start: 2, end: 2 }))]
    #[case("bytes=4-1", None)]
    #[case("bytes=0-1,4-5", None)]
    #[case("bytes=-", None)]
    #[case("items=0-4", None)]
    #[case("bytes=a-b", None)]
    fn test_parse(#[case] header: &str, #[case] expected: Option<RangeSpec>) {
        assert_eq!(RangeSpec::parse(header), expected);
    }

    #[test]
    fn test_resolve_bounded_clamps_end() {
        let range = RangeSpec::Bounded { start: 2, end: 100 }.resolve(10).unwrap();
        assert_eq!((range.start, range.end, range.len()), (2, 9, 8));
        assert_eq!(range.content_range(), "bytes 2-9/10");
        assert!(range.is_partial());
    }

    #[test]
    fn test_resolve_suffix_longer_than_object() {
        let range = RangeSpec::Suffix { len: 50 }.resolve(10).unwrap();
        assert_eq!((range.start, range.end), (0, 9));
        assert!(!range.is_partial());
    }

    #[rstest]
    #[case(RangeSpec::From { start: 10 }, 10)]
    #[case(RangeSpec::Bounded { start: 12, end: 20 }, 10)]
    #[case(RangeSpec::Suffix { len: 0 }, 10)]
    #[case(RangeSpec::From { start: 0 }, 0)]
    fn test_resolve_unsatisfiable(#[case] spec: RangeSpec, #[case] size: u64) {
        assert!(matches!(
            spec.resolve(size),
            Err(StoreError::RangeNotSatisfiable { size: s }) if s == size
        ));
    }
}
