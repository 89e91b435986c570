//! HTTP cache control module
//!
//! Provides validator generation (`ETag`, `Last-Modified`), the
//! `Cache-Control` header value, and conditional request evaluation.

use hyper::header::{
    HeaderName, CACHE_CONTROL, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_UNMODIFIED_SINCE,
};
use hyper::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Generate a strong `ETag` from file size and modification time
///
/// Format: `"<size-hex>-<mtime-millis-hex>"`. Stable for an unchanged file and
/// different whenever either component changes.
pub fn generate_etag(size: u64, modified: Option<SystemTime>) -> String {
    let mtime_ms = modified
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_millis());
    format!("\"{size:x}-{mtime_ms:x}\"")
}

/// Format a modification time as an HTTP-date (second precision)
pub fn format_last_modified(modified: SystemTime) -> String {
    httpdate::fmt_http_date(modified)
}

/// Build the `Cache-Control` header value
///
/// # Examples
/// ```
/// use serve_static::http::cache::cache_control_value;
/// use std::time::Duration;
///
/// assert_eq!(cache_control_value(Duration::ZERO, true), "public, max-age=0");
/// assert_eq!(
///     cache_control_value(Duration::from_secs(60), true),
///     "public, max-age=60, immutable"
/// );
/// ```
pub fn cache_control_value(max_age: Duration, immutable: bool) -> String {
    let secs = max_age.as_secs();
    if immutable && secs > 0 {
        format!("public, max-age={secs}, immutable")
    } else {
        format!("public, max-age={secs}")
    }
}

/// Current validators of the file being served
///
/// A validator is `None` when its feature is disabled.
#[derive(Debug, Clone, Default)]
pub struct Validators {
    pub etag: Option<String>,
    pub last_modified: Option<SystemTime>,
}

/// Conditional request headers
#[derive(Debug, Default)]
pub struct Conditionals<'a> {
    pub if_match: Option<&'a str>,
    pub if_none_match: Option<&'a str>,
    pub if_modified_since: Option<&'a str>,
    pub if_unmodified_since: Option<&'a str>,
    /// Request `Cache-Control: no-cache` forbids answering from cache
    pub no_cache: bool,
}

impl<'a> Conditionals<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let get = |name: HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
        Self {
            if_match: get(IF_MATCH),
            if_none_match: get(IF_NONE_MATCH),
            if_modified_since: get(IF_MODIFIED_SINCE),
            if_unmodified_since: get(IF_UNMODIFIED_SINCE),
            no_cache: get(CACHE_CONTROL).is_some_and(has_no_cache),
        }
    }
}

/// Outcome of conditional evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Proceed to range evaluation and send the body
    Send,
    /// 304
    NotModified,
    /// 412
    PreconditionFailed,
}

/// Evaluate conditional headers against the current validators
///
/// Pure: the result depends only on the headers and validators.
pub fn evaluate(conditionals: &Conditionals<'_>, validators: &Validators) -> Condition {
    let etag = validators.etag.as_deref();
    let mtime = validators.last_modified.map(unix_secs);

    // 1. If-Match
    if let Some(if_match) = conditionals.if_match {
        let matched = etag.is_some_and(|etag| check_if_match(if_match, etag));
        if !matched {
            return Condition::PreconditionFailed;
        }
    }

    if !conditionals.no_cache {
        // 2. If-None-Match
        if let Some(if_none_match) = conditionals.if_none_match {
            if etag.is_some_and(|etag| check_etag_match(Some(if_none_match), etag)) {
                return Condition::NotModified;
            }
        } else if let Some(since) = conditionals.if_modified_since {
            // 3. If-Modified-Since, only without If-None-Match
            if let (Some(mtime), Some(since)) = (mtime, parse_http_secs(since)) {
                if mtime <= since {
                    return Condition::NotModified;
                }
            }
        }
    }

    // 4. If-Unmodified-Since
    if let Some(since) = conditionals.if_unmodified_since {
        if let (Some(mtime), Some(since)) = (mtime, parse_http_secs(since)) {
            if mtime > since {
                return Condition::PreconditionFailed;
            }
        }
    }

    Condition::Send
}

/// Check if client's `If-None-Match` header matches the server's `ETag`
///
/// Supports:
/// - Single `ETag`: `"abc123"`
/// - Multiple `ETags`: `"abc123", "def456"`
/// - Wildcard: `*`
/// - Weak comparison: `W/"abc123"` matches `"abc123"`
pub fn check_etag_match(if_none_match: Option<&str>, etag: &str) -> bool {
    let etag = strip_weak(etag);
    if_none_match.is_some_and(|client_etag| {
        client_etag
            .split(',')
            .map(str::trim)
            .any(|e| e == "*" || strip_weak(e) == etag)
    })
}

/// Check `If-Match` against the current `ETag`
fn check_if_match(if_match: &str, etag: &str) -> bool {
    if if_match.trim() == "*" {
        return true;
    }
    if_match.split(',').map(str::trim).any(|m| {
        m == etag
            || m.strip_prefix("W/") == Some(etag)
            || etag.strip_prefix("W/") == Some(m)
    })
}

fn strip_weak(tag: &str) -> &str {
    tag.strip_prefix("W/").unwrap_or(tag)
}

fn has_no_cache(cache_control: &str) -> bool {
    cache_control
        .split(',')
        .any(|directive| directive.trim().eq_ignore_ascii_case("no-cache"))
}

/// Seconds since the epoch (HTTP-date precision)
pub(crate) fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs())
}

/// Parse an HTTP-date header into epoch seconds; invalid dates yield `None`
pub(crate) fn parse_http_secs(value: &str) -> Option<u64> {
    httpdate::parse_http_date(value.trim()).ok().map(unix_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn validators(etag: &str, secs: u64) -> Validators {
        Validators {
            etag: Some(etag.to_string()),
            last_modified: Some(at(secs)),
        }
    }

    #[test]
    fn test_generate_etag() {
        let etag = generate_etag(9, Some(at(1)));
        assert_eq!(etag, "\"9-3e8\"");
    }

    #[test]
    fn test_etag_consistency() {
        let t = Some(at(1_700_000_000));
        assert_eq!(generate_etag(100, t), generate_etag(100, t));
    }

    #[test]
    fn test_etag_difference() {
        let t = Some(at(1_700_000_000));
        assert_ne!(generate_etag(100, t), generate_etag(101, t));
        assert_ne!(generate_etag(100, t), generate_etag(100, Some(at(1_700_000_001))));
    }

    #[test]
    fn test_check_etag_match() {
        let etag = "\"abc123\"";
        assert!(check_etag_match(Some("\"abc123\""), etag));
        assert!(check_etag_match(Some("\"xyz\", \"abc123\""), etag));
        assert!(check_etag_match(Some("W/\"abc123\""), etag));
        assert!(check_etag_match(Some("*"), etag));
        assert!(!check_etag_match(Some("\"different\""), etag));
        assert!(!check_etag_match(None, etag));
    }

    #[test]
    fn test_cache_control() {
        assert_eq!(cache_control_value(Duration::ZERO, false), "public, max-age=0");
        assert_eq!(cache_control_value(Duration::ZERO, true), "public, max-age=0");
        assert_eq!(
            cache_control_value(Duration::from_millis(90_500), false),
            "public, max-age=90"
        );
    }

    #[test]
    fn test_last_modified_format() {
        assert_eq!(
            format_last_modified(at(784_111_777)),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_no_conditions_sends() {
        let v = validators("\"a\"", 100);
        assert_eq!(evaluate(&Conditionals::default(), &v), Condition::Send);
    }

    #[test]
    fn test_if_match() {
        let v = validators("\"a\"", 100);
        let mut c = Conditionals {
            if_match: Some("\"b\""),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::PreconditionFailed);
        c.if_match = Some("\"b\", \"a\"");
        assert_eq!(evaluate(&c, &v), Condition::Send);
        c.if_match = Some("*");
        assert_eq!(evaluate(&c, &v), Condition::Send);
        // Without an ETag nothing can match
        assert_eq!(
            evaluate(&c, &Validators::default()),
            Condition::PreconditionFailed
        );
    }

    #[test]
    fn test_if_none_match() {
        let v = validators("\"a\"", 100);
        let c = Conditionals {
            if_none_match: Some("\"a\""),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::NotModified);
        let c = Conditionals {
            if_none_match: Some("\"a\""),
            no_cache: true,
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::Send);
    }

    #[test]
    fn test_if_modified_since() {
        let v = validators("\"a\"", 784_111_777);
        let c = Conditionals {
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::NotModified);
        let c = Conditionals {
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:36 GMT"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::Send);
        // Ignored when If-None-Match is present
        let c = Conditionals {
            if_none_match: Some("\"other\""),
            if_modified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::Send);
        // Invalid dates are ignored
        let c = Conditionals {
            if_modified_since: Some("yesterday"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::Send);
    }

    #[test]
    fn test_if_unmodified_since() {
        let v = validators("\"a\"", 784_111_777);
        let c = Conditionals {
            if_unmodified_since: Some("Sun, 06 Nov 1994 08:49:36 GMT"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::PreconditionFailed);
        let c = Conditionals {
            if_unmodified_since: Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            ..Default::default()
        };
        assert_eq!(evaluate(&c, &v), Condition::Send);
    }

    #[test]
    fn test_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(IF_NONE_MATCH, "\"a\"".parse().unwrap());
        headers.insert(CACHE_CONTROL, "max-age=0, no-cache".parse().unwrap());
        let c = Conditionals::from_headers(&headers);
        assert_eq!(c.if_none_match, Some("\"a\""));
        assert!(c.no_cache);
        assert!(c.if_match.is_none());
    }
}
