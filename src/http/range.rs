//! HTTP Range request parsing module
//!
//! Single-range `bytes` requests and `If-Range` validation, compliant with RFC 7233.

use super::cache::{parse_http_secs, unix_secs};
use std::time::SystemTime;

/// Inclusive byte interval, `start <= end < size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the interval
    #[inline]
    pub const fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` value for a 206 response
    pub fn content_range(&self, file_size: u64) -> String {
        format!("bytes {}-{}/{file_size}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response
pub fn unsatisfied_content_range(file_size: u64) -> String {
    format!("bytes */{file_size}")
}

/// Range header parse result
#[derive(Debug, PartialEq, Eq)]
pub enum RangeParseResult {
    /// Valid range request
    Valid(ByteRange),
    /// Range not satisfiable (start >= `file_size`) - should return 416
    NotSatisfiable,
    /// No Range header, malformed, or multi-range (ignore, return full content)
    None,
}

/// Parse HTTP Range header (single range only, bytes unit)
///
/// Supported formats:
/// - `bytes=start-end` - Specific range (end clamped to the last byte)
/// - `bytes=start-` - From start to end
/// - `bytes=-suffix` - Last suffix bytes
///
/// # Arguments
/// * `range_header` - Value of Range header
/// * `file_size` - Total file size
///
/// # Examples
/// ```
/// use serve_static::http::range::{parse_range_header, ByteRange, RangeParseResult};
///
/// // Fixed range
/// let result = parse_range_header(Some("bytes=2-5"), 9);
/// assert_eq!(result, RangeParseResult::Valid(ByteRange { start: 2, end: 5 }));
///
/// // No Range header
/// let result = parse_range_header(None, 1000);
/// assert_eq!(result, RangeParseResult::None);
/// ```
pub fn parse_range_header(range_header: Option<&str>, file_size: u64) -> RangeParseResult {
    let Some(header) = range_header else {
        return RangeParseResult::None;
    };

    let Some(header) = header.trim_start_matches(' ').strip_prefix("bytes=") else {
        return RangeParseResult::None; // Not bytes unit, ignore
    };

    // Only support single range (not multi-range)
    if header.contains(',') {
        return RangeParseResult::None;
    }

    let Some((start_str, end_str)) = header.split_once('-') else {
        return RangeParseResult::None;
    };

    let (start_str, end_str) = (start_str.trim(), end_str.trim());

    // Suffix range: "-500" means last 500 bytes
    if start_str.is_empty() {
        return parse_suffix_range(end_str, file_size);
    }

    // Standard range: "start-" or "start-end"
    parse_standard_range(start_str, end_str, file_size)
}

/// Parse suffix range (e.g., "-500")
fn parse_suffix_range(suffix_str: &str, file_size: u64) -> RangeParseResult {
    let Some(suffix) = parse_position(suffix_str) else {
        return RangeParseResult::None;
    };

    if suffix == 0 || file_size == 0 {
        return RangeParseResult::NotSatisfiable;
    }

    // Suffix larger than file is valid, just return whole file as range
    RangeParseResult::Valid(ByteRange {
        start: file_size.saturating_sub(suffix),
        end: file_size - 1,
    })
}

/// Parse standard range (e.g., "0-99" or "100-")
fn parse_standard_range(start_str: &str, end_str: &str, file_size: u64) -> RangeParseResult {
    let Some(start) = parse_position(start_str) else {
        return RangeParseResult::None;
    };

    let end = if end_str.is_empty() {
        None // Open-ended range
    } else {
        let Some(e) = parse_position(end_str) else {
            return RangeParseResult::None;
        };
        Some(e)
    };

    // Start beyond file size is not satisfiable
    if start >= file_size {
        return RangeParseResult::NotSatisfiable;
    }

    let last = file_size - 1;
    let end = end.map_or(last, |e| e.min(last));

    // Validate: start <= end
    if start > end {
        return RangeParseResult::NotSatisfiable;
    }

    RangeParseResult::Valid(ByteRange { start, end })
}

/// Digits only; rejects signs and other `parse` leniencies
///
/// A digit run too large for `u64` saturates, so an oversized end still
/// clamps to the last byte and an oversized start is unsatisfiable.
fn parse_position(value: &str) -> Option<u64> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(value.parse().unwrap_or(u64::MAX))
}

/// Check whether an `If-Range` header still matches the representation
///
/// A quoted value is compared with the current `ETag`; anything else is an
/// HTTP-date compared with `Last-Modified`. Without a usable validator the
/// range is not honored.
pub fn if_range_fresh(
    if_range: Option<&str>,
    etag: Option<&str>,
    last_modified: Option<SystemTime>,
) -> bool {
    let Some(if_range) = if_range else {
        return true;
    };

    if if_range.contains('"') {
        return etag.is_some_and(|etag| if_range.contains(etag));
    }

    match (last_modified, parse_http_secs(if_range)) {
        (Some(modified), Some(date)) => unix_secs(modified) <= date,
        _ => false,
    }
}
