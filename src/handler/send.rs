//! File sending
//!
//! Everything that happens once a concrete file has been identified:
//! validators, conditional evaluation, range evaluation, header emission and
//! body streaming.

use super::candidate::stat;
use super::gzip::{accepts_gzip, GzipTable};
use crate::config::ServeOptions;
use crate::error::ServeError;
use crate::http::body::{self, ServeBody};
use crate::http::cache::{self, Condition, Conditionals, Validators};
use crate::http::range::{self, RangeParseResult};
use crate::http::{build_error_response, mime};
use crate::logger;
use hyper::header::{
    HeaderName, HeaderValue, ACCEPT_RANGES, CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LANGUAGE,
    CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ETAG, IF_RANGE, LAST_MODIFIED, RANGE, VARY,
};
use hyper::{HeaderMap, Response, StatusCode};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use tokio::fs::File;

/// A file selected for sending
#[derive(Debug)]
pub struct FileTarget {
    pub path: PathBuf,
    pub metadata: Metadata,
}

/// Headers removed from a 304 response
static CONTENT_HEADER_FIELDS: [HeaderName; 5] = [
    CONTENT_ENCODING,
    CONTENT_LANGUAGE,
    CONTENT_LENGTH,
    CONTENT_RANGE,
    CONTENT_TYPE,
];

/// Build the response for an identified file
///
/// Errors returned here happen after identification and are always
/// forwarded to the host.
pub async fn send_file(
    request_headers: &HeaderMap,
    is_head: bool,
    target: FileTarget,
    options: &ServeOptions,
    gzip: Option<&GzipTable>,
) -> Result<Response<ServeBody>, ServeError> {
    let mut headers = HeaderMap::new();

    // Content-Type always follows the uncompressed file
    set_header(&mut headers, CONTENT_TYPE, &mime::content_type(&target.path));

    let FileTarget { path, metadata } =
        select_encoding(request_headers, target, gzip, &mut headers).await?;

    let size = metadata.len();
    let modified = metadata.modified().ok();
    let validators = Validators {
        etag: options.etag.then(|| cache::generate_etag(size, modified)),
        last_modified: modified.filter(|_| options.last_modified),
    };

    let condition = cache::evaluate(&Conditionals::from_headers(request_headers), &validators);
    if condition == Condition::PreconditionFailed {
        return Ok(build_error_response(&ServeError::PreconditionFailed));
    }

    if options.accept_ranges {
        headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    }
    if options.cache_control {
        set_header(
            &mut headers,
            CACHE_CONTROL,
            &cache::cache_control_value(options.max_age, options.immutable),
        );
    }
    if let Some(modified) = validators.last_modified {
        set_header(&mut headers, LAST_MODIFIED, &cache::format_last_modified(modified));
    }
    if let Some(etag) = &validators.etag {
        set_header(&mut headers, ETAG, etag);
    }

    if condition == Condition::NotModified {
        for name in &CONTENT_HEADER_FIELDS {
            headers.remove(name);
        }
        run_hook(options, &mut headers, &path, &metadata);
        return Ok(assemble(StatusCode::NOT_MODIFIED, headers, body::empty()));
    }

    let mut status = StatusCode::OK;
    let mut offset = 0;
    let mut length = size;

    if options.accept_ranges {
        let range_header = header_str(request_headers, &RANGE);
        let if_range = header_str(request_headers, &IF_RANGE);
        if range_header.is_some()
            && range::if_range_fresh(
                if_range,
                validators.etag.as_deref(),
                validators.last_modified,
            )
        {
            match range::parse_range_header(range_header, size) {
                RangeParseResult::Valid(r) => {
                    set_header(&mut headers, CONTENT_RANGE, &r.content_range(size));
                    status = StatusCode::PARTIAL_CONTENT;
                    offset = r.start;
                    length = r.len();
                }
                RangeParseResult::NotSatisfiable => {
                    return Ok(build_416_response(size));
                }
                RangeParseResult::None => {}
            }
        }
    }

    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

    let body = if is_head {
        body::empty()
    } else {
        let file = File::open(&path).await.map_err(ServeError::from_io)?;
        body::file_range(file, offset, length)
            .await
            .map_err(ServeError::Io)?
    };

    run_hook(options, &mut headers, &path, &metadata);
    Ok(assemble(status, headers, body))
}

/// Swap in the gzip sibling when the table has one and the client accepts it
async fn select_encoding(
    request_headers: &HeaderMap,
    target: FileTarget,
    gzip: Option<&GzipTable>,
    headers: &mut HeaderMap,
) -> Result<FileTarget, ServeError> {
    let Some(gz_path) = gzip.and_then(|table| table.lookup(&target.path)) else {
        return Ok(target);
    };

    headers.insert(VARY, HeaderValue::from_static("Accept-Encoding"));
    if !accepts_gzip(request_headers) {
        return Ok(target);
    }

    match stat(&gz_path).await? {
        Some(metadata) if metadata.is_file() => {
            headers.insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            Ok(FileTarget {
                path: gz_path,
                metadata,
            })
        }
        // Removed since the scan
        _ => Ok(target),
    }
}

/// 416 with `Content-Range: bytes */<size>` and no body
fn build_416_response(size: u64) -> Response<ServeBody> {
    let mut response = build_error_response(&ServeError::RangeNotSatisfiable);
    let headers = response.headers_mut();
    headers.remove(CONTENT_TYPE);
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(0u64));
    set_header(headers, CONTENT_RANGE, &range::unsatisfied_content_range(size));
    *response.body_mut() = body::empty();
    response
}

fn run_hook(options: &ServeOptions, headers: &mut HeaderMap, path: &Path, metadata: &Metadata) {
    if let Some(hook) = &options.set_headers {
        hook(headers, path, metadata);
    }
}

fn assemble(status: StatusCode, headers: HeaderMap, body: ServeBody) -> Response<ServeBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(e) => logger::log_error(&format!("Invalid {name} header value '{value}': {e}")),
    }
}
