//! HTTP response building module
//!
//! Builders for the non-file responses: 405, directory redirects and
//! terminal error responses.

use super::body::{self, ServeBody};
use crate::error::ServeError;
use crate::logger;
use hyper::header::{
    ALLOW, CONTENT_LENGTH, CONTENT_SECURITY_POLICY, CONTENT_TYPE, LOCATION,
    X_CONTENT_TYPE_OPTIONS,
};
use hyper::{Response, StatusCode};

/// Status used for trailing-slash directory redirects
pub const REDIRECT_STATUS: StatusCode = StatusCode::MOVED_PERMANENTLY;

const HARDENED_CSP: &str = "default-src 'none'";

/// Build 405 Method Not Allowed response
///
/// Tagged with the same `ErrorKind` extension as other error responses.
pub fn build_405_response() -> Response<ServeBody> {
    let err = ServeError::MethodNotAllowed;
    let mut response = Response::builder()
        .status(err.status())
        .header(ALLOW, "GET, HEAD")
        .header(CONTENT_LENGTH, 0)
        .body(body::empty())
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::empty())
        });
    response.extensions_mut().insert(err.kind());
    response
}

/// Build the trailing-slash redirect
///
/// `location` must already be percent-encoded; it is HTML-escaped before
/// being placed in the body.
pub fn build_redirect_response(location: &str) -> Response<ServeBody> {
    let escaped = escape_html(location);
    let doc = create_html_document(
        "Redirecting",
        &format!("Redirecting to <a href=\"{escaped}\">{escaped}</a>"),
    );

    Response::builder()
        .status(REDIRECT_STATUS)
        .header(CONTENT_TYPE, "text/html; charset=utf-8")
        .header(CONTENT_LENGTH, doc.len())
        .header(CONTENT_SECURITY_POLICY, HARDENED_CSP)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(LOCATION, location)
        .body(body::full(doc))
        .unwrap_or_else(|e| {
            log_build_error("redirect", &e);
            Response::new(body::empty())
        })
}

/// Build a terminal error response
///
/// The body is the canonical reason phrase only; the machine-readable
/// `ErrorKind` travels in the response extensions.
pub fn build_error_response(err: &ServeError) -> Response<ServeBody> {
    let status = err.status();
    let message = status.canonical_reason().unwrap_or("Error");

    let mut response = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .header(CONTENT_SECURITY_POLICY, HARDENED_CSP)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .body(body::full(message))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(body::empty())
        });
    response.extensions_mut().insert(err.kind());
    response
}

/// Minimal HTML document
pub fn create_html_document(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n</head>\n<body>\n<pre>{body}</pre>\n</body>\n</html>\n"
    )
}

/// Escape text for inclusion in HTML content or attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
