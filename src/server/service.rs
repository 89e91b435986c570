// Request service module
// Hands each request to ServeStatic and renders Next/Error outcomes

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use hyper::header::{
    HeaderName, HeaderValue, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_RANGE, REFERER, USER_AGENT,
};
use hyper::{Request, Response, Version};

use super::state::AppState;
use crate::error::ServeError;
use crate::handler::Outcome;
use crate::http::{build_error_response, ServeBody};
use crate::logger::{self, AccessLogEntry};

/// Serve one request
///
/// `Outcome::Next` becomes a plain 404 and `Outcome::Error` becomes the
/// error's own status.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ServeBody>, Infallible> {
    let started = Instant::now();

    let response = match state.serve_static.serve(&req).await {
        Outcome::Response(resp) => resp,
        Outcome::Next => build_error_response(&ServeError::NotFound),
        Outcome::Error(err) => build_error_response(&err),
    };

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(
    req: &Request<B>,
    resp: &Response<ServeBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let request_header = |name: HeaderName| header_string(req.headers().get(name));
    let response_header = |name: HeaderName| header_string(resp.headers().get(name));

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = resp.status().as_u16();
    entry.body_bytes = resp
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.content_encoding = response_header(CONTENT_ENCODING);
    entry.content_range = response_header(CONTENT_RANGE);
    entry.referer = request_header(REFERER);
    entry.user_agent = request_header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn header_string(value: Option<&HeaderValue>) -> Option<String> {
    value
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
