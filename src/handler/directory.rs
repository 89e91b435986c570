//! Directory policy
//!
//! A request that selected a directory either resolves to an index file,
//! redirects to the trailing-slash URL, or ends as not-found.

use super::candidate::stat;
use super::path::collapse_leading_slashes;
use crate::config::DirectoryPolicy;
use crate::error::ServeError;
use hyper::Uri;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fs::Metadata;
use std::path::{Path, PathBuf};

/// Characters escaped when echoing the request URL into `Location`
///
/// Existing `%XX` escapes and reserved URL characters pass through. `\` is
/// escaped so `/\host` cannot turn into a protocol-relative URL.
const LOCATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Outcome of the directory policy
#[derive(Debug)]
pub enum DirectoryOutcome {
    /// Serve this index file as if it had been requested directly
    Index { path: PathBuf, metadata: Metadata },
    /// Redirect to this (percent-encoded) location
    Redirect(String),
    NotFound,
}

/// Apply the directory policy to `dir`
///
/// Without a trailing slash the directory is never served directly, so
/// relative links in an index resolve against the directory. With one, the
/// index names are tried in order.
pub async fn handle(
    dir: &Path,
    uri: &Uri,
    trailing_slash: bool,
    index: &[String],
    policy: DirectoryPolicy,
) -> Result<DirectoryOutcome, ServeError> {
    if !trailing_slash {
        return Ok(match policy {
            DirectoryPolicy::Redirect => DirectoryOutcome::Redirect(redirect_location(uri)),
            DirectoryPolicy::NotFound => DirectoryOutcome::NotFound,
        });
    }

    for name in index {
        let candidate = dir.join(name);
        if let Some(metadata) = stat(&candidate).await? {
            if metadata.is_file() {
                return Ok(DirectoryOutcome::Index {
                    path: candidate,
                    metadata,
                });
            }
        }
    }

    // Already slashed: redirecting again would loop
    Ok(DirectoryOutcome::NotFound)
}

/// The original URL with exactly one trailing slash appended
///
/// Leading slashes are collapsed and the query string is preserved.
pub fn redirect_location(uri: &Uri) -> String {
    let with_slash = format!("{}/", uri.path());
    let path = collapse_leading_slashes(&with_slash);
    let mut location = utf8_percent_encode(&path, LOCATION_ENCODE_SET).to_string();
    if let Some(query) = uri.query() {
        location.push('?');
        location.push_str(&utf8_percent_encode(query, LOCATION_ENCODE_SET).to_string());
    }
    location
}
