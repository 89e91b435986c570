//! Request path resolution
//!
//! Turns the URL path into a file-system path under the root, rejecting
//! malformed encodings, traversal and (per policy) dotfiles.

use crate::config::Dotfiles;
use crate::error::ServeError;
use crate::logger;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Longest single path segment accepted (`NAME_MAX`)
const MAX_SEGMENT_LEN: usize = 255;
/// Longest joined path accepted (`PATH_MAX`)
const MAX_PATH_LEN: usize = 4096;

/// A request path mapped under the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Absolute path under the root
    pub path: PathBuf,
    /// The decoded request path ended with `/`
    pub trailing_slash: bool,
    /// The request named the root itself
    pub is_root: bool,
}

/// Resolve a raw (still percent-encoded) URL path against `root`
pub fn resolve(
    root: &Path,
    request_path: &str,
    dotfiles: Dotfiles,
) -> Result<ResolvedPath, ServeError> {
    let decoded = decode(request_path)?;
    let decoded = collapse_leading_slashes(&decoded);
    let trailing_slash = decoded.ends_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    logger::log_warning(&format!(
                        "Path traversal attempt blocked: {request_path}"
                    ));
                    return Err(ServeError::Forbidden);
                }
            }
            name => segments.push(name),
        }
    }

    if segments.iter().any(|s| s.starts_with('.')) {
        match dotfiles {
            Dotfiles::Allow => {}
            Dotfiles::Deny => return Err(ServeError::Forbidden),
            Dotfiles::Ignore => return Err(ServeError::NotFound),
        }
    }

    if segments.iter().any(|s| s.len() > MAX_SEGMENT_LEN) {
        return Err(ServeError::NotFound);
    }

    let mut path = root.to_path_buf();
    path.extend(&segments);
    if path.as_os_str().len() > MAX_PATH_LEN {
        return Err(ServeError::NotFound);
    }

    Ok(ResolvedPath {
        path,
        trailing_slash,
        is_root: segments.is_empty(),
    })
}

/// Collapse a run of leading slashes into one
///
/// Keeps `//host/path` from turning into a protocol-relative URL.
pub fn collapse_leading_slashes(path: &str) -> Cow<'_, str> {
    let rest = path.trim_start_matches('/');
    if path.len() - rest.len() > 1 {
        Cow::Owned(format!("/{rest}"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Percent-decode, rejecting malformed escapes, invalid UTF-8 and NUL bytes
fn decode(raw: &str) -> Result<Cow<'_, str>, ServeError> {
    let bytes = raw.as_bytes();
    for (i, _) in raw.match_indices('%') {
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(ServeError::BadRequest);
        }
    }

    let decoded = percent_encoding::percent_decode_str(raw)
        .decode_utf8()
        .map_err(|_| ServeError::BadRequest)?;

    if decoded.contains('\0') {
        return Err(ServeError::BadRequest);
    }
    Ok(decoded)
}
