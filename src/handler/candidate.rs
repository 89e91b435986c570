//! Candidate selection
//!
//! Decides what a resolved path refers to: the literal file, an
//! extension-fallback file, a directory, or nothing.

use super::path::ResolvedPath;
use crate::error::{is_not_found, ServeError};
use std::ffi::OsString;
use std::fs::Metadata;
use std::path::PathBuf;
use tokio::fs;

/// Outcome of candidate selection
#[derive(Debug)]
pub enum ResolvedTarget {
    File { path: PathBuf, metadata: Metadata },
    Directory { path: PathBuf },
    NotFound,
}

/// Select the target for a resolved path
///
/// Order: literal regular file, then `<path>.<ext>` for each extension, then
/// a directory at the literal path. Symlinks are followed. A path with a
/// trailing slash never selects a regular file.
pub async fn select(
    resolved: &ResolvedPath,
    extensions: &[String],
) -> Result<ResolvedTarget, ServeError> {
    let literal = stat(&resolved.path).await?;

    if let Some(metadata) = &literal {
        if metadata.is_file() && !resolved.trailing_slash {
            return Ok(ResolvedTarget::File {
                path: resolved.path.clone(),
                metadata: metadata.clone(),
            });
        }
    }

    if !resolved.trailing_slash && !resolved.is_root {
        for ext in extensions {
            let mut candidate = OsString::from(resolved.path.as_os_str());
            candidate.push(".");
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);

            if let Some(metadata) = stat(&candidate).await? {
                if metadata.is_file() {
                    return Ok(ResolvedTarget::File {
                        path: candidate,
                        metadata,
                    });
                }
            }
        }
    }

    match literal {
        Some(metadata) if metadata.is_dir() => Ok(ResolvedTarget::Directory {
            path: resolved.path.clone(),
        }),
        _ => Ok(ResolvedTarget::NotFound),
    }
}

/// `stat` following symlinks; a missing entry is `Ok(None)`
pub(crate) async fn stat(path: &std::path::Path) -> Result<Option<Metadata>, ServeError> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata)),
        Err(e) if is_not_found(&e) => Ok(None),
        Err(e) => Err(ServeError::Io(e)),
    }
}
