//! Error taxonomy
//!
//! `ServeError` covers everything that can go wrong while answering a single
//! request; `OptionsError` covers construction-time validation.

use hyper::StatusCode;
use std::io;

/// Request-time failure
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// Malformed percent-encoding or a NUL byte in the path
    #[error("malformed request path")]
    BadRequest,
    /// Traversal outside the root, or a denied dotfile segment
    #[error("access to path is forbidden")]
    Forbidden,
    /// Missing file, index miss, ignored dotfile, or an oversize path
    #[error("no such file or directory")]
    NotFound,
    /// Method other than GET or HEAD with fallthrough disabled
    #[error("method not allowed")]
    MethodNotAllowed,
    /// `If-Match` / `If-Unmodified-Since` mismatch
    #[error("precondition failed")]
    PreconditionFailed,
    /// Range start beyond the end of the file
    #[error("range not satisfiable")]
    RangeNotSatisfiable,
    /// Any other file-system failure
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),
}

/// Machine-readable error name, attached to terminal error responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    PreconditionFailed,
    RangeNotSatisfiable,
    InternalIo,
}

impl ErrorKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::BadRequest => "BadRequestError",
            Self::Forbidden => "ForbiddenError",
            Self::NotFound => "NotFoundError",
            Self::MethodNotAllowed => "MethodNotAllowedError",
            Self::PreconditionFailed => "PreconditionFailedError",
            Self::RangeNotSatisfiable => "RangeNotSatisfiableError",
            Self::InternalIo => "InternalServerError",
        }
    }
}

impl ServeError {
    /// Classify a stat/open failure.
    ///
    /// Missing entries and non-directory path components are plain 404s;
    /// everything else stays an I/O error.
    pub fn from_io(err: io::Error) -> Self {
        if is_not_found(&err) {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest => ErrorKind::BadRequest,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound => ErrorKind::NotFound,
            Self::MethodNotAllowed => ErrorKind::MethodNotAllowed,
            Self::PreconditionFailed => ErrorKind::PreconditionFailed,
            Self::RangeNotSatisfiable => ErrorKind::RangeNotSatisfiable,
            Self::Io(_) => ErrorKind::InternalIo,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::RangeNotSatisfiable => StatusCode::RANGE_NOT_SATISFIABLE,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Whether a stat error means "nothing usable at this path"
pub(crate) fn is_not_found(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Construction-time failure
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("root path required")]
    EmptyRoot,
    #[error("invalid root path '{path}': {source}")]
    InvalidRoot {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid max-age value '{0}'")]
    InvalidMaxAge(String),
    #[error("invalid file name '{0}' in index/extensions")]
    InvalidName(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::BadRequest.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ServeError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServeError::RangeNotSatisfiable.status(),
            StatusCode::RANGE_NOT_SATISFIABLE
        );
        let io = ServeError::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(io.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(io.kind().name(), "InternalServerError");
    }

    #[test]
    fn test_from_io_classification() {
        assert!(matches!(
            ServeError::from_io(io::Error::from(io::ErrorKind::NotFound)),
            ServeError::NotFound
        ));
        assert!(matches!(
            ServeError::from_io(io::Error::from(io::ErrorKind::PermissionDenied)),
            ServeError::Io(_)
        ));
    }
}
