//! MIME type detection module
//!
//! Returns the corresponding Content-Type based on file extension.

use mime_guess::mime;
use std::path::Path;

/// Get MIME Content-Type for a path
///
/// Text types carry an explicit UTF-8 charset.
///
/// # Examples
/// ```
/// use serve_static::http::mime::content_type;
/// use std::path::Path;
///
/// assert_eq!(content_type(Path::new("index.html")), "text/html; charset=utf-8");
/// assert_eq!(content_type(Path::new("clip.mp4")), "video/mp4");
/// assert_eq!(content_type(Path::new("LICENSE")), "application/octet-stream");
/// ```
pub fn content_type(path: &Path) -> String {
    let guess = mime_guess::from_path(path).first_or_octet_stream();
    if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
        format!("{}; charset=utf-8", guess.essence_str())
    } else {
        guess.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_types() {
        assert_eq!(content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(content_type(Path::new("todo.txt")), "text/plain; charset=utf-8");
        assert_eq!(content_type(Path::new("site.css")), "text/css; charset=utf-8");
        assert_eq!(content_type(Path::new("data.json")), "application/json");
        assert_eq!(content_type(Path::new("logo.png")), "image/png");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type(Path::new("blob.xyz123")), "application/octet-stream");
        assert_eq!(content_type(Path::new("Makefile")), "application/octet-stream");
    }
}
