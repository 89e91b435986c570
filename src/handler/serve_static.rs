//! Static file middleware
//!
//! Runs one request through resolution, candidate selection, the directory
//! policy and file sending, and reports the result as an [`Outcome`].

use super::candidate::{self, ResolvedTarget};
use super::directory::{self, DirectoryOutcome};
use super::gzip::GzipTable;
use super::path;
use super::send::{self, FileTarget};
use crate::config::ServeOptions;
use crate::error::{OptionsError, ServeError};
use crate::http::{
    body, build_405_response, build_error_response, build_redirect_response, ServeBody,
};
use crate::logger;
use hyper::{Method, Request, Response};
use std::sync::Arc;

/// Result of handing a request to the middleware
#[derive(Debug)]
pub enum Outcome {
    /// A complete response
    Response(Response<ServeBody>),
    /// Not handled; the host decides (typically its own 404)
    Next,
    /// Not handled because of an error; the host should answer with
    /// [`ServeError::status`]
    Error(ServeError),
}

struct Inner {
    options: ServeOptions,
    gzip: Option<GzipTable>,
}

/// Static file serving middleware
///
/// Cheap to clone; all clones share the same read-only options.
#[derive(Clone)]
pub struct ServeStatic {
    inner: Arc<Inner>,
}

impl ServeStatic {
    pub fn new(options: ServeOptions) -> Result<Self, OptionsError> {
        let options = options.normalize()?;
        let gzip = options.gzip_static.then(|| {
            let table = GzipTable::scan(&options.root);
            logger::log_info(&format!(
                "Found {} precompressed file(s) under {}",
                table.len(),
                options.root.display()
            ));
            table
        });

        Ok(Self {
            inner: Arc::new(Inner { options, gzip }),
        })
    }

    pub fn options(&self) -> &ServeOptions {
        &self.inner.options
    }

    /// Handle one request
    pub async fn serve<B>(&self, req: &Request<B>) -> Outcome {
        let is_head = match *req.method() {
            Method::GET => false,
            Method::HEAD => true,
            _ if self.inner.options.fallthrough => return Outcome::Next,
            _ => return Outcome::Response(build_405_response()),
        };

        match self.identify(req).await {
            Ok(Identified::File(target)) => self.deliver(req, is_head, target).await,
            Ok(Identified::Redirect(location)) => {
                Outcome::Response(strip_head(build_redirect_response(&location), is_head))
            }
            Err(err) => self.defer(err, is_head),
        }
    }

    /// Send an identified file; errors from here on are always forwarded
    async fn deliver<B>(&self, req: &Request<B>, is_head: bool, target: FileTarget) -> Outcome {
        match send::send_file(
            req.headers(),
            is_head,
            target,
            &self.inner.options,
            self.inner.gzip.as_ref(),
        )
        .await
        {
            Ok(response) => Outcome::Response(response),
            Err(err) => {
                logger::log_error(&format!("Failed to send {}: {err}", req.uri().path()));
                Outcome::Error(err)
            }
        }
    }

    /// Resolve the request to a file (or a redirect)
    async fn identify<B>(&self, req: &Request<B>) -> Result<Identified, ServeError> {
        let options = &self.inner.options;
        let resolved = path::resolve(&options.root, req.uri().path(), options.dotfiles)?;

        match candidate::select(&resolved, &options.extensions).await? {
            ResolvedTarget::File { path, metadata } => {
                Ok(Identified::File(FileTarget { path, metadata }))
            }
            ResolvedTarget::Directory { path } => {
                let outcome = directory::handle(
                    &path,
                    req.uri(),
                    resolved.trailing_slash,
                    &options.index,
                    options.directory,
                )
                .await?;
                match outcome {
                    DirectoryOutcome::Index { path, metadata } => {
                        Ok(Identified::File(FileTarget { path, metadata }))
                    }
                    DirectoryOutcome::Redirect(location) => Ok(Identified::Redirect(location)),
                    DirectoryOutcome::NotFound => Err(ServeError::NotFound),
                }
            }
            ResolvedTarget::NotFound => Err(ServeError::NotFound),
        }
    }

    /// Apply the fallthrough policy to an error raised before identification
    fn defer(&self, err: ServeError, is_head: bool) -> Outcome {
        let fallthrough = self.inner.options.fallthrough;
        if err.status().is_server_error() {
            logger::log_error(&format!("Failed to resolve static file: {err}"));
            if fallthrough {
                return Outcome::Error(err);
            }
        } else if fallthrough {
            return Outcome::Next;
        }
        Outcome::Response(strip_head(build_error_response(&err), is_head))
    }
}

/// HEAD keeps the headers (including `Content-Length`) but sends no body
fn strip_head(mut response: Response<ServeBody>, is_head: bool) -> Response<ServeBody> {
    if is_head {
        *response.body_mut() = body::empty();
    }
    response
}

enum Identified {
    File(FileTarget),
    Redirect(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DirectoryPolicy;
    use crate::error::ErrorKind;
    use http_body_util::BodyExt;
    use hyper::header::{ALLOW, CONTENT_LENGTH, LOCATION};
    use hyper::StatusCode;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("todo.txt"), "- groceries").unwrap();
        std::fs::create_dir(dir.path().join("docs")).unwrap();
        std::fs::write(dir.path().join("docs/index.html"), "<h1>docs</h1>").unwrap();
        std::fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn status(outcome: &Outcome) -> Option<StatusCode> {
        match outcome {
            Outcome::Response(resp) => Some(resp.status()),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_non_get_falls_through() {
        let dir = fixture();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        let outcome = serve.serve(&request(Method::POST, "/todo.txt")).await;
        assert!(matches!(outcome, Outcome::Next));
    }

    #[tokio::test]
    async fn test_non_get_without_fallthrough() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.fallthrough = false;
        let serve = ServeStatic::new(options).unwrap();
        let Outcome::Response(resp) = serve.serve(&request(Method::OPTIONS, "/")).await else {
            panic!("Expected response");
        };
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()[ALLOW], "GET, HEAD");
        assert_eq!(
            resp.extensions().get::<ErrorKind>(),
            Some(&ErrorKind::MethodNotAllowed)
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = fixture();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        assert!(matches!(
            serve.serve(&request(Method::GET, "/nope")).await,
            Outcome::Next
        ));

        let mut options = ServeOptions::new(dir.path());
        options.fallthrough = false;
        let serve = ServeStatic::new(options).unwrap();
        let outcome = serve.serve(&request(Method::GET, "/nope")).await;
        assert_eq!(status(&outcome), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_traversal() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.fallthrough = false;
        let serve = ServeStatic::new(options).unwrap();
        let outcome = serve.serve(&request(Method::GET, "/../todo.txt")).await;
        assert_eq!(status(&outcome), Some(StatusCode::FORBIDDEN));
        let outcome = serve.serve(&request(Method::GET, "/%E0%A4%A")).await;
        assert_eq!(status(&outcome), Some(StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn test_directory_redirect() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.index = Vec::new();
        let serve = ServeStatic::new(options).unwrap();
        let Outcome::Response(resp) = serve.serve(&request(Method::GET, "/empty?x=1")).await
        else {
            panic!("Expected redirect");
        };
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/empty/?x=1");

        // Already slashed: no redirect loop
        assert!(matches!(
            serve.serve(&request(Method::GET, "/empty/")).await,
            Outcome::Next
        ));
    }

    #[tokio::test]
    async fn test_directory_without_redirect() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.directory = DirectoryPolicy::NotFound;
        options.fallthrough = false;
        let serve = ServeStatic::new(options).unwrap();
        let outcome = serve.serve(&request(Method::GET, "/empty")).await;
        assert_eq!(status(&outcome), Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_index_served() {
        let dir = fixture();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        let outcome = serve.serve(&request(Method::GET, "/docs/")).await;
        assert_eq!(status(&outcome), Some(StatusCode::OK));
    }

    #[tokio::test]
    async fn test_index_redirects_without_trailing_slash() {
        let dir = fixture();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        let Outcome::Response(resp) = serve.serve(&request(Method::GET, "/docs")).await else {
            panic!("Expected redirect");
        };
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/docs/");
    }

    #[tokio::test]
    async fn test_backslash_redirect_is_escaped() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.index = Vec::new();
        let serve = ServeStatic::new(options).unwrap();
        // `\` splits segments, so this resolves to the `empty` directory
        let Outcome::Response(resp) = serve.serve(&request(Method::GET, "/\\empty")).await else {
            panic!("Expected redirect");
        };
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()[LOCATION], "/%5Cempty/");
    }

    #[tokio::test]
    async fn test_head_error_and_redirect_have_no_body() {
        let dir = fixture();
        let mut options = ServeOptions::new(dir.path());
        options.fallthrough = false;
        let serve = ServeStatic::new(options).unwrap();

        for (uri, expected) in [
            ("/nope", StatusCode::NOT_FOUND),
            ("/empty", StatusCode::MOVED_PERMANENTLY),
        ] {
            let Outcome::Response(resp) = serve.serve(&request(Method::HEAD, uri)).await else {
                panic!("Expected response for {uri}");
            };
            assert_eq!(resp.status(), expected);
            assert_ne!(resp.headers()[CONTENT_LENGTH], "0");
            let body = resp.into_body().collect().await.unwrap().to_bytes();
            assert!(body.is_empty(), "HEAD {uri} sent a body");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_io_error_before_identification_is_forwarded() {
        let dir = fixture();
        std::os::unix::fs::symlink("loop", dir.path().join("loop")).unwrap();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        assert!(serve.options().fallthrough);

        let outcome = serve.serve(&request(Method::GET, "/loop")).await;
        match outcome {
            Outcome::Error(err) => {
                assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(err.kind(), ErrorKind::InternalIo);
            }
            other => panic!("Expected Error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_after_identification_is_forwarded() {
        let dir = fixture();
        let serve = ServeStatic::new(ServeOptions::new(dir.path())).unwrap();
        assert!(serve.options().fallthrough);

        let req = request(Method::GET, "/todo.txt");
        let Ok(Identified::File(target)) = serve.identify(&req).await else {
            panic!("Expected todo.txt to be identified");
        };
        // Gone between selection and sending
        std::fs::remove_file(dir.path().join("todo.txt")).unwrap();

        match serve.deliver(&req, false, target).await {
            Outcome::Error(err) => assert_eq!(err.kind(), ErrorKind::NotFound),
            other => panic!("Expected Error, got {other:?}"),
        }
    }
}
