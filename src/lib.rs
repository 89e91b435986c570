//! Static file serving middleware for hyper.
//!
//! [`ServeStatic`] maps request paths onto files under a root directory and
//! answers with conditional, range and redirect handling. Requests it does
//! not handle are reported back as [`Outcome::Next`] so a host can chain
//! further handlers.
//!
//! ```no_run
//! use serve_static::{Outcome, ServeOptions, ServeStatic};
//!
//! # async fn run(req: hyper::Request<()>) -> Result<(), Box<dyn std::error::Error>> {
//! let serve = ServeStatic::new(ServeOptions::new("public"))?;
//! match serve.serve(&req).await {
//!     Outcome::Response(resp) => println!("{}", resp.status()),
//!     Outcome::Next => println!("not a static file"),
//!     Outcome::Error(err) => println!("{}", err.status()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::{DirectoryPolicy, Dotfiles, ServeOptions, SetHeaders};
pub use error::{ErrorKind, OptionsError, ServeError};
pub use handler::{Outcome, ServeStatic};
pub use http::ServeBody;
