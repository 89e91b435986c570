// Runtime options for the static file middleware
// Built once per ServeStatic instance and read-only afterwards

use super::duration::clamp_max_age;
use super::types::{Dotfiles, StaticConfig};
use crate::error::OptionsError;
use hyper::HeaderMap;
use std::fmt;
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Hook invoked with the response headers, the served file path and its stat
/// right before a successful response is handed back.
pub type SetHeaders = Arc<dyn Fn(&mut HeaderMap, &Path, &Metadata) + Send + Sync>;

/// What to do with a directory that has no usable index file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryPolicy {
    /// Redirect to the trailing-slash URL (only when the slash is missing)
    Redirect,
    /// Always report not-found
    NotFound,
}

/// Immutable middleware options
#[derive(Clone)]
pub struct ServeOptions {
    pub root: PathBuf,
    pub index: Vec<String>,
    pub extensions: Vec<String>,
    pub dotfiles: Dotfiles,
    pub fallthrough: bool,
    pub directory: DirectoryPolicy,
    pub cache_control: bool,
    pub max_age: Duration,
    pub immutable: bool,
    pub last_modified: bool,
    pub etag: bool,
    pub accept_ranges: bool,
    pub gzip_static: bool,
    pub set_headers: Option<SetHeaders>,
}

impl ServeOptions {
    /// Options with every default applied
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index: vec!["index.html".to_string()],
            extensions: Vec::new(),
            dotfiles: Dotfiles::default(),
            fallthrough: true,
            directory: DirectoryPolicy::Redirect,
            cache_control: true,
            max_age: Duration::ZERO,
            immutable: false,
            last_modified: true,
            etag: true,
            accept_ranges: true,
            gzip_static: false,
            set_headers: None,
        }
    }

    /// Build options from the `[serve]` configuration table
    pub fn from_config(cfg: &StaticConfig) -> Result<Self, OptionsError> {
        let mut options = Self::new(&cfg.root);
        options.index = cfg.index.names();
        options.extensions = cfg.extensions.names();
        options.dotfiles = cfg.dotfiles;
        options.fallthrough = cfg.fallthrough;
        options.directory = if cfg.redirect {
            DirectoryPolicy::Redirect
        } else {
            DirectoryPolicy::NotFound
        };
        options.cache_control = cfg.cache_control;
        options.max_age = cfg.max_age.to_duration()?;
        options.immutable = cfg.immutable;
        options.last_modified = cfg.last_modified;
        options.etag = cfg.etag;
        options.accept_ranges = cfg.accept_ranges;
        options.gzip_static = cfg.gzip_static;
        Ok(options)
    }

    /// Install the set-headers hook
    #[must_use]
    pub fn with_set_headers<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut HeaderMap, &Path, &Metadata) + Send + Sync + 'static,
    {
        self.set_headers = Some(Arc::new(hook));
        self
    }

    /// Validate and normalize.
    ///
    /// The root is made absolute, `max_age` is clamped and index/extension
    /// names lose any leading dot (extensions) and are rejected if they
    /// contain a path separator.
    pub(crate) fn normalize(mut self) -> Result<Self, OptionsError> {
        if self.root.as_os_str().is_empty() {
            return Err(OptionsError::EmptyRoot);
        }
        self.root = std::path::absolute(&self.root).map_err(|source| {
            OptionsError::InvalidRoot {
                path: self.root.display().to_string(),
                source,
            }
        })?;

        self.max_age = clamp_max_age(self.max_age);

        for name in &self.index {
            validate_name(name)?;
        }
        self.extensions = self
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .collect();
        for ext in &self.extensions {
            validate_name(ext)?;
        }

        Ok(self)
    }
}

fn validate_name(name: &str) -> Result<(), OptionsError> {
    if name.is_empty() || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(OptionsError::InvalidName(name.to_string()));
    }
    Ok(())
}

impl fmt::Debug for ServeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeOptions")
            .field("root", &self.root)
            .field("index", &self.index)
            .field("extensions", &self.extensions)
            .field("dotfiles", &self.dotfiles)
            .field("fallthrough", &self.fallthrough)
            .field("directory", &self.directory)
            .field("cache_control", &self.cache_control)
            .field("max_age", &self.max_age)
            .field("immutable", &self.immutable)
            .field("last_modified", &self.last_modified)
            .field("etag", &self.etag)
            .field("accept_ranges", &self.accept_ranges)
            .field("gzip_static", &self.gzip_static)
            .field("set_headers", &self.set_headers.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::duration::MAX_MAX_AGE;

    #[test]
    fn test_defaults() {
        let options = ServeOptions::new("/srv/www");
        assert_eq!(options.index, vec!["index.html".to_string()]);
        assert!(options.extensions.is_empty());
        assert_eq!(options.dotfiles, Dotfiles::Ignore);
        assert!(options.fallthrough);
        assert_eq!(options.directory, DirectoryPolicy::Redirect);
        assert!(options.etag && options.last_modified && options.accept_ranges);
        assert_eq!(options.max_age, Duration::ZERO);
    }

    #[test]
    fn test_normalize_rejects_empty_root() {
        assert!(matches!(
            ServeOptions::new("").normalize(),
            Err(OptionsError::EmptyRoot)
        ));
    }

    #[test]
    fn test_normalize_clamps_and_trims() {
        let mut options = ServeOptions::new("relative/root");
        options.max_age = Duration::from_secs(10 * 365 * 24 * 3600);
        options.extensions = vec![".html".to_string(), "htm".to_string()];
        let options = options.normalize().unwrap();
        assert!(options.root.is_absolute());
        assert_eq!(options.max_age, MAX_MAX_AGE);
        assert_eq!(options.extensions, vec!["html", "htm"]);
    }

    #[test]
    fn test_normalize_rejects_separator_in_index() {
        let mut options = ServeOptions::new("/srv");
        options.index = vec!["../secret".to_string()];
        assert!(matches!(
            options.normalize(),
            Err(OptionsError::InvalidName(_))
        ));
    }
}
