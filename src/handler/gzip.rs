//! Static gzip side table
//!
//! The root is scanned once for `*.gz` files. A request whose client accepts
//! gzip is answered from `<file>.gz` when the table has it.

use crate::logger;
use hyper::header::ACCEPT_ENCODING;
use hyper::HeaderMap;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read-only set of precompressed sibling paths
#[derive(Debug, Default)]
pub struct GzipTable {
    entries: HashSet<PathBuf>,
}

impl GzipTable {
    /// Walk `root` (following symlinks) and record every `*.gz` regular file
    pub fn scan(root: &Path) -> Self {
        let mut entries = HashSet::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    logger::log_warning(&format!("Skipping entry during gzip scan: {e}"));
                    continue;
                }
            };
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "gz")
            {
                entries.insert(entry.into_path());
            }
        }
        Self { entries }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The gzip sibling of `path`, if one was found at scan time
    pub fn lookup(&self, path: &Path) -> Option<PathBuf> {
        let mut gz = OsString::from(path.as_os_str());
        gz.push(".gz");
        let gz = PathBuf::from(gz);
        self.entries.contains(&gz).then_some(gz)
    }
}

/// Whether `Accept-Encoding` admits gzip (`q=0` refuses)
pub fn accepts_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|coding| {
            let mut parts = coding.split(';').map(str::trim);
            let name = parts.next().unwrap_or_default();
            if !(name.eq_ignore_ascii_case("gzip") || name == "*") {
                return false;
            }
            !parts.any(|param| {
                param
                    .strip_prefix("q=")
                    .and_then(|q| q.trim().parse::<f32>().ok())
                    .is_some_and(|q| q <= 0.0)
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_ENCODING, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_accepts_gzip() {
        assert!(accepts_gzip(&headers("gzip, deflate, br")));
        assert!(accepts_gzip(&headers("br;q=1.0, gzip;q=0.8")));
        assert!(accepts_gzip(&headers("*")));
        assert!(!accepts_gzip(&headers("gzip;q=0")));
        assert!(!accepts_gzip(&headers("br, deflate")));
        assert!(!accepts_gzip(&HeaderMap::new()));
    }

    #[test]
    fn test_scan_and_lookup() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("js")).unwrap();
        std::fs::write(dir.path().join("js/app.js"), "x").unwrap();
        std::fs::write(dir.path().join("js/app.js.gz"), "gz").unwrap();
        std::fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let table = GzipTable::scan(dir.path());
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.lookup(&dir.path().join("js/app.js")),
            Some(dir.path().join("js/app.js.gz"))
        );
        assert_eq!(table.lookup(&dir.path().join("plain.txt")), None);
    }
}
