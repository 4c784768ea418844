//! DirectoryScanner - finds module files under the plugins root

use std::path::{Path, PathBuf};

/// Default module file extension
pub const DEFAULT_MODULE_EXTENSION: &str = "smx";

/// Recursively enumerates module files below a plugins root
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    plugins_root: PathBuf,
    extension: String,
}

impl DirectoryScanner {
    /// `extension` is matched case-insensitively, with or without a leading dot
    pub fn new(plugins_root: impl Into<PathBuf>, extension: &str) -> Self {
        Self {
            plugins_root: plugins_root.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    pub fn plugins_root(&self) -> &Path {
        &self.plugins_root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Module files under `relative_dir`, depth-first.
    ///
    /// Paths are relative to the plugins root, `/`-separated and prefixed with
    /// `relative_dir`. Sibling order is whatever the filesystem returns. A
    /// missing directory yields nothing.
    pub fn scan(&self, relative_dir: &str) -> Vec<String> {
        let relative_dir = relative_dir.trim_matches('/');
        let mut found = Vec::new();
        let start = self.plugins_root.join(relative_dir);

        if !start.is_dir() {
            tracing::debug!(dir = %start.display(), "Plugin directory does not exist");
            return found;
        }

        self.walk(&start, relative_dir, &mut found);
        tracing::debug!(dir = %relative_dir, count = found.len(), "Scanned plugin directory");
        found
    }

    fn walk(&self, dir: &Path, relative: &str, found: &mut Vec<String>) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "Could not open directory");
                return;
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Could not read directory entry");
                    continue;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                tracing::warn!(dir = %dir.display(), "Skipping non UTF-8 file name");
                continue;
            };

            let child = if relative.is_empty() {
                name.to_string()
            } else {
                format!("{relative}/{name}")
            };
            let path = entry.path();

            if path.is_dir() {
                self.walk(&path, &child, found);
            } else if self.matches(&path) {
                found.push(child);
            }
        }
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    #[test]
    fn test_scan_recurses_and_filters_by_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "combat/a.smx");
        touch(dir.path(), "combat/sub/b.smx");
        touch(dir.path(), "combat/sub/deeper/c.SMX");
        touch(dir.path(), "combat/readme.txt");
        touch(dir.path(), "combat/sub/d.smx.bak");
        touch(dir.path(), "other/e.smx");

        let scanner = DirectoryScanner::new(dir.path(), "smx");
        let found = sorted(scanner.scan("combat"));

        assert_eq!(
            found,
            vec!["combat/a.smx", "combat/sub/b.smx", "combat/sub/deeper/c.SMX"]
        );
    }

    #[test]
    fn test_scan_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(dir.path(), "smx");
        assert!(scanner.scan("does-not-exist").is_empty());
    }

    #[test]
    fn test_scan_trims_slashes_and_accepts_dotted_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "fun/x.mod");

        let scanner = DirectoryScanner::new(dir.path(), ".mod");
        assert_eq!(scanner.extension(), "mod");
        assert_eq!(scanner.scan("/fun/"), vec!["fun/x.mod"]);
    }

    #[test]
    fn test_scan_root_itself() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.smx");
        touch(dir.path(), "nested/inner.smx");

        let scanner = DirectoryScanner::new(dir.path(), "smx");
        assert_eq!(sorted(scanner.scan("")), vec!["nested/inner.smx", "top.smx"]);
    }

    #[test]
    fn test_extension_only_file_does_not_match() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "m/.smx");

        let scanner = DirectoryScanner::new(dir.path(), "smx");
        assert!(scanner.scan("m").is_empty());
    }
}
