//! Corpus file scanner
//!
//! Recursive discovery of `.xml` documents. Each root is walked on its own
//! with entries sorted by file name, and roots are visited in the order
//! given, so the resulting list is stable across runs.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Corpus file scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Cannot access an entry below a root
    #[error("File access error {0}: {1}")]
    FileAccessError(PathBuf, String),
}

/// Corpus file scanner
pub struct FileScanner {
    ignore_patterns: Vec<String>,
    extension: String,
}

impl FileScanner {
    /// Create new file scanner with default ignore patterns
    ///
    /// Ignores version control directories and editor backups.
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                ".git".to_string(),
                ".svn".to_string(),
                "~".to_string(),
            ],
            extension: "xml".to_string(),
        }
    }

    /// Documents under one root, sorted by path
    ///
    /// A root that is itself a file is returned as-is when it has the
    /// document extension.
    pub fn scan(&self, root_path: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if root_path.is_file() {
            return Ok(if self.is_document(root_path) {
                vec![root_path.to_path_buf()]
            } else {
                Vec::new()
            });
        }

        let mut documents = Vec::new();

        let walker = WalkDir::new(root_path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if let Some(ancestor) = e.loop_ancestor() {
                        let path = e.path().unwrap_or(root_path);
                        tracing::warn!(
                            "Symlink loop: {} points back to {}",
                            path.display(),
                            ancestor.display()
                        );
                        continue;
                    }
                    let path = e.path().unwrap_or(root_path).to_path_buf();
                    return Err(ScanError::FileAccessError(path, e.to_string()));
                }
            };
            if entry.file_type().is_file() && self.is_document(entry.path()) {
                documents.push(entry.into_path());
            }
        }

        tracing::debug!(
            "{}: {} document(s) discovered",
            root_path.display(),
            documents.len()
        );

        Ok(documents)
    }

    /// Documents under every root, roots in argument order
    pub fn scan_all<P: AsRef<Path>>(&self, roots: &[P]) -> Result<Vec<PathBuf>, ScanError> {
        let mut documents = Vec::new();
        for root in roots {
            documents.extend(self.scan(root.as_ref())?);
        }
        Ok(documents)
    }

    /// Check if entry should be processed
    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        // The root itself is never filtered
        if entry.depth() == 0 {
            return true;
        }
        let file_name = entry.file_name().to_string_lossy();
        !self
            .ignore_patterns
            .iter()
            .any(|p| file_name.contains(p.as_str()))
    }

    /// Extension compared exactly: corpus files use lower-case `.xml`
    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext == self.extension.as_str())
            .unwrap_or(false)
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}
