//! Source file discovery
//!
//! Walks a file or directory and yields the Go sources to rewrite, in lexical
//! order, skipping excluded paths.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files discovery keeps
#[derive(Debug, Clone)]
pub struct SourceFilter {
    /// File extension without the leading dot
    pub extension: String,
    /// Any path containing one of these substrings is skipped
    pub exclude_substrings: Vec<String>,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            extension: "go".to_string(),
            exclude_substrings: crate::default_exclusion_patterns(),
        }
    }
}

impl SourceFilter {
    /// Check whether a regular file's name ends in the configured extension
    pub fn matches_extension(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map_or(false, |name| name.ends_with(&format!(".{}", self.extension)))
    }

    /// Check whether a path is excluded by one of the substring patterns
    pub fn is_excluded(&self, path: &Path) -> bool {
        crate::should_exclude_path(path, &self.exclude_substrings)
    }
}

/// Outcome of a discovery walk
#[derive(Debug, Default)]
pub struct Discovery {
    /// Files selected for processing, in walk order
    pub files: Vec<PathBuf>,
    /// Entries the walk could not read; the walk continued past them
    pub errors: Vec<walkdir::Error>,
}

/// Collect every source file under `root` (or `root` itself if it is a file).
///
/// Excluded directories are pruned rather than descended into. A walk error is
/// recorded and logged, never fatal.
pub fn collect_source_files(root: &Path, filter: &SourceFilter) -> Discovery {
    let mut discovery = Discovery::default();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !filter.is_excluded(entry.path()));

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_file() && filter.matches_extension(entry.path()) {
                    discovery.files.push(entry.into_path());
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable path");
                discovery.errors.push(err);
            }
        }
    }

    tracing::debug!(
        root = %root.display(),
        files = discovery.files.len(),
        errors = discovery.errors.len(),
        "source discovery finished"
    );

    discovery
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, "package x\n")
    }

    #[test]
    fn test_collects_go_files_recursively() -> std::io::Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        touch(&root.join("a.go"))?;
        touch(&root.join("pkg/b.go"))?;
        touch(&root.join("pkg/readme.md"))?;
        touch(&root.join("pkg/c.go.txt"))?;

        let discovery = collect_source_files(root, &SourceFilter::default());

        assert_eq!(discovery.files, vec![root.join("a.go"), root.join("pkg/b.go")]);
        assert!(discovery.errors.is_empty());
        Ok(())
    }

    #[test]
    fn test_vendor_directories_are_never_selected() -> std::io::Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        touch(&root.join("main.go"))?;
        touch(&root.join("vendor/github.com/dep/dep.go"))?;
        touch(&root.join("internal/vendor/x.go"))?;

        let discovery = collect_source_files(root, &SourceFilter::default());

        assert_eq!(discovery.files, vec![root.join("main.go")]);
        Ok(())
    }

    #[test]
    fn test_single_file_root() -> std::io::Result<()> {
        let temp_dir = tempdir()?;
        let file = temp_dir.path().join("only.go");
        touch(&file)?;

        let discovery = collect_source_files(&file, &SourceFilter::default());

        assert_eq!(discovery.files, vec![file]);
        Ok(())
    }

    #[test]
    fn test_missing_root_reports_error() {
        let discovery = collect_source_files(
            Path::new("/definitely/not/here/goexport"),
            &SourceFilter::default(),
        );

        assert!(discovery.files.is_empty());
        assert_eq!(discovery.errors.len(), 1);
    }

    #[test]
    fn test_directory_named_like_source_is_skipped() -> std::io::Result<()> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path();
        fs::create_dir_all(root.join("weird.go"))?;
        touch(&root.join("weird.go/inner.go"))?;

        let discovery = collect_source_files(root, &SourceFilter::default());

        assert_eq!(discovery.files, vec![root.join("weird.go/inner.go")]);
        Ok(())
    }
}
