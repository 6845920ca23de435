//! goexport utilities
//!
//! Shared plumbing for the goexport workspace: configuration file loading,
//! logging setup, and discovery of Go source files under a root path.

#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod file;
pub mod logging;

pub use config::load_config;
pub use file::{collect_source_files, Discovery, SourceFilter};
pub use logging::{init_logging, LogLevel, LoggerConfig};

/// Result type used throughout goexport utilities
pub type Result<T> = std::result::Result<T, UtilError>;

/// Error types for utility operations
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging could not be initialized
    #[error("Logging error: {0}")]
    Logging(String),
}

/// Path substrings skipped during discovery unless configured otherwise
pub fn default_exclusion_patterns() -> Vec<String> {
    vec!["vendor".to_string()]
}

/// Check if a path should be excluded based on substring patterns.
///
/// Matching is a plain, case-sensitive substring test against the whole path,
/// so `vendor` also excludes `vendored/` and `my_vendor.go`.
pub fn should_exclude_path(path: &std::path::Path, patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    patterns.iter().any(|pattern| path_str.contains(pattern.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_exclusion_patterns() {
        let patterns = default_exclusion_patterns();

        assert!(should_exclude_path(&PathBuf::from("vendor/github.com/x/y.go"), &patterns));
        assert!(should_exclude_path(&PathBuf::from("pkg/vendor/a.go"), &patterns));
        assert!(should_exclude_path(&PathBuf::from("pkg/vendored/a.go"), &patterns));
        assert!(!should_exclude_path(&PathBuf::from("pkg/server/main.go"), &patterns));
    }

    #[test]
    fn test_exclusion_is_case_sensitive() {
        let patterns = default_exclusion_patterns();
        assert!(!should_exclude_path(&PathBuf::from("Vendor/a.go"), &patterns));
    }

    #[test]
    fn test_empty_patterns_exclude_nothing() {
        assert!(!should_exclude_path(&PathBuf::from("vendor/a.go"), &[]));
    }

    proptest! {
        #[test]
        fn prop_any_path_mentioning_vendor_is_excluded(
            prefix in "[a-z/]{0,12}",
            suffix in "[a-z/]{0,12}",
        ) {
            let path = PathBuf::from(format!("{}vendor{}.go", prefix, suffix));
            prop_assert!(should_exclude_path(&path, &default_exclusion_patterns()));
        }
    }
}
