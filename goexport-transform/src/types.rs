//! Configuration and per-run result types

use serde::{Deserialize, Serialize};
use std::path::Path;

use goexport_utils::SourceFilter;

use crate::engine::{RenameTable, PROTECTED_FUNCTIONS};
use crate::filter::GENERATED_MARKER;

/// Rewrite settings, loadable from a TOML, JSON or YAML file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    /// Files containing this text are never touched
    pub generated_marker: String,
    /// Paths containing any of these substrings are skipped
    pub exclude_substrings: Vec<String>,
    /// Source file extension, without the dot
    pub extension: String,
    /// Receiver-less functions that keep their lowercase name
    pub protected_functions: Vec<String>,
    /// Pipe output through `gofmt` when it is installed
    pub gofmt: bool,
    /// Report what would change without writing
    pub dry_run: bool,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            generated_marker: GENERATED_MARKER.to_string(),
            exclude_substrings: goexport_utils::default_exclusion_patterns(),
            extension: "go".to_string(),
            protected_functions: PROTECTED_FUNCTIONS.iter().map(|s| s.to_string()).collect(),
            gofmt: true,
            dry_run: false,
        }
    }
}

impl RewriteConfig {
    /// Load from a config file; missing keys take their defaults
    pub fn from_file(path: &Path) -> crate::Result<Self> {
        Ok(goexport_utils::load_config(path)?)
    }

    pub fn source_filter(&self) -> SourceFilter {
        SourceFilter {
            extension: self.extension.clone(),
            exclude_substrings: self.exclude_substrings.clone(),
        }
    }
}

/// What happened to one file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Carries the generated-file marker; not parsed
    Generated,
    /// Parsed, nothing to rename
    Unchanged,
    /// Rewritten on disk
    Modified { renames: RenameTable },
    /// Would have been rewritten; dry run
    WouldModify { renames: RenameTable },
}

impl FileOutcome {
    pub fn is_change(&self) -> bool {
        matches!(self, FileOutcome::Modified { .. } | FileOutcome::WouldModify { .. })
    }
}

/// Counts for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Files selected by traversal
    pub discovered: usize,
    pub modified: usize,
    pub unchanged: usize,
    /// Skipped for carrying the generated-file marker
    pub generated: usize,
    /// Read, parse, format or write failures
    pub failed: usize,
    /// Paths the traversal could not read
    pub walk_errors: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &crate::Result<FileOutcome>) {
        match outcome {
            Ok(FileOutcome::Generated) => self.generated += 1,
            Ok(FileOutcome::Unchanged) => self.unchanged += 1,
            Ok(FileOutcome::Modified { .. } | FileOutcome::WouldModify { .. }) => self.modified += 1,
            Err(_) => self.failed += 1,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.walk_errors > 0
    }
}
