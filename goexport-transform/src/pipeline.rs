//! Per-file rewrite pipeline
//!
//! Each file is read whole, checked for the generated-file marker, parsed,
//! renamed and printed in memory. Only a fully printed result is written, so a
//! file on disk is either untouched or replaced with a consistent rename.

use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::engine::{RenameEngine, RenameTable};
use crate::filter::is_generated;
use crate::printer::Printer;
use crate::syntax::{GoParser, SyntaxError};
use crate::types::{FileOutcome, RewriteConfig, RunSummary};
use crate::{Result, TransformError};

/// In-memory result of rewriting one source text
#[derive(Debug, Clone)]
pub enum Rewrite {
    Generated,
    Unchanged,
    Changed { text: String, renames: RenameTable },
}

/// Destination for rewritten source text
pub trait SourceWriter: std::fmt::Debug {
    fn write_source(&mut self, path: &Path, text: &str) -> std::io::Result<()>;
}

/// Writes rewritten files in place
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl SourceWriter for FsWriter {
    fn write_source(&mut self, path: &Path, text: &str) -> std::io::Result<()> {
        fs::write(path, text)
    }
}

/// Runs the read, rename, print and write stages over files
#[derive(Debug)]
pub struct Rewriter {
    config: RewriteConfig,
    parser: GoParser,
    engine: RenameEngine,
    printer: Printer,
    writer: Box<dyn SourceWriter>,
}

impl Rewriter {
    pub fn new(config: RewriteConfig) -> Result<Self> {
        let parser = GoParser::new()?;
        let engine = RenameEngine::new(config.protected_functions.iter().cloned());
        let printer = Printer::new(config.gofmt);
        Ok(Self {
            config,
            parser,
            engine,
            printer,
            writer: Box::new(FsWriter),
        })
    }

    /// Replace where rewritten files are written
    pub fn with_writer(mut self, writer: impl SourceWriter + 'static) -> Self {
        self.writer = Box::new(writer);
        self
    }

    /// Rewrite source text without touching the filesystem. `path` is only
    /// used for error reporting.
    pub fn rewrite_source(&mut self, path: &Path, content: &[u8]) -> Result<Rewrite> {
        if is_generated(content, &self.config.generated_marker) {
            return Ok(Rewrite::Generated);
        }

        let source = std::str::from_utf8(content).map_err(|err| TransformError::Parse {
            path: path.to_path_buf(),
            source: SyntaxError::Encoding {
                valid_up_to: err.valid_up_to(),
            },
        })?;

        let mut tree = self
            .parser
            .parse(source)
            .map_err(|source| TransformError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let outcome = self.engine.rename(&mut tree);
        if !outcome.changed {
            return Ok(Rewrite::Unchanged);
        }

        let text = self
            .printer
            .print(&tree, &mut self.parser)
            .map_err(|source| TransformError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        for rename in outcome.table.iter() {
            debug!(
                path = %path.display(),
                namespace = %rename.namespace,
                from = %rename.old,
                to = %rename.new,
                "declaration renamed"
            );
        }

        Ok(Rewrite::Changed {
            text,
            renames: outcome.table,
        })
    }

    /// Rewrite one file in place, or report what would change in a dry run
    pub fn process_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let content = fs::read(path).map_err(|source| TransformError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        match self.rewrite_source(path, &content)? {
            Rewrite::Generated => {
                debug!(path = %path.display(), "skipping generated file");
                Ok(FileOutcome::Generated)
            }
            Rewrite::Unchanged => Ok(FileOutcome::Unchanged),
            Rewrite::Changed { renames, .. } if self.config.dry_run => {
                Ok(FileOutcome::WouldModify { renames })
            }
            Rewrite::Changed { text, renames } => {
                self.writer
                    .write_source(path, &text)
                    .map_err(|source| TransformError::Write {
                        path: path.to_path_buf(),
                        source,
                    })?;
                Ok(FileOutcome::Modified { renames })
            }
        }
    }

    /// Process every source file under `root` in walk order. Failures are
    /// handed to `report` and never stop the run.
    pub fn run<F>(&mut self, root: &Path, mut report: F) -> RunSummary
    where
        F: FnMut(&Path, &Result<FileOutcome>),
    {
        let discovery = goexport_utils::collect_source_files(root, &self.config.source_filter());

        let mut summary = RunSummary {
            discovered: discovery.files.len(),
            walk_errors: discovery.errors.len(),
            ..RunSummary::default()
        };

        for path in &discovery.files {
            let outcome = self.process_file(path);
            if let Err(err) = &outcome {
                warn!(error = %err, "file skipped");
            }
            report(path, &outcome);
            summary.record(&outcome);
        }

        info!(
            discovered = summary.discovered,
            modified = summary.modified,
            unchanged = summary.unchanged,
            generated = summary.generated,
            failed = summary.failed,
            walk_errors = summary.walk_errors,
            dry_run = self.config.dry_run,
            "run finished"
        );

        summary
    }
}
