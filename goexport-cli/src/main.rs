//! goexport command-line entry point
//!
//! Promotes unexported Go declarations under a file or directory to exported
//! form, rewriting files in place.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use goexport_transform::{FileOutcome, RewriteConfig, Rewriter};
use goexport_utils::{init_logging, LogLevel, LoggerConfig};

#[derive(Parser)]
#[command(name = "goexport")]
#[command(about = "Promote unexported Go identifiers to exported form")]
#[command(version)]
struct Cli {
    /// File or directory to rewrite
    path: Option<PathBuf>,

    /// Report files that would change without writing them
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short = 'c', long, env = "GOEXPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Keep the original layout instead of running gofmt
    #[arg(long)]
    no_gofmt: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn rewrite_config(&self) -> Result<RewriteConfig> {
        let mut config = match &self.config {
            Some(path) => RewriteConfig::from_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => RewriteConfig::default(),
        };
        if self.dry_run {
            config.dry_run = true;
        }
        if self.no_gofmt {
            config.gofmt = false;
        }
        Ok(config)
    }
}

fn report(path: &Path, outcome: &goexport_transform::Result<FileOutcome>) {
    match outcome {
        Ok(FileOutcome::Modified { .. }) => println!("Modified: {}", path.display()),
        Ok(FileOutcome::WouldModify { .. }) => println!("Would modify: {}", path.display()),
        Ok(FileOutcome::Unchanged | FileOutcome::Generated) => {}
        Err(err) => println!("Failed to {} file: {}", err.stage(), path.display()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(path) = cli.path.clone() else {
        println!("{}", Cli::command().render_usage());
        std::process::exit(1);
    };

    init_logging(LoggerConfig {
        level: LogLevel::from_verbosity(cli.verbose, cli.quiet),
        ..LoggerConfig::default()
    })?;

    let config = match cli.rewrite_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut rewriter = Rewriter::new(config).context("initializing Go parser")?;
    let summary = rewriter.run(&path, report);

    if summary.discovered == 0 && summary.walk_errors == 0 {
        info!(path = %path.display(), "no Go files found");
    }
    // Per-file failures are reported on stdout and never fail the run
    if summary.has_failures() {
        warn!(
            failed = summary.failed,
            unreadable = summary.walk_errors,
            "some files were left untouched"
        );
    }

    Ok(())
}
