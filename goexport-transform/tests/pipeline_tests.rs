//! End-to-end tests for the rewrite pipeline over real files

use std::fs;
use std::path::Path;

use goexport_transform::{FileOutcome, Namespace, RewriteConfig, Rewriter, SourceWriter, TransformError};
use proptest::prelude::*;
use tempfile::tempdir;

const FIXTURE: &str = include_str!("fixtures/shapes.go");
const GOLDEN: &str = include_str!("fixtures/shapes.go.golden");

fn config() -> RewriteConfig {
    RewriteConfig {
        gofmt: false,
        ..RewriteConfig::default()
    }
}

fn write(root: &Path, relative: &str, content: &str) -> std::io::Result<()> {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

#[test]
fn test_fixture_matches_golden() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let file = temp_dir.path().join("shapes.go");
    fs::write(&file, FIXTURE)?;

    let outcome = Rewriter::new(config())?.process_file(&file)?;

    let FileOutcome::Modified { renames } = outcome else {
        panic!("fixture should be modified");
    };
    assert_eq!(fs::read_to_string(&file)?, GOLDEN);
    assert_eq!(renames.lookup(Namespace::Package, "shape"), Some("Shape"));
    assert_eq!(renames.lookup(Namespace::Member, "radius"), Some("Radius"));
    assert_eq!(renames.lookup(Namespace::Package, "main"), None);
    Ok(())
}

#[test]
fn test_second_run_changes_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let file = temp_dir.path().join("shapes.go");
    fs::write(&file, GOLDEN)?;

    let outcome = Rewriter::new(config())?.process_file(&file)?;

    assert!(matches!(outcome, FileOutcome::Unchanged));
    assert_eq!(fs::read_to_string(&file)?, GOLDEN);
    Ok(())
}

#[test]
fn test_run_over_tree() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write(root, "a/shapes.go", FIXTURE)?;
    write(root, "b/done.go", "package b\n\nfunc Done() {}\n")?;
    write(root, "b/gen.go", "// Code generated by tool. DO NOT EDIT.\n\npackage b\n\nfunc gen() {}\n")?;
    write(root, "c/broken.go", "package c\n\nfunc broken( {\n")?;
    write(root, "vendor/dep/dep.go", "package dep\n\nfunc hidden() {}\n")?;
    write(root, "notes.txt", "func ignored() {}\n")?;

    let mut seen = Vec::new();
    let summary = Rewriter::new(config())?.run(root, |path, outcome| {
        let label = match outcome {
            Ok(FileOutcome::Modified { .. }) => "modified",
            Ok(FileOutcome::WouldModify { .. }) => "would modify",
            Ok(FileOutcome::Unchanged) => "unchanged",
            Ok(FileOutcome::Generated) => "generated",
            Err(err) => err.stage(),
        };
        let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        seen.push((relative, label));
    });

    let expected: Vec<(std::path::PathBuf, &str)> = vec![
        ("a/shapes.go".into(), "modified"),
        ("b/done.go".into(), "unchanged"),
        ("b/gen.go".into(), "generated"),
        ("c/broken.go".into(), "parse"),
    ];
    assert_eq!(seen, expected);

    assert_eq!(summary.discovered, 4);
    assert_eq!(summary.modified, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.generated, 1);
    assert_eq!(summary.failed, 1);

    assert_eq!(fs::read_to_string(root.join("a/shapes.go"))?, GOLDEN);
    assert_eq!(
        fs::read_to_string(root.join("b/gen.go"))?,
        "// Code generated by tool. DO NOT EDIT.\n\npackage b\n\nfunc gen() {}\n"
    );
    assert_eq!(fs::read_to_string(root.join("c/broken.go"))?, "package c\n\nfunc broken( {\n");
    assert_eq!(
        fs::read_to_string(root.join("vendor/dep/dep.go"))?,
        "package dep\n\nfunc hidden() {}\n"
    );
    Ok(())
}

#[test]
fn test_dry_run_leaves_files_alone() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let file = temp_dir.path().join("shapes.go");
    fs::write(&file, FIXTURE)?;

    let mut rewriter = Rewriter::new(RewriteConfig {
        dry_run: true,
        ..config()
    })?;
    let outcome = rewriter.process_file(&file)?;

    assert!(matches!(outcome, FileOutcome::WouldModify { .. }));
    assert!(outcome.is_change());
    assert_eq!(fs::read_to_string(&file)?, FIXTURE);
    Ok(())
}

#[test]
fn test_missing_file_is_a_read_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let missing = temp_dir.path().join("gone.go");

    let err = Rewriter::new(config())?.process_file(&missing).unwrap_err();

    assert!(matches!(err, TransformError::Read { .. }));
    assert_eq!(err.stage(), "read");
    assert!(err.to_string().contains("gone.go"));
    Ok(())
}

#[derive(Debug)]
struct FullDisk;

impl SourceWriter for FullDisk {
    fn write_source(&mut self, _path: &Path, _text: &str) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left on device"))
    }
}

#[test]
fn test_failed_write_is_reported_and_file_kept() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = tempdir()?;
    let root = temp_dir.path();
    write(root, "locked.go", "package p\n\nfunc locked() {}\n")?;
    write(root, "done.go", "package p\n\nfunc Done() {}\n")?;

    let mut rewriter = Rewriter::new(config())?.with_writer(FullDisk);
    let err = rewriter.process_file(&root.join("locked.go")).unwrap_err();
    assert_eq!(err.stage(), "write");
    assert!(matches!(err, TransformError::Write { .. }));
    assert_eq!(fs::read_to_string(root.join("locked.go"))?, "package p\n\nfunc locked() {}\n");

    let summary = rewriter.run(root, |_, _| {});
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.unchanged, 1);
    assert!(summary.has_failures());
    Ok(())
}

fn go_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}".prop_filter("not reserved", |name| {
        !goexport_transform::names::is_reserved(name) && name != "main" && name != "init"
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_rewrite_is_idempotent(
        func in go_name(),
        ty in go_name(),
        field in go_name(),
    ) {
        prop_assume!(func != ty && func != field && ty != field);
        let source = format!(
            "package p\n\ntype {ty} struct {{\n\t{field} int\n}}\n\nfunc {func}(v {ty}) int {{\n\treturn v.{field}\n}}\n\nvar zero = {func}({ty}{{{field}: 0}})\n"
        );

        let mut rewriter = Rewriter::new(config()).unwrap();
        let first = rewriter.rewrite_source(Path::new("p.go"), source.as_bytes()).unwrap();
        let goexport_transform::Rewrite::Changed { text, .. } = first else {
            panic!("lowercase declarations must change");
        };

        let second = rewriter.rewrite_source(Path::new("p.go"), text.as_bytes()).unwrap();
        prop_assert!(matches!(second, goexport_transform::Rewrite::Unchanged));
    }
}
