/*!
 * Common test utilities for the doctrans test suite
 */

use anyhow::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use doctrans::app_config::Config;


/// Page used by the end-to-end example scenario
pub const EXAMPLE_PAGE: &str =
    "<p>Hello world, see <code>ls -la</code> and http://example.com/file.tar.gz</p>";

/// Initialise logging once for the test binary; later calls are no-ops
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a file (and its parent directories) under `dir`
pub fn create_test_file(dir: &Path, relative_path: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(relative_path);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// A small documentation tree with nested pages, assets and an empty directory
pub fn create_sample_tree(root: &Path) -> Result<()> {
    create_test_file(
        root,
        "index.html",
        b"<!DOCTYPE html><html><head><title>Book</title></head><body><p>Welcome to the book.</p></body></html>",
    )?;
    create_test_file(root, "stylesheets/book.css", b"body { margin: 0 }")?;
    create_test_file(root, "images/logo.png", &[0x89, b'P', b'N', b'G', 0, 1, 2, 3])?;
    create_test_file(
        root,
        "chapter01/intro.html",
        b"<html><body><h1>Introduction</h1><pre>./configure --prefix=/usr</pre></body></html>",
    )?;
    create_test_file(
        root,
        "chapter01/deep/nested/page.HTM",
        b"<html><body><p>Deep page</p></body></html>",
    )?;
    create_test_file(root, "chapter01/deep/notes.txt", b"plain notes")?;
    fs::create_dir_all(root.join("empty/dir"))?;
    Ok(())
}

/// Relative paths of every directory and file below `root`
pub fn relative_tree(root: &Path) -> (BTreeSet<PathBuf>, BTreeSet<PathBuf>) {
    let mut directories = BTreeSet::new();
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).min_depth(1).into_iter().filter_map(|e| e.ok()) {
        let relative = entry.path().strip_prefix(root).unwrap().to_path_buf();
        if entry.file_type().is_dir() {
            directories.insert(relative);
        } else {
            files.insert(relative);
        }
    }
    (directories, files)
}

/// Configuration pointing at the given directories
pub fn test_config(source: &Path, destination: &Path, workers: usize) -> Config {
    Config {
        source_dir: source.to_string_lossy().into_owned(),
        destination_dir: destination.to_string_lossy().into_owned(),
        workers,
        ..Config::default()
    }
}
