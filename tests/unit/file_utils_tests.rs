/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::fs;
use std::time::{Duration, SystemTime};

use crate::common;
use doctrans::errors::FilesystemError;
use doctrans::file_utils::FileManager;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "present.txt", b"content")?;

    assert!(FileManager::file_exists(&test_file));
    assert!(!FileManager::dir_exists(&test_file));
    Ok(())
}

#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

#[test]
fn test_is_html_file_withMixedExtensions_shouldMatchCaseInsensitively() {
    assert!(FileManager::is_html_file("index.html"));
    assert!(FileManager::is_html_file("chapter/page.HTM"));
    assert!(FileManager::is_html_file("a.Html"));
    assert!(!FileManager::is_html_file("style.css"));
    assert!(!FileManager::is_html_file("page.xhtml"));
    assert!(!FileManager::is_html_file("html"));
}

#[test]
fn test_ensure_dir_withNestedPath_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a/b/c");

    FileManager::ensure_dir(&nested)?;
    FileManager::ensure_dir(&nested)?;

    assert!(FileManager::dir_exists(&nested));
    Ok(())
}

#[test]
fn test_remove_tree_if_exists_withMissingPath_shouldReturnFalse() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    assert!(!FileManager::remove_tree_if_exists(temp_dir.path().join("missing"))?);
    Ok(())
}

#[test]
fn test_remove_tree_if_exists_withPopulatedTree_shouldRemoveEverything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("tree");
    common::create_sample_tree(&root)?;

    assert!(FileManager::remove_tree_if_exists(&root)?);
    assert!(!root.exists());
    Ok(())
}

#[test]
fn test_copy_file_with_metadata_shouldPreserveBytesAndModificationTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let bytes = [0u8, 159, 146, 150, 255, b'\n'];
    let source = common::create_test_file(temp_dir.path(), "in/blob.bin", &bytes)?;

    let past = SystemTime::now() - Duration::from_secs(3 * 24 * 3600);
    fs::File::options()
        .write(true)
        .open(&source)?
        .set_modified(past)?;

    let destination = temp_dir.path().join("blob.bin");
    FileManager::copy_file_with_metadata(&source, &destination)?;

    assert_eq!(fs::read(&destination)?, bytes);
    let copied_mtime = fs::metadata(&destination)?.modified()?;
    let delta = copied_mtime
        .duration_since(past)
        .unwrap_or_else(|e| e.duration());
    assert!(delta < Duration::from_secs(1), "mtime drifted by {:?}", delta);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_copy_file_with_metadata_shouldPreservePermissions() -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "tool.sh", b"#!/bin/sh\n")?;
    fs::set_permissions(&source, fs::Permissions::from_mode(0o750))?;

    let destination = temp_dir.path().join("copy.sh");
    FileManager::copy_file_with_metadata(&source, &destination)?;

    let mode = fs::metadata(&destination)?.permissions().mode() & 0o777;
    assert_eq!(mode, 0o750);
    Ok(())
}

#[test]
fn test_copy_file_with_metadata_withMissingSource_shouldReturnCopyError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = FileManager::copy_file_with_metadata(
        temp_dir.path().join("missing.png"),
        temp_dir.path().join("out.png"),
    );

    assert!(matches!(result, Err(FilesystemError::Copy { .. })));
    assert!(!temp_dir.path().join("out.png").exists());
    Ok(())
}

#[test]
fn test_write_atomically_shouldReplaceContentAndLeaveNoTempFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let target = common::create_test_file(temp_dir.path(), "page.html", b"old")?;

    FileManager::write_atomically(&target, b"new content", None)?;

    assert_eq!(fs::read_to_string(&target)?, "new content");
    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".doctrans-"))
        .collect();
    assert!(leftovers.is_empty());
    Ok(())
}
