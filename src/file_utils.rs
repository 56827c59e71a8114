use std::fs::{self, FileTimes, Permissions};
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile};

use crate::errors::FilesystemError;

// @module: File and directory utilities

const TEMP_PREFIX: &str = ".doctrans-";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed; idempotent
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), FilesystemError> {
        let path = path.as_ref();
        fs::create_dir_all(path).map_err(|source| FilesystemError::CreateDir {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Recursively delete `path` if it exists.
    ///
    /// Returns whether something was removed.
    pub fn remove_tree_if_exists<P: AsRef<Path>>(path: P) -> Result<bool, FilesystemError> {
        let path = path.as_ref();
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(source) => {
                return Err(FilesystemError::RemoveTree {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let result = if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        };
        result.map_err(|source| FilesystemError::RemoveTree {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(true)
    }

    /// Copy a file with its permissions and access/modification times.
    ///
    /// The data lands in a temporary sibling first and is renamed into place,
    /// so `to` is either absent or complete.
    pub fn copy_file_with_metadata<P1: AsRef<Path>, P2: AsRef<Path>>(
        from: P1,
        to: P2,
    ) -> Result<(), FilesystemError> {
        let from = from.as_ref();
        let to = to.as_ref();
        let copy_error = |source| FilesystemError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        };

        let metadata = fs::metadata(from).map_err(copy_error)?;
        let temp = Self::temp_sibling(to).map_err(copy_error)?;

        // fs::copy carries the permission bits over
        fs::copy(from, temp.path()).map_err(copy_error)?;

        let times = FileTimes::new()
            .set_accessed(metadata.accessed().map_err(copy_error)?)
            .set_modified(metadata.modified().map_err(copy_error)?);
        temp.as_file().set_times(times).map_err(copy_error)?;

        temp.persist(to).map_err(|e| copy_error(e.error))?;
        Ok(())
    }

    /// Write `contents` to `path` through a temporary sibling and rename.
    pub fn write_atomically<P: AsRef<Path>>(
        path: P,
        contents: &[u8],
        permissions: Option<Permissions>,
    ) -> Result<(), FilesystemError> {
        let path = path.as_ref();
        let write_error = |source| FilesystemError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut temp = Self::temp_sibling(path).map_err(write_error)?;
        temp.write_all(contents).map_err(write_error)?;
        temp.as_file().sync_all().map_err(write_error)?;
        if let Some(permissions) = permissions {
            fs::set_permissions(temp.path(), permissions).map_err(write_error)?;
        }

        temp.persist(path).map_err(|e| write_error(e.error))?;
        Ok(())
    }

    /// True for `.html` / `.htm`, case-insensitively
    pub fn is_html_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
            })
            .unwrap_or(false)
    }

    fn temp_sibling(path: &Path) -> std::io::Result<NamedTempFile> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        Builder::new().prefix(TEMP_PREFIX).tempfile_in(parent)
    }
}
