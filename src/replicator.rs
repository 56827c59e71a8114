/*!
 * Source tree enumeration and destination layout.
 *
 * The replicator walks the source tree once, creates every directory in the
 * destination up front, and turns every file into a `WorkItem` for the
 * scheduler.
 */

use log::{debug, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::FilesystemError;
use crate::file_utils::FileManager;

/// One unit of work for the scheduler; immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    /// Opaque asset copied byte for byte
    CopyTask {
        source: PathBuf,
        destination: PathBuf,
    },
    /// HTML document to translate
    TranslateTask {
        source: PathBuf,
        destination: PathBuf,
        source_language: String,
        target_language: String,
    },
}

impl WorkItem {
    pub fn source(&self) -> &Path {
        match self {
            Self::CopyTask { source, .. } | Self::TranslateTask { source, .. } => source,
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            Self::CopyTask { destination, .. } | Self::TranslateTask { destination, .. } => {
                destination
            }
        }
    }

    pub fn is_translation(&self) -> bool {
        matches!(self, Self::TranslateTask { .. })
    }
}

/// An enumerated entry, relative to the source root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub relative_path: PathBuf,
    pub is_dir: bool,
    pub is_html: bool,
}

/// A walk error below the root; recorded, never fatal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumerationFailure {
    pub path: PathBuf,
    pub cause: String,
}

/// Result of preparing the destination tree
#[derive(Debug, Default)]
pub struct ReplicationPlan {
    pub work_items: Vec<WorkItem>,
    pub directories_created: usize,
    pub enumeration_failures: Vec<EnumerationFailure>,
}

impl ReplicationPlan {
    pub fn copy_count(&self) -> usize {
        self.work_items.iter().filter(|item| !item.is_translation()).count()
    }

    pub fn translation_count(&self) -> usize {
        self.work_items.iter().filter(|item| item.is_translation()).count()
    }
}

/// Lazily walk everything below `source_root`, following symlinks.
///
/// Each directory and file is yielded once; the root itself is not. The
/// iterator cannot be restarted.
pub fn enumerate(
    source_root: &Path,
) -> impl Iterator<Item = Result<TreeEntry, walkdir::Error>> + '_ {
    WalkDir::new(source_root)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .map(move |entry| {
            let entry = entry?;
            let relative_path = entry
                .path()
                .strip_prefix(source_root)
                .unwrap_or(entry.path())
                .to_path_buf();
            let is_dir = entry.file_type().is_dir();
            Ok(TreeEntry {
                is_html: !is_dir && FileManager::is_html_file(&relative_path),
                is_dir,
                relative_path,
            })
        })
}

/// Mirrors a source tree into a destination tree
#[derive(Debug, Clone)]
pub struct TreeReplicator {
    source_root: PathBuf,
    destination_root: PathBuf,
    source_language: String,
    target_language: String,
}

impl TreeReplicator {
    pub fn new(
        source_root: impl Into<PathBuf>,
        destination_root: impl Into<PathBuf>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
        }
    }

    /// Create every destination directory and classify every file.
    ///
    /// Fails only when the source root cannot be read or a destination
    /// directory cannot be created; anything else unreadable below the root is
    /// recorded in `enumeration_failures`.
    pub fn plan(&self) -> Result<ReplicationPlan, FilesystemError> {
        std::fs::read_dir(&self.source_root).map_err(|e| FilesystemError::Walk {
            path: self.source_root.clone(),
            message: e.to_string(),
        })?;
        FileManager::ensure_dir(&self.destination_root)?;

        let mut plan = ReplicationPlan::default();

        for entry in enumerate(&self.source_root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(FilesystemError::Walk {
                        path: self.source_root.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.source_root.clone());
                    warn!("Skipping unreadable entry {:?}: {}", path, e);
                    plan.enumeration_failures.push(EnumerationFailure {
                        path,
                        cause: e.to_string(),
                    });
                    continue;
                }
            };

            let source = self.source_root.join(&entry.relative_path);
            let destination = self.destination_root.join(&entry.relative_path);

            if entry.is_dir {
                FileManager::ensure_dir(&destination)?;
                plan.directories_created += 1;
                continue;
            }

            if !FileManager::file_exists(&source) {
                warn!("Skipping {:?}: not a regular file", source);
                continue;
            }

            let item = if entry.is_html {
                WorkItem::TranslateTask {
                    source,
                    destination,
                    source_language: self.source_language.clone(),
                    target_language: self.target_language.clone(),
                }
            } else {
                WorkItem::CopyTask {
                    source,
                    destination,
                }
            };
            plan.work_items.push(item);
        }

        debug!(
            "Planned {} directories, {} copies, {} translations",
            plan.directories_created,
            plan.copy_count(),
            plan.translation_count()
        );
        Ok(plan)
    }
}
