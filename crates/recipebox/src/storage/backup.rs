//! Timestamped document backups.
//!
//! Backups land in a `backup/` directory next to the document and are named
//! `<stem>[-<tag>]-<YYYY-MM-DD-HH-MM>.<ext>`. A backup taken twice within the
//! same minute overwrites the earlier copy.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Name of the directory backups are written to.
pub const BACKUP_DIR_NAME: &str = "backup";

/// Minute-resolution suffix appended to backup file names.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M";

/// Why a backup is being taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackupKind {
    /// Snapshot taken when a store is opened.
    Routine,
    /// Copy of a document that failed validation and is about to be discarded.
    Incompatible,
}

impl BackupKind {
    /// Tag inserted into the file name, if any.
    #[must_use]
    pub fn tag(self) -> Option<&'static str> {
        match self {
            Self::Routine => None,
            Self::Incompatible => Some("incompatible"),
        }
    }
}

impl std::fmt::Display for BackupKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Routine => write!(f, "routine"),
            Self::Incompatible => write!(f, "incompatible"),
        }
    }
}

/// Writes backups of a document file.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupManager;

impl BackupManager {
    /// Create a backup manager.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Copy `file` into its sibling `backup/` directory.
    ///
    /// Returns the path of the copy, or `None` if the copy itself failed;
    /// that failure is logged and never retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the backup directory cannot be
    /// created.
    pub fn backup(&self, file: &Path, kind: BackupKind) -> Result<Option<PathBuf>> {
        self.backup_at(file, kind, Local::now())
    }

    /// Like [`backup`](Self::backup) with an explicit timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the backup directory cannot be
    /// created.
    pub fn backup_at(
        &self,
        file: &Path,
        kind: BackupKind,
        at: DateTime<Local>,
    ) -> Result<Option<PathBuf>> {
        let target = backup_path(file, kind, at);
        if let Some(dir) = target.parent() {
            std::fs::create_dir_all(dir).map_err(|source| Error::DirectoryCreate {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        match std::fs::copy(file, &target) {
            Ok(_) => {
                info!("Wrote {} backup of {} to {}", kind, file.display(), target.display());
                Ok(Some(target))
            }
            Err(err) => {
                warn!("Failed to back up {} to {}: {}", file.display(), target.display(), err);
                Ok(None)
            }
        }
    }
}

/// Compute where a backup of `file` taken at `at` would be written.
#[must_use]
pub fn backup_path(file: &Path, kind: BackupKind, at: DateTime<Local>) -> PathBuf {
    let parent = file.parent().unwrap_or_else(|| Path::new(""));
    let stem = file
        .file_stem()
        .map_or_else(|| "document".into(), |s| s.to_string_lossy());

    let mut name = stem.into_owned();
    if let Some(tag) = kind.tag() {
        name.push('-');
        name.push_str(tag);
    }
    name.push('-');
    name.push_str(&at.format(TIMESTAMP_FORMAT).to_string());
    if let Some(ext) = file.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }

    parent.join(BACKUP_DIR_NAME).join(name)
}
