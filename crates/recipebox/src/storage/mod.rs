//! Storage layer for recipebox.
//!
//! This module provides a YAML document store for one record collection. The
//! whole collection is held in memory and every mutation rewrites the
//! document:
//! - Documents are validated against the collection schema on open
//! - Invalid documents are backed up and replaced with an empty collection
//! - Writes go to a temporary file that is renamed over the document
//! - One lock per store serializes mutate-then-persist sequences

pub mod backup;
pub mod ids;
pub mod schema;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::record::Record;

use self::backup::{BackupKind, BackupManager};
use self::ids::IdAllocator;
use self::schema::{keyed, SchemaError, SchemaValidator};

/// Options controlling how a store is opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Copy an existing document into `backup/` before loading it.
    pub backup_on_open: bool,
}

/// What happened while a store was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No document existed; an empty one was written.
    Created,
    /// An existing document was loaded.
    Loaded {
        /// Number of records loaded.
        records: usize,
    },
    /// The document was invalid and has been replaced with an empty one.
    Recovered {
        /// Where the invalid document was copied, if the copy succeeded.
        backup: Option<PathBuf>,
        /// Every schema violation that was found.
        reasons: Vec<String>,
    },
}

impl LoadOutcome {
    /// Check whether the loaded document was discarded.
    #[must_use]
    pub fn is_recovered(&self) -> bool {
        matches!(self, Self::Recovered { .. })
    }
}

/// In-memory state guarded by the store lock.
#[derive(Debug)]
struct StoreState<R> {
    records: Vec<R>,
    ids: IdAllocator,
}

/// Document-backed store for one record collection.
///
/// Exclusively owns its in-memory collection. Query layers borrow the store
/// and go through [`read`](Self::read) and `write`.
#[derive(Debug)]
pub struct RecordStore<R: Record> {
    /// Path to the document file.
    path: PathBuf,
    /// Schema for this collection.
    validator: SchemaValidator,
    /// Result of the load performed by `open`.
    outcome: LoadOutcome,
    /// Backup written at open time, if any.
    routine_backup: Option<PathBuf>,
    /// Records and id allocator.
    state: RwLock<StoreState<R>>,
}

impl<R: Record> RecordStore<R> {
    /// Open the document at `path` without a routine backup.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, StoreOptions::default())
    }

    /// Open or create the document at `path`.
    ///
    /// A missing document is created empty. An existing one is optionally
    /// backed up, then parsed and validated. A document that fails validation
    /// is copied to an `incompatible` backup and replaced with an empty
    /// collection; that data loss is logged at `warn` and reported through
    /// [`outcome`](Self::outcome) rather than failing the open.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or written, or if the
    /// backup directory cannot be created.
    pub fn open_with(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let validator = SchemaValidator::for_record::<R>()?;
        let backups = BackupManager::new();
        let mut routine_backup = None;

        let created = if path.exists() {
            if options.backup_on_open {
                routine_backup = backups.backup(&path, BackupKind::Routine)?;
            }
            false
        } else {
            info!("Creating empty {} document at {}", R::COLLECTION, path.display());
            write_document(&path, &validator.empty_document())?;
            true
        };

        debug!("Loading {} document from {}", R::COLLECTION, path.display());
        let (records, outcome) = match load_document::<R>(&path, &validator)? {
            Ok(records) if created => (records, LoadOutcome::Created),
            Ok(records) => {
                let count = records.len();
                (records, LoadOutcome::Loaded { records: count })
            }
            Err(err) => {
                warn!(
                    "Document {} cannot be validated, replacing it with an empty {} collection: {}",
                    path.display(),
                    R::COLLECTION,
                    err
                );
                let backup = backups.backup(&path, BackupKind::Incompatible)?;
                if backup.is_none() {
                    warn!("Discarding {} without a backup", path.display());
                }
                write_document(&path, &validator.empty_document())?;
                (
                    Vec::new(),
                    LoadOutcome::Recovered {
                        backup,
                        reasons: err.reasons,
                    },
                )
            }
        };

        let ids = IdAllocator::seed(records.iter().filter_map(Record::record_id));
        info!(
            "Opened {} store at {} with {} records",
            R::COLLECTION,
            path.display(),
            records.len()
        );

        Ok(Self {
            path,
            validator,
            outcome,
            routine_backup,
            state: RwLock::new(StoreState { records, ids }),
        })
    }

    /// Get the path to the document file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the stored collection.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        R::COLLECTION
    }

    /// What happened while the store was opened.
    #[must_use]
    pub fn outcome(&self) -> &LoadOutcome {
        &self.outcome
    }

    /// Backup written when the store was opened, if any.
    #[must_use]
    pub fn routine_backup(&self) -> Option<&Path> {
        self.routine_backup.as_deref()
    }

    /// Run `f` against the current records under the read lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn read<T>(&self, f: impl FnOnce(&[R]) -> T) -> Result<T> {
        let state = self.state.read()?;
        Ok(f(&state.records))
    }

    /// Clone the current records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn snapshot(&self) -> Result<Vec<R>> {
        self.read(<[R]>::to_vec)
    }

    /// Number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn len(&self) -> Result<usize> {
        self.read(<[R]>::len)
    }

    /// Check whether the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn is_empty(&self) -> Result<bool> {
        self.read(<[R]>::is_empty)
    }

    /// The id the allocator will hand out next.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if a writer panicked.
    pub fn next_id(&self) -> Result<Option<i64>> {
        Ok(self.state.read()?.ids.peek())
    }

    /// Apply a mutation and persist it.
    ///
    /// Holds the write lock for the whole sequence. `f` works on a copy of
    /// the records and allocator; the copy is validated against the schema,
    /// written to disk, and only then replaces the in-memory state. Any error
    /// leaves the store unchanged.
    pub(crate) fn write<T>(
        &self,
        f: impl FnOnce(&mut Vec<R>, &mut IdAllocator) -> Result<T>,
    ) -> Result<T> {
        let mut state = self.state.write()?;
        let mut records = state.records.clone();
        let mut ids = state.ids;

        let output = f(&mut records, &mut ids)?;

        let document = encode_document(&records)?;
        self.validator.validate(&document)?;
        write_document(&self.path, &document)?;

        *state = StoreState { records, ids };
        Ok(output)
    }

    /// Rewrite the document from the in-memory collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection no longer validates or the document
    /// cannot be written.
    pub fn save(&self) -> Result<()> {
        let state = self.state.write()?;
        let document = encode_document(&state.records)?;
        self.validator.validate(&document)?;
        write_document(&self.path, &document)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the document cannot be inspected and
    /// [`Error::LockPoisoned`] if a writer panicked.
    pub fn stats(&self) -> Result<StoreStats> {
        let state = self.state.read()?;
        let document_size_bytes = fs::metadata(&self.path)?.len();

        Ok(StoreStats {
            collection: R::COLLECTION,
            total_records: state.records.len(),
            next_id: state.ids.peek(),
            document_size_bytes,
        })
    }
}

/// Statistics about a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Name of the stored collection.
    pub collection: &'static str,
    /// Total number of records stored.
    pub total_records: usize,
    /// Id the allocator will hand out next.
    pub next_id: Option<i64>,
    /// Size of the document file in bytes.
    pub document_size_bytes: u64,
}

/// Read, parse and validate a document.
///
/// The outer error is an I/O failure; the inner one means the content is
/// unusable and should be recovered from.
fn load_document<R: Record>(
    path: &Path,
    validator: &SchemaValidator,
) -> Result<std::result::Result<Vec<R>, SchemaError>> {
    let bytes = fs::read(path).map_err(|source| Error::DocumentRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut document: Value = match serde_yaml::from_slice(&bytes) {
        Ok(document) => document,
        Err(err) => return Ok(Err(SchemaError::new(vec![format!("invalid YAML: {err}")]))),
    };

    if let Err(err) = validator.validate(&document) {
        return Ok(Err(err));
    }

    let duplicates = validator.duplicates(&document);
    if !duplicates.is_empty() {
        warn!(
            "Document {} repeats {} values: {}",
            path.display(),
            validator.unique_field(),
            duplicates.join(", ")
        );
    }

    let items = document
        .get_mut(R::COLLECTION)
        .map(Value::take)
        .unwrap_or_default();
    Ok(serde_json::from_value(items)
        .map_err(|err| SchemaError::new(vec![format!("cannot decode records: {err}")])))
}

/// Build the document value for a collection.
fn encode_document<R: Record>(records: &[R]) -> Result<Value> {
    Ok(keyed(R::COLLECTION, serde_json::to_value(records)?))
}

/// Write `document` to a temporary sibling of `path`, then rename it over
/// `path`.
fn write_document(path: &Path, document: &Value) -> Result<()> {
    let yaml = serde_yaml::to_string(document)?;
    let temp = temp_path(path);

    replace_file(&temp, path, yaml.as_bytes()).map_err(|source| {
        let _ = fs::remove_file(&temp);
        Error::DocumentWrite {
            path: path.to_path_buf(),
            source,
        }
    })
}

fn replace_file(temp: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp)?;
    file.write_all(contents)?;
    file.sync_all()?;
    fs::rename(temp, target)
}

/// Hidden temporary file next to `path`.
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "document".into(), |n| n.to_string_lossy());
    path.with_file_name(format!(".{name}.tmp"))
}
