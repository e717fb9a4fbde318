use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, info, warn};

use name_info_runtime::{decode_record, encode_record, CustomInfoRecord, UserId};

/// File name of the persisted custom-info mapping inside the config directory.
pub const CUSTOM_INFO_FILE_NAME: &str = "JFDCustomNameInfo_custominfo.txt";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("custom info requires a non-empty user id")]
    MissingUserId,
    #[error("failed to read custom info from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write custom info to {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Counts reported by [`AttributeStore::load`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// Per-user custom info, mirrored to a tab-delimited file after every mutation.
///
/// The in-memory mapping is authoritative. A failed save leaves it untouched
/// and reports the error; the change is lost only if the process restarts
/// before a later save succeeds.
#[derive(Debug)]
pub struct AttributeStore {
    path: PathBuf,
    entries: RwLock<HashMap<UserId, String>>,
    write_guard: Mutex<()>,
}

impl AttributeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
            write_guard: Mutex::new(()),
        }
    }

    pub fn in_config_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.join(CUSTOM_INFO_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the mapping with the file contents. A missing file yields an
    /// empty mapping; undecodable lines are skipped.
    pub fn load(&self) -> Result<LoadSummary, StoreError> {
        self.entries.write().clear();

        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!(
                    target: "name_info::store",
                    path = %self.path.display(),
                    "custom_info.loaded=missing_file"
                );
                return Ok(LoadSummary::default());
            }
            Err(source) => {
                return Err(StoreError::ReadFailed {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let contents = String::from_utf8_lossy(&bytes);
        let mut summary = LoadSummary::default();
        let mut loaded = HashMap::new();
        for (index, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match decode_record(line) {
                Ok(record) => {
                    loaded.insert(record.user_id, record.text);
                    summary.loaded += 1;
                }
                Err(err) => {
                    summary.skipped += 1;
                    warn!(
                        target: "name_info::store",
                        line = index + 1,
                        error = %err,
                        "custom_info.line_skipped"
                    );
                }
            }
        }
        *self.entries.write() = loaded;

        info!(
            target: "name_info::store",
            path = %self.path.display(),
            loaded = summary.loaded,
            skipped = summary.skipped,
            "custom_info.loaded=file"
        );
        Ok(summary)
    }

    pub fn get(&self, user_id: &UserId) -> Option<String> {
        self.entries.read().get(user_id).cloned()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.entries.read().contains_key(user_id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Stores `text` for the user, or removes the entry when `text` is empty,
    /// then saves. The mapping is updated even when the save fails.
    pub fn set(&self, user_id: &UserId, text: &str) -> Result<(), StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }
        {
            let mut entries = self.entries.write();
            if text.is_empty() {
                entries.remove(user_id);
            } else {
                entries.insert(user_id.clone(), text.to_string());
            }
        }
        self.save()
    }

    pub fn clear(&self, user_id: &UserId) -> Result<(), StoreError> {
        if user_id.is_empty() {
            return Err(StoreError::MissingUserId);
        }
        self.entries.write().remove(user_id);
        self.save()
    }

    /// Records sorted by user id.
    pub fn records(&self) -> Vec<CustomInfoRecord> {
        let mut records: Vec<CustomInfoRecord> = self
            .entries
            .read()
            .iter()
            .map(|(user_id, text)| CustomInfoRecord::new(user_id.clone(), text.clone()))
            .collect();
        records.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        records
    }

    /// Rewrites the whole file from the current mapping. The parent
    /// directory is never created.
    pub fn save(&self) -> Result<(), StoreError> {
        let _guard = self.write_guard.lock();
        let records = self.records();
        let mut contents = String::new();
        for record in &records {
            contents.push_str(&encode_record(record));
            contents.push('\n');
        }

        fs::write(&self.path, contents).map_err(|source| StoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;
        debug!(
            target: "name_info::store",
            path = %self.path.display(),
            records = records.len(),
            "custom_info.saved"
        );
        Ok(())
    }
}
