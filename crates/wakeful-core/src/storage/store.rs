//! Alarm definition persistence.
//!
//! The original app kept alarm definitions as a JSON array in an
//! app-level key-value store, alongside a small side table of
//! last-shown notification ids. [`FileStore`] reproduces that model as
//! a single JSON file with write-through mutations.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmDefinition, AlarmId};
use crate::error::StorageError;
use crate::notify::NotificationIdTable;

/// Persistence boundary for alarm definitions.
///
/// The lifecycle reads definitions and the notification-id side table
/// through this trait; it never interprets the backing schema.
pub trait AlarmStore: NotificationIdTable + Send {
    fn load_all(&self) -> Result<Vec<AlarmDefinition>, StorageError>;

    /// Definitions with `is_active = true`. Inactive definitions are
    /// never scheduled.
    fn load_active(&self) -> Result<Vec<AlarmDefinition>, StorageError> {
        Ok(self
            .load_all()?
            .into_iter()
            .filter(|d| d.is_active)
            .collect())
    }

    /// Insert or replace a definition by id.
    fn save(&mut self, def: &AlarmDefinition) -> Result<(), StorageError>;

    /// Remove a definition. Removing an unknown id is a no-op.
    fn delete(&mut self, id: AlarmId) -> Result<(), StorageError>;

    /// The raw persisted alarm array as JSON bytes, for boot-time bulk
    /// restore through [`crate::boot`].
    fn load_raw_blob(&self) -> Result<Vec<u8>, StorageError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    alarms: Vec<AlarmDefinition>,
    /// Last shown notification id per alarm id.
    #[serde(default)]
    notification_ids: HashMap<AlarmId, i64>,
}

/// JSON-file-backed [`AlarmStore`].
pub struct FileStore {
    path: PathBuf,
    state: StoreFile,
}

impl FileStore {
    /// Open (or create) the store at the default location,
    /// `data_dir()/alarms.json`.
    pub fn open_default() -> Result<Self, StorageError> {
        let dir = super::data_dir().map_err(|e| StorageError::LoadFailed {
            path: PathBuf::from("~/.config/wakeful"),
            message: e.to_string(),
        })?;
        Self::open(dir.join("alarms.json"))
    }

    /// Open (or create) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read(&path) {
            Ok(bytes) => {
                serde_json::from_slice(&bytes).map_err(|e| StorageError::ParseFailed(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreFile::default(),
            Err(e) => {
                return Err(StorageError::LoadFailed {
                    path,
                    message: e.to_string(),
                })
            }
        };
        Ok(Self { path, state })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(&self.state)
            .map_err(|e| StorageError::ParseFailed(e.to_string()))?;
        fs::write(&self.path, bytes).map_err(|e| StorageError::SaveFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

impl AlarmStore for FileStore {
    fn load_all(&self) -> Result<Vec<AlarmDefinition>, StorageError> {
        Ok(self.state.alarms.clone())
    }

    fn save(&mut self, def: &AlarmDefinition) -> Result<(), StorageError> {
        match self.state.alarms.iter_mut().find(|a| a.id == def.id) {
            Some(existing) => *existing = def.clone(),
            None => self.state.alarms.push(def.clone()),
        }
        self.flush()
    }

    fn delete(&mut self, id: AlarmId) -> Result<(), StorageError> {
        self.state.alarms.retain(|a| a.id != id);
        self.state.notification_ids.remove(&id);
        self.flush()
    }

    fn load_raw_blob(&self) -> Result<Vec<u8>, StorageError> {
        serde_json::to_vec(&self.state.alarms)
            .map_err(|e| StorageError::ParseFailed(e.to_string()))
    }
}

impl NotificationIdTable for FileStore {
    fn last_notification_id(&self, id: AlarmId) -> Option<i64> {
        self.state.notification_ids.get(&id).copied()
    }

    fn record_notification_id(&mut self, id: AlarmId, notification_id: i64) {
        self.state.notification_ids.insert(id, notification_id);
        if let Err(e) = self.flush() {
            warn!("could not persist notification id for alarm {id}: {e}");
        }
    }

    fn clear_notification_id(&mut self, id: AlarmId) {
        if self.state.notification_ids.remove(&id).is_some() {
            if let Err(e) = self.flush() {
                warn!("could not clear notification id for alarm {id}: {e}");
            }
        }
    }
}
