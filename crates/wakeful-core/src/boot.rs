//! Boot recovery.
//!
//! Exact wake callbacks do not survive a device restart, so on the
//! boot-completed signal every active persisted alarm must be re-armed
//! from scratch. The persisted form is a raw JSON array of alarm
//! definitions, bulk-loaded from the app-level store.

use serde_json::Value;

use crate::alarm::AlarmDefinition;
use crate::error::StorageError;

/// Counts from one boot-restore pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Alarms successfully re-armed.
    pub restored: usize,
    /// Inactive definitions and past-occurrence boundary skips.
    pub skipped: usize,
    /// Definitions that failed validation or arming.
    pub failed: usize,
}

/// Parse the persisted raw blob into alarm definitions.
///
/// Entries that fail to parse individually are dropped rather than
/// failing the whole restore: one corrupt record must not keep every
/// other alarm from ringing.
pub fn parse_definitions(blob: &[u8]) -> Result<Vec<AlarmDefinition>, StorageError> {
    let values: Vec<Value> =
        serde_json::from_slice(blob).map_err(|e| StorageError::ParseFailed(e.to_string()))?;
    let mut defs = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<AlarmDefinition>(value) {
            Ok(def) => defs.push(def),
            Err(e) => log::warn!("dropping unparseable persisted alarm: {e}"),
        }
    }
    Ok(defs)
}
