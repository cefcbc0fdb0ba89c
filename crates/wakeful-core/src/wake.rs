//! Exact-wake scheduling boundary.
//!
//! The OS primitive that wakes the process at an absolute instant even
//! while the device is idle. The core never implements it; it only
//! arms and cancels callbacks through this trait.

use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmDefinition, AlarmId};
use crate::error::SchedulingError;

/// Parameters delivered back with the wake callback, so the firing path
/// has everything it needs without a persistence read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WakePayload {
    pub title: String,
    pub message: String,
    pub max_snoozes: u32,
    pub snooze_duration_min: u32,
}

impl WakePayload {
    pub fn from_definition(def: &AlarmDefinition) -> Self {
        Self {
            title: def.title.clone(),
            message: def.message.clone(),
            max_snoozes: def.max_snoozes,
            snooze_duration_min: def.snooze_duration_min,
        }
    }
}

/// Schedules and cancels exact wake-up callbacks, keyed by alarm id.
///
/// `arm` for an already-armed id replaces the prior callback. Failures
/// are synchronous and fatal to the single arm attempt: the lifecycle
/// surfaces them to the caller and never retries automatically.
pub trait WakeScheduler: Send {
    /// Arm a wake callback at `when_millis` (device-local epoch millis).
    fn arm(
        &mut self,
        id: AlarmId,
        when_millis: i64,
        payload: &WakePayload,
    ) -> Result<(), SchedulingError>;

    /// Cancel any armed callback for `id`. No-op when none exists.
    fn cancel(&mut self, id: AlarmId);
}
