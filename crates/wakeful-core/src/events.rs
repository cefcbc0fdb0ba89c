use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;

/// Every lifecycle transition produces an Event.
/// The owning application polls for events and drives its UI from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// An alarm was armed (or re-armed) with the wake scheduler.
    AlarmArmed {
        id: AlarmId,
        next_trigger: NaiveDateTime,
        at: DateTime<Utc>,
    },
    /// An alarm's wake callback fired and the alarm entered Firing.
    /// The UI layer should surface the alarm screen.
    AlarmFired {
        id: AlarmId,
        title: String,
        message: String,
        snooze_count: u32,
        at: DateTime<Utc>,
    },
    /// An alarm was dismissed (user stop, exhausted snooze budget, or
    /// explicit cancel while firing).
    AlarmStopped {
        id: AlarmId,
        at: DateTime<Utc>,
    },
    /// An alarm was snoozed and re-armed for a later instant.
    AlarmSnoozed {
        id: AlarmId,
        next_trigger: NaiveDateTime,
        snooze_count: u32,
        at: DateTime<Utc>,
    },
    /// The device clock or timezone changed; all armed alarms were
    /// recomputed and re-armed.
    ClockChanged {
        rearmed: usize,
        at: DateTime<Utc>,
    },
}
