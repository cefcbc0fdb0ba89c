//! # Wakeful Core Library
//!
//! Core logic for the Wakeful wake-up alarm: recurrence calculation,
//! the alarm lifecycle state machine, and the single-owner feedback
//! controller, with the OS-level collaborators (exact-wake scheduling,
//! notifications, audio, haptics) behind trait boundaries.
//!
//! ## Architecture
//!
//! - **Recurrence**: pure next-occurrence calculation per alarm
//!   definition (once, daily, weekend, custom weekday sets)
//! - **Lifecycle**: a locked state machine driving
//!   `Scheduled -> Firing -> (Stopped | Snoozed -> Scheduled)`,
//!   idempotent under duplicate wake deliveries and safe against
//!   cancel/wake races
//! - **Feedback**: at most one sound+vibration session process-wide,
//!   best-effort per channel
//! - **Storage**: JSON alarm store and TOML configuration
//!
//! ## Key Components
//!
//! - [`AlarmLifecycle`]: the state machine and command surface
//! - [`next_occurrence`]: the recurrence calculator
//! - [`FeedbackController`]: sound/vibration session owner
//! - [`WakeScheduler`] / [`NotificationPresenter`] / [`AlarmStore`]:
//!   collaborator boundaries supplied by the embedding application

pub mod alarm;
pub mod boot;
pub mod error;
pub mod events;
pub mod feedback;
pub mod lifecycle;
pub mod notify;
pub mod recurrence;
pub mod storage;
pub mod wake;

pub use alarm::{AlarmDefinition, AlarmId, Recurrence, Weekday};
pub use boot::RestoreSummary;
pub use error::{
    CoreError, FeedbackError, PresentationError, SchedulingError, StateError, StorageError,
    ValidationError,
};
pub use events::Event;
pub use feedback::{FeedbackController, HapticBackend, SoundBackend};
pub use lifecycle::{AlarmLifecycle, AlarmRuntimeState, Command, Phase, SnoozeOutcome};
pub use notify::{NotificationAction, NotificationIdTable, NotificationPresenter};
pub use recurrence::next_occurrence;
pub use storage::{AlarmStore, Config, FileStore};
pub use wake::{WakePayload, WakeScheduler};
