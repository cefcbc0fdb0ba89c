//! Core error types for wakeful-core.
//!
//! This module defines the error hierarchy using thiserror. Only
//! scheduling failures propagate out of the lifecycle; per-channel
//! failures (sound, haptics, notification) are absorbed and logged.

use std::path::PathBuf;
use thiserror::Error;

use crate::alarm::AlarmId;

/// Core error type for wakeful-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling-related errors (fatal to the arm attempt)
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] SchedulingError),

    /// Feedback-related errors (sound/vibration)
    #[error("Feedback error: {0}")]
    Feedback(#[from] FeedbackError),

    /// Notification presentation errors
    #[error("Presentation error: {0}")]
    Presentation(#[from] PresentationError),

    /// Lifecycle state errors
    #[error("State error: {0}")]
    State(#[from] StateError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the exact-wake scheduling collaborator.
///
/// These are fatal to the single arm attempt and are surfaced to the
/// caller without an automatic retry: retrying a permission failure
/// without user action cannot succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    /// The OS denied the exact-alarm scheduling permission
    #[error("Exact alarm scheduling permission denied")]
    PermissionDenied,

    /// The requested wake instant is not in the future
    #[error("Invalid wake time: {when_millis} is not after {now_millis}")]
    InvalidTime { when_millis: i64, now_millis: i64 },
}

/// Errors from the sound/vibration channels.
///
/// Non-fatal: the firing transition degrades to whatever subset of
/// channels succeeded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    /// No audio output device available
    #[error("No audio device available")]
    NoAudioDevice,

    /// Device has no haptic/vibration capability
    #[error("No haptic device available")]
    NoHapticDevice,

    /// The audio or haptic device is busy
    #[error("Feedback device busy: {0}")]
    DeviceBusy(String),

    /// Backend-specific failure
    #[error("Feedback backend failed: {0}")]
    Backend(String),
}

/// Errors from the notification surface.
///
/// Non-fatal: the alarm still fires via sound/vibration even if the
/// visible notification fails.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresentationError {
    /// Notification channel could not be created or is unavailable
    #[error("Notification channel unavailable: {0}")]
    ChannelUnavailable(String),

    /// Showing the notification failed
    #[error("Failed to show notification for alarm {alarm_id}: {message}")]
    ShowFailed { alarm_id: AlarmId, message: String },
}

/// Lifecycle state errors.
///
/// Produced internally when an action arrives for an unknown or
/// terminal alarm id; the dispatch surface maps these to no-ops, since
/// duplicate or late actions must never crash or corrupt other alarms.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// No runtime state exists for this alarm id
    #[error("No runtime state for alarm {0}")]
    UnknownAlarm(AlarmId),

    /// The action is not valid in the alarm's current phase
    #[error("Alarm {alarm_id} is in phase {phase}, action not applicable")]
    InvalidPhase { alarm_id: AlarmId, phase: String },
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to load the alarm store
    #[error("Failed to load alarm store from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save the alarm store
    #[error("Failed to save alarm store to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to parse persisted data
    #[error("Failed to parse persisted alarms: {0}")]
    ParseFailed(String),
}

/// Alarm definition validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Hour/minute outside the wall-clock range
    #[error("Invalid time of day: {hour:02}:{minute:02}")]
    InvalidTimeOfDay { hour: u32, minute: u32 },

    /// Custom recurrence with an empty weekday set
    #[error("Custom recurrence requires a non-empty weekday set")]
    EmptyWeekdaySet,

    /// Snooze duration must be positive
    #[error("Snooze duration must be positive, got {0}")]
    InvalidSnoozeDuration(u32),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
