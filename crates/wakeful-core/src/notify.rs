//! Persistent notification boundary.
//!
//! The visible, actionable surface of a firing alarm: a notification
//! with Stop and Snooze actions, keyed by alarm id. Historical versions
//! of the app derived secondary notification ids from the alarm id for
//! each pending action, so complete cleanup must cover the whole
//! derived set plus a persisted last-shown-id record.

use log::warn;

use crate::alarm::AlarmId;
use crate::error::PresentationError;

/// Offsets added to an alarm id to derive every notification id ever
/// associated with it: the primary entry plus launch/stop/snooze
/// pending-action identifiers from current and earlier versions.
pub const NOTIFICATION_ID_OFFSETS: [i64; 6] = [0, 1000, 2000, 3000, 10_000, 20_000];

/// Every notification id that may be live for `id`.
pub fn related_notification_ids(id: AlarmId) -> [i64; 6] {
    let base = i64::from(id);
    NOTIFICATION_ID_OFFSETS.map(|offset| base + offset)
}

/// Actions attached to the firing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Stop,
    Snooze,
}

/// Shows and cancels the persistent firing notification.
///
/// `show` replaces any existing entry for the same id. Failures are
/// non-fatal to the firing transition; the alarm still sounds.
pub trait NotificationPresenter: Send {
    fn show(
        &mut self,
        id: AlarmId,
        title: &str,
        message: &str,
        actions: &[NotificationAction],
    ) -> Result<(), PresentationError>;

    /// Cancel a single notification id. Cancelling an id that is not
    /// showing is a no-op.
    fn cancel(&mut self, notification_id: i64);
}

/// Persisted "last shown notification id" record, keyed by alarm id.
/// Kept by the storage layer; cleared as part of cancellation.
pub trait NotificationIdTable {
    fn last_notification_id(&self, id: AlarmId) -> Option<i64>;
    fn record_notification_id(&mut self, id: AlarmId, notification_id: i64);
    fn clear_notification_id(&mut self, id: AlarmId);
}

/// Cancel every notification surface associated with `id`: the full
/// derived offset set plus any persisted last-shown id.
pub fn cancel_all_for_alarm(
    presenter: &mut dyn NotificationPresenter,
    table: &mut dyn NotificationIdTable,
    id: AlarmId,
) {
    for notification_id in related_notification_ids(id) {
        presenter.cancel(notification_id);
    }
    if let Some(saved) = table.last_notification_id(id) {
        presenter.cancel(saved);
        table.clear_notification_id(id);
    }
}

/// Show the firing notification, absorbing failures per the
/// best-effort multi-channel alert policy.
pub fn show_firing_notification(
    presenter: &mut dyn NotificationPresenter,
    table: &mut dyn NotificationIdTable,
    id: AlarmId,
    title: &str,
    message: &str,
) {
    let actions = [NotificationAction::Stop, NotificationAction::Snooze];
    match presenter.show(id, title, message, &actions) {
        Ok(()) => table.record_notification_id(id, i64::from(id)),
        Err(e) => warn!("notification for alarm {id} failed, firing without it: {e}"),
    }
}
