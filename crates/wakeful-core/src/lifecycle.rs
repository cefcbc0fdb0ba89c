//! Alarm lifecycle state machine.
//!
//! Orchestrates the full life of an alarm:
//!
//! ```text
//! Idle -> Scheduled -> Firing -> (Stopped | Snoozed -> Scheduled)
//! ```
//!
//! The wake callback may arrive on a different thread than the user's
//! stop/snooze actions, so all runtime state lives behind a mutex and
//! every operation is a single locked transition. The later of two
//! racing operations to take the lock determines the final state;
//! `cancel` removes the runtime entry, which turns any late wake
//! callback for the same id into a no-op.
//!
//! Per-channel failures (sound, haptics, notification) are logged and
//! absorbed: the alarm wakes the user through whatever subset of
//! channels succeeded. Only scheduling failures propagate, because an
//! alarm that silently fails to arm defeats the product's purpose.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{Duration, Local, NaiveDateTime, TimeZone, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmDefinition, AlarmId};
use crate::boot::{self, RestoreSummary};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::feedback::FeedbackController;
use crate::notify::{self, NotificationPresenter};
use crate::recurrence::next_occurrence;
use crate::storage::AlarmStore;
use crate::wake::{WakePayload, WakeScheduler};

/// Lifecycle phase of an armed-or-firing alarm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Scheduled,
    Firing,
    /// Snooze accepted but the re-arm failed; neither scheduled nor
    /// firing. A successful snooze goes straight back to `Scheduled`.
    Snoozed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Scheduled => "scheduled",
            Phase::Firing => "firing",
            Phase::Snoozed => "snoozed",
        }
    }
}

/// Per-alarm runtime state, created on arm and destroyed on stop or
/// cancel. Carries a copy of the definition so snooze re-arms and wake
/// payloads need no persistence read.
#[derive(Debug, Clone)]
pub struct AlarmRuntimeState {
    pub phase: Phase,
    /// 0 at first fire, incremented per snooze, capped at max_snoozes.
    pub snooze_count: u32,
    pub next_trigger: NaiveDateTime,
    def: AlarmDefinition,
}

impl AlarmRuntimeState {
    pub fn definition(&self) -> &AlarmDefinition {
        &self.def
    }
}

/// Externally-triggered commands: the only entry points into the
/// lifecycle from the process boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// The wake scheduler's callback fired for this alarm.
    AlarmTriggered { id: AlarmId },
    /// User pressed Stop (notification action or alarm screen).
    Stop { id: AlarmId },
    /// User pressed Snooze. The action surface carries its own snooze
    /// parameters, which override the stored definition's.
    Snooze {
        id: AlarmId,
        max_snoozes: u32,
        snooze_duration_min: u32,
    },
    /// The device finished booting; restore all persisted alarms.
    BootCompleted,
}

/// Outcome of a snooze request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnoozeOutcome {
    /// Re-armed for a later instant.
    Snoozed(NaiveDateTime),
    /// Snooze budget exhausted; behaved as stop.
    BudgetExhausted,
    /// The alarm was not firing; nothing to snooze.
    Ignored,
}

struct Inner {
    scheduler: Box<dyn WakeScheduler>,
    presenter: Box<dyn NotificationPresenter>,
    store: Box<dyn AlarmStore>,
    runtime: HashMap<AlarmId, AlarmRuntimeState>,
    events: VecDeque<Event>,
}

/// The alarm lifecycle state machine.
///
/// All methods take `&self`; internal locking makes concurrent wake
/// callbacks and user actions safe. The owning application drains
/// emitted events with [`AlarmLifecycle::drain_events`].
pub struct AlarmLifecycle {
    inner: Mutex<Inner>,
    feedback: FeedbackController,
}

impl AlarmLifecycle {
    pub fn new(
        scheduler: Box<dyn WakeScheduler>,
        presenter: Box<dyn NotificationPresenter>,
        store: Box<dyn AlarmStore>,
        feedback: FeedbackController,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                scheduler,
                presenter,
                store,
                runtime: HashMap::new(),
                events: VecDeque::new(),
            }),
            feedback,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn runtime_state(&self, id: AlarmId) -> Option<AlarmRuntimeState> {
        self.lock().runtime.get(&id).cloned()
    }

    pub fn phase(&self, id: AlarmId) -> Option<Phase> {
        self.lock().runtime.get(&id).map(|s| s.phase)
    }

    pub fn armed_ids(&self) -> Vec<AlarmId> {
        self.lock().runtime.keys().copied().collect()
    }

    pub fn feedback(&self) -> &FeedbackController {
        &self.feedback
    }

    /// Drain all events emitted since the last call, oldest first.
    pub fn drain_events(&self) -> Vec<Event> {
        self.lock().events.drain(..).collect()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Dispatch a typed command from the process boundary.
    ///
    /// Late or duplicate commands are no-ops; only scheduling failures
    /// (snooze re-arm, boot re-arm) surface as errors.
    pub fn dispatch(&self, command: Command, now: NaiveDateTime) -> Result<()> {
        match command {
            Command::AlarmTriggered { id } => {
                self.on_wake(id);
                Ok(())
            }
            Command::Stop { id } => {
                self.stop(id);
                Ok(())
            }
            Command::Snooze {
                id,
                max_snoozes,
                snooze_duration_min,
            } => {
                self.snooze_with(id, now, Some((max_snoozes, snooze_duration_min)))
                    .map(|_| ())
            }
            Command::BootCompleted => {
                let blob = {
                    let inner = self.lock();
                    inner.store.load_raw_blob()?
                };
                self.restore_from_blob(&blob, now)?;
                Ok(())
            }
        }
    }

    /// Arm (or re-arm) an alarm: compute the next occurrence, replace
    /// any prior wake callback, and create fresh runtime state.
    ///
    /// # Errors
    /// Fails on an invalid definition or when the wake scheduler
    /// rejects the arm request; no runtime state is left behind in
    /// either case.
    pub fn arm(&self, def: &AlarmDefinition, now: NaiveDateTime) -> Result<NaiveDateTime> {
        def.validate()?;
        if !def.is_active {
            return Err(CoreError::Custom(format!(
                "alarm {} is inactive and cannot be armed",
                def.id
            )));
        }

        let next = next_occurrence(def, now);
        let payload = WakePayload::from_definition(def);

        let mut inner = self.lock();
        if inner.runtime.remove(&def.id).is_some() {
            // Idempotent re-arm: drop the prior callback first.
            inner.scheduler.cancel(def.id);
        }
        inner
            .scheduler
            .arm(def.id, local_epoch_millis(next), &payload)?;
        inner.runtime.insert(
            def.id,
            AlarmRuntimeState {
                phase: Phase::Scheduled,
                snooze_count: 0,
                next_trigger: next,
                def: def.clone(),
            },
        );
        inner.events.push_back(Event::AlarmArmed {
            id: def.id,
            next_trigger: next,
            at: Utc::now(),
        });
        Ok(next)
    }

    /// Wake callback: transition `Scheduled -> Firing` and start the
    /// best-effort multi-channel alert.
    ///
    /// Duplicate deliveries re-assert feedback and the notification but
    /// emit no second event; a late callback for a stopped or cancelled
    /// id is a no-op.
    pub fn on_wake(&self, id: AlarmId) {
        let mut inner = self.lock();
        let Some(state) = inner.runtime.get_mut(&id) else {
            debug!("wake callback for unknown alarm {id}, ignoring");
            return;
        };

        let duplicate = state.phase == Phase::Firing;
        state.phase = Phase::Firing;
        let snooze_count = state.snooze_count;
        let title = state.def.title.clone();
        let message = state.def.message.clone();

        // Each channel is independently fault-tolerant: a failure in
        // one is never escalated to the others.
        self.feedback.start(id);
        let Inner {
            presenter, store, ..
        } = &mut *inner;
        notify::show_firing_notification(presenter.as_mut(), store.as_mut(), id, &title, &message);

        if !duplicate {
            inner.events.push_back(Event::AlarmFired {
                id,
                title,
                message,
                snooze_count,
                at: Utc::now(),
            });
        }
    }

    /// Stop a firing alarm: silence feedback, clear every notification
    /// surface, destroy runtime state. Does not re-arm.
    ///
    /// Feedback is stopped and notifications cleared unconditionally,
    /// whatever the phase; only a `Firing` alarm transitions and emits
    /// `AlarmStopped`. Calling twice is the same as calling once.
    pub fn stop(&self, id: AlarmId) {
        let mut inner = self.lock();
        // Only one feedback session can exist, so stop it even if this
        // id was not the one that started it.
        self.feedback.stop();
        let Inner {
            presenter, store, ..
        } = &mut *inner;
        notify::cancel_all_for_alarm(presenter.as_mut(), store.as_mut(), id);

        match inner.runtime.get(&id) {
            Some(state) if state.phase == Phase::Firing => {
                inner.runtime.remove(&id);
                inner.scheduler.cancel(id);
                inner.events.push_back(Event::AlarmStopped {
                    id,
                    at: Utc::now(),
                });
            }
            Some(state) => {
                debug!(
                    "stop for alarm {id} in phase {}, leaving state untouched",
                    state.phase.name()
                );
            }
            None => debug!("stop for unknown alarm {id}, nothing to do"),
        }
    }

    /// Snooze a firing alarm: silence it, then either re-arm at
    /// `now + snooze duration` or, once the budget is exhausted, behave
    /// exactly as [`AlarmLifecycle::stop`].
    pub fn snooze(&self, id: AlarmId, now: NaiveDateTime) -> Result<SnoozeOutcome> {
        self.snooze_with(id, now, None)
    }

    fn snooze_with(
        &self,
        id: AlarmId,
        now: NaiveDateTime,
        overrides: Option<(u32, u32)>,
    ) -> Result<SnoozeOutcome> {
        let mut inner = self.lock();
        self.feedback.stop();
        let Inner {
            presenter, store, ..
        } = &mut *inner;
        notify::cancel_all_for_alarm(presenter.as_mut(), store.as_mut(), id);

        let Some(state) = inner.runtime.get_mut(&id) else {
            debug!("snooze for unknown alarm {id}, ignoring");
            return Ok(SnoozeOutcome::Ignored);
        };
        if state.phase != Phase::Firing {
            debug!(
                "snooze for alarm {id} in phase {}, ignoring",
                state.phase.name()
            );
            return Ok(SnoozeOutcome::Ignored);
        }

        // The action surface may carry different snooze parameters than
        // the stored definition; the carried values win. A zero duration
        // would fail validation on the definition path, so it falls back
        // to the stored value instead of being applied.
        if let Some((max_snoozes, duration_min)) = overrides {
            state.def.max_snoozes = max_snoozes;
            if duration_min == 0 {
                debug!(
                    "zero snooze duration carried for alarm {id}, keeping {} min",
                    state.def.snooze_duration_min
                );
            } else {
                state.def.snooze_duration_min = duration_min;
            }
        }

        if state.snooze_count >= state.def.max_snoozes {
            // Budget exhausted is not an error: forced stop.
            debug!(
                "alarm {id} snooze budget exhausted ({}), stopping",
                state.def.max_snoozes
            );
            inner.runtime.remove(&id);
            inner.scheduler.cancel(id);
            inner.events.push_back(Event::AlarmStopped {
                id,
                at: Utc::now(),
            });
            return Ok(SnoozeOutcome::BudgetExhausted);
        }

        state.snooze_count += 1;
        let snooze_count = state.snooze_count;
        let next = now + Duration::minutes(i64::from(state.def.snooze_duration_min));
        let payload = WakePayload::from_definition(&state.def);
        state.phase = Phase::Snoozed;
        state.next_trigger = next;

        inner.scheduler.cancel(id);
        if let Err(e) = inner.scheduler.arm(id, local_epoch_millis(next), &payload) {
            // Fatal to this alarm's schedule: the caller must know the
            // alarm will not ring again on its own.
            warn!("snooze re-arm for alarm {id} failed: {e}");
            return Err(e.into());
        }
        if let Some(state) = inner.runtime.get_mut(&id) {
            state.phase = Phase::Scheduled;
        }
        inner.events.push_back(Event::AlarmSnoozed {
            id,
            next_trigger: next,
            snooze_count,
            at: Utc::now(),
        });
        Ok(SnoozeOutcome::Snoozed(next))
    }

    /// Cancel an alarm in any phase: user deleted or deactivated it.
    ///
    /// Silences feedback only if this id owns the active session,
    /// clears notifications, drops the wake callback, and destroys
    /// runtime state. Always succeeds, even for an unknown id, and is
    /// safe to race with an in-flight wake callback: once cancelled,
    /// the late callback finds no runtime state.
    pub fn cancel(&self, id: AlarmId) {
        let mut inner = self.lock();
        let was_firing = matches!(
            inner.runtime.get(&id),
            Some(state) if state.phase == Phase::Firing
        );
        if self.feedback.active_alarm() == Some(id) {
            self.feedback.stop();
        }
        let Inner {
            presenter, store, ..
        } = &mut *inner;
        notify::cancel_all_for_alarm(presenter.as_mut(), store.as_mut(), id);
        inner.scheduler.cancel(id);
        inner.runtime.remove(&id);
        if was_firing {
            inner.events.push_back(Event::AlarmStopped {
                id,
                at: Utc::now(),
            });
        }
    }

    /// A manual clock or timezone change invalidated every computed
    /// absolute instant: recompute and re-arm all scheduled alarms.
    /// Per-alarm re-arm failures are logged and do not stop the sweep.
    pub fn clock_changed(&self, now: NaiveDateTime) {
        let mut inner = self.lock();
        let ids: Vec<AlarmId> = inner
            .runtime
            .iter()
            .filter(|(_, s)| s.phase == Phase::Scheduled)
            .map(|(id, _)| *id)
            .collect();

        let mut rearmed = 0usize;
        for id in ids {
            let Some(state) = inner.runtime.get_mut(&id) else {
                continue;
            };
            let next = next_occurrence(&state.def, now);
            let payload = WakePayload::from_definition(&state.def);
            state.next_trigger = next;
            inner.scheduler.cancel(id);
            match inner.scheduler.arm(id, local_epoch_millis(next), &payload) {
                Ok(()) => rearmed += 1,
                Err(e) => warn!("re-arm after clock change failed for alarm {id}: {e}"),
            }
        }
        inner.events.push_back(Event::ClockChanged {
            rearmed,
            at: Utc::now(),
        });
    }

    /// Boot-time bulk restore from the persisted raw definition blob.
    ///
    /// Inactive definitions are skipped; so is any definition whose
    /// computed occurrence is not in the future (the calculator runs
    /// against a different `now` than at persist time, so the boundary
    /// is re-checked). Per-definition failures are logged and do not
    /// abort the remaining restores.
    pub fn restore_from_blob(&self, blob: &[u8], now: NaiveDateTime) -> Result<RestoreSummary> {
        let defs = boot::parse_definitions(blob)?;
        let mut summary = RestoreSummary::default();
        for def in defs {
            if !def.is_active {
                summary.skipped += 1;
                continue;
            }
            if next_occurrence(&def, now) <= now {
                warn!("restored alarm {} computed a past occurrence, skipping", def.id);
                summary.skipped += 1;
                continue;
            }
            match self.arm(&def, now) {
                Ok(_) => summary.restored += 1,
                Err(e) => {
                    warn!("could not restore alarm {}: {e}", def.id);
                    summary.failed += 1;
                }
            }
        }
        Ok(summary)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Device-local epoch milliseconds for a local wall-clock instant.
/// DST-ambiguous instants resolve to the earlier offset.
fn local_epoch_millis(dt: NaiveDateTime) -> i64 {
    match Local.from_local_datetime(&dt) {
        chrono::LocalResult::Single(local) => local.timestamp_millis(),
        chrono::LocalResult::Ambiguous(earlier, _) => earlier.timestamp_millis(),
        chrono::LocalResult::None => dt.and_utc().timestamp_millis(),
    }
}
