//! Drive the lifecycle against console-backed collaborators.
//!
//! Every OS boundary (wake scheduler, notifications, sound, haptics) is
//! replaced by a backend that prints what it would have done, so the
//! full arm/fire/snooze/stop flow can be exercised from a terminal.

use chrono::Local;
use clap::Subcommand;
use wakeful_core::error::{FeedbackError, PresentationError, SchedulingError};
use wakeful_core::feedback::{FeedbackController, HapticBackend, SoundBackend};
use wakeful_core::notify::{NotificationAction, NotificationPresenter};
use wakeful_core::storage::{AlarmStore, FileStore};
use wakeful_core::wake::{WakePayload, WakeScheduler};
use wakeful_core::{AlarmId, AlarmLifecycle, Command, SnoozeOutcome};

#[derive(Subcommand)]
pub enum SimulateAction {
    /// Arm an alarm, fire it, optionally snooze, then stop
    Fire {
        /// Alarm id
        id: u32,
        /// Number of snooze cycles before stopping
        #[arg(long, default_value = "0")]
        snoozes: u32,
    },
    /// Replay the boot-completed restore over the persisted alarms
    Boot,
    /// Replay a clock-change sweep over all active alarms
    Clock,
}

struct ConsoleScheduler;

impl WakeScheduler for ConsoleScheduler {
    fn arm(
        &mut self,
        id: AlarmId,
        when_millis: i64,
        payload: &WakePayload,
    ) -> Result<(), SchedulingError> {
        println!("[scheduler] arm alarm {id} at epoch {when_millis} ({})", payload.title);
        Ok(())
    }

    fn cancel(&mut self, id: AlarmId) {
        println!("[scheduler] cancel alarm {id}");
    }
}

struct ConsolePresenter;

impl NotificationPresenter for ConsolePresenter {
    fn show(
        &mut self,
        id: AlarmId,
        title: &str,
        message: &str,
        actions: &[NotificationAction],
    ) -> Result<(), PresentationError> {
        println!("[notification] alarm {id}: {title} - {message} {actions:?}");
        Ok(())
    }

    fn cancel(&mut self, notification_id: i64) {
        println!("[notification] cancel {notification_id}");
    }
}

struct ConsoleSound;

impl SoundBackend for ConsoleSound {
    fn play(&mut self) -> Result<(), FeedbackError> {
        println!("[sound] play");
        Ok(())
    }
    fn stop(&mut self) {
        println!("[sound] stop");
    }
}

struct ConsoleHaptics;

impl HapticBackend for ConsoleHaptics {
    fn has_vibrator(&self) -> bool {
        true
    }
    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), FeedbackError> {
        println!("[haptics] vibrate {pattern:?}");
        Ok(())
    }
    fn cancel(&mut self) {
        println!("[haptics] cancel");
    }
}

fn lifecycle(store: FileStore) -> AlarmLifecycle {
    AlarmLifecycle::new(
        Box::new(ConsoleScheduler),
        Box::new(ConsolePresenter),
        Box::new(store),
        FeedbackController::new(Box::new(ConsoleSound), Box::new(ConsoleHaptics)),
    )
}

pub fn run(action: SimulateAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileStore::open_default()?;
    let mut now = Local::now().naive_local();

    match action {
        SimulateAction::Fire { id, snoozes } => {
            let def = store
                .load_all()?
                .into_iter()
                .find(|a| a.id == id)
                .ok_or_else(|| format!("no alarm with id {id}"))?;
            let lifecycle = lifecycle(store);

            lifecycle.arm(&def, now)?;
            for _ in 0..snoozes {
                lifecycle.on_wake(id);
                match lifecycle.snooze(id, now)? {
                    SnoozeOutcome::Snoozed(next) => now = next,
                    SnoozeOutcome::BudgetExhausted | SnoozeOutcome::Ignored => break,
                }
            }
            if lifecycle.phase(id).is_some() {
                lifecycle.on_wake(id);
                lifecycle.stop(id);
            }
            print_events(&lifecycle)?;
        }
        SimulateAction::Boot => {
            let lifecycle = lifecycle(store);
            lifecycle.dispatch(Command::BootCompleted, now)?;
            print_events(&lifecycle)?;
        }
        SimulateAction::Clock => {
            let active = store.load_active()?;
            let lifecycle = lifecycle(store);
            for def in &active {
                lifecycle.arm(def, now)?;
            }
            lifecycle.clock_changed(now);
            print_events(&lifecycle)?;
        }
    }
    Ok(())
}

fn print_events(lifecycle: &AlarmLifecycle) -> Result<(), Box<dyn std::error::Error>> {
    for event in lifecycle.drain_events() {
        println!("{}", serde_json::to_string_pretty(&event)?);
    }
    Ok(())
}
