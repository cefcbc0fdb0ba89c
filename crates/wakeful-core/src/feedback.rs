//! Sound and vibration feedback.
//!
//! One [`FeedbackController`] owns the process-wide feedback session:
//! at most one alarm sounds at a time, no matter how many ids are
//! conceptually firing. Channels are best-effort and independent; a
//! failure in one is logged and never stops the other.

use std::sync::Mutex;

use log::{debug, warn};

use crate::alarm::AlarmId;
use crate::error::FeedbackError;

/// Repeating vibration pattern in milliseconds: initial delay, then
/// alternating vibrate/pause segments, looped by the backend.
pub const VIBRATION_PATTERN_MS: [u64; 7] = [0, 1000, 500, 1000, 500, 1000, 500];

/// Plays and stops the looping alarm sound.
pub trait SoundBackend: Send {
    fn play(&mut self) -> Result<(), FeedbackError>;
    /// Safe to call when nothing is playing.
    fn stop(&mut self);
}

/// Drives the vibration motor.
pub trait HapticBackend: Send {
    /// Capability probe, queried once per session start. Absence of
    /// haptics is not an error; sound-only feedback is acceptable.
    fn has_vibrator(&self) -> bool;
    /// Start a repeating vibration with the given pattern.
    fn vibrate(&mut self, pattern: &[u64]) -> Result<(), FeedbackError>;
    /// Safe to call when not vibrating.
    fn cancel(&mut self);
}

/// The live feedback session. At most one exists process-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackSession {
    pub alarm_id: AlarmId,
    pub sound_started: bool,
    pub vibration_started: bool,
}

struct Inner {
    sound: Box<dyn SoundBackend>,
    haptics: Box<dyn HapticBackend>,
    session: Option<FeedbackSession>,
}

/// Single owner of the sound and vibration channels.
///
/// `start` while a session is active stops the previous session first;
/// `stop` when inactive is a no-op. All methods take `&self`; the
/// internal mutex serializes start/stop across threads.
pub struct FeedbackController {
    inner: Mutex<Inner>,
}

impl FeedbackController {
    pub fn new(sound: Box<dyn SoundBackend>, haptics: Box<dyn HapticBackend>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                sound,
                haptics,
                session: None,
            }),
        }
    }

    /// Start feedback for `alarm_id`, best-effort on each channel.
    /// Returns the resulting session; both channels failing still
    /// yields a session so that `stop` semantics stay uniform.
    pub fn start(&self, alarm_id: AlarmId) -> FeedbackSession {
        let mut inner = self.lock();
        if let Some(prev) = inner.session.take() {
            debug!(
                "feedback for alarm {} preempts active session for alarm {}",
                alarm_id, prev.alarm_id
            );
            stop_channels(&mut inner, prev);
        }

        let sound_started = match inner.sound.play() {
            Ok(()) => true,
            Err(e) => {
                warn!("alarm {alarm_id}: sound channel failed: {e}");
                false
            }
        };

        let vibration_started = if inner.haptics.has_vibrator() {
            match inner.haptics.vibrate(&VIBRATION_PATTERN_MS) {
                Ok(()) => true,
                Err(e) => {
                    warn!("alarm {alarm_id}: vibration failed: {e}");
                    false
                }
            }
        } else {
            debug!("alarm {alarm_id}: no haptic device, sound-only feedback");
            false
        };

        let session = FeedbackSession {
            alarm_id,
            sound_started,
            vibration_started,
        };
        inner.session = Some(session);
        session
    }

    /// Stop the active session, whichever alarm started it. No-op when
    /// inactive.
    pub fn stop(&self) {
        let mut inner = self.lock();
        if let Some(session) = inner.session.take() {
            stop_channels(&mut inner, session);
        }
    }

    pub fn is_active(&self) -> bool {
        self.lock().session.is_some()
    }

    /// The alarm id owning the active session, if any.
    pub fn active_alarm(&self) -> Option<AlarmId> {
        self.lock().session.map(|s| s.alarm_id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a panicking thread held it; the
        // session bookkeeping is still coherent.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn stop_channels(inner: &mut Inner, session: FeedbackSession) {
    if session.sound_started {
        inner.sound.stop();
    }
    if session.vibration_started {
        inner.haptics.cancel();
    }
    debug!("feedback session for alarm {} stopped", session.alarm_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeSound {
        playing: Arc<AtomicU32>,
        fail: bool,
    }

    impl SoundBackend for FakeSound {
        fn play(&mut self) -> Result<(), FeedbackError> {
            if self.fail {
                return Err(FeedbackError::NoAudioDevice);
            }
            self.playing.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn stop(&mut self) {
            self.playing.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct FakeHaptics {
        vibrating: Arc<AtomicU32>,
        present: bool,
    }

    impl HapticBackend for FakeHaptics {
        fn has_vibrator(&self) -> bool {
            self.present
        }
        fn vibrate(&mut self, pattern: &[u64]) -> Result<(), FeedbackError> {
            assert_eq!(pattern, VIBRATION_PATTERN_MS);
            self.vibrating.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        fn cancel(&mut self) {
            self.vibrating.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn controller(
        sound_fail: bool,
        has_vibrator: bool,
    ) -> (FeedbackController, Arc<AtomicU32>, Arc<AtomicU32>) {
        let playing = Arc::new(AtomicU32::new(0));
        let vibrating = Arc::new(AtomicU32::new(0));
        let ctl = FeedbackController::new(
            Box::new(FakeSound {
                playing: playing.clone(),
                fail: sound_fail,
            }),
            Box::new(FakeHaptics {
                vibrating: vibrating.clone(),
                present: has_vibrator,
            }),
        );
        (ctl, playing, vibrating)
    }

    #[test]
    fn start_then_stop_releases_both_channels() {
        let (ctl, playing, vibrating) = controller(false, true);
        let session = ctl.start(1);
        assert!(session.sound_started && session.vibration_started);
        assert!(ctl.is_active());
        assert_eq!(playing.load(Ordering::SeqCst), 1);
        assert_eq!(vibrating.load(Ordering::SeqCst), 1);

        ctl.stop();
        assert!(!ctl.is_active());
        assert_eq!(playing.load(Ordering::SeqCst), 0);
        assert_eq!(vibrating.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn second_start_preempts_first_session() {
        let (ctl, playing, _) = controller(false, true);
        ctl.start(1);
        ctl.start(2);
        // Exactly one live session, owned by the second alarm.
        assert_eq!(playing.load(Ordering::SeqCst), 1);
        assert_eq!(ctl.active_alarm(), Some(2));
    }

    #[test]
    fn stop_when_inactive_is_a_noop() {
        let (ctl, playing, vibrating) = controller(false, true);
        ctl.stop();
        ctl.stop();
        assert_eq!(playing.load(Ordering::SeqCst), 0);
        assert_eq!(vibrating.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_haptics_degrades_to_sound_only() {
        let (ctl, _, vibrating) = controller(false, false);
        let session = ctl.start(1);
        assert!(session.sound_started);
        assert!(!session.vibration_started);
        assert_eq!(vibrating.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn sound_failure_still_starts_vibration() {
        let (ctl, playing, vibrating) = controller(true, true);
        let session = ctl.start(1);
        assert!(!session.sound_started);
        assert!(session.vibration_started);
        assert!(ctl.is_active());
        assert_eq!(playing.load(Ordering::SeqCst), 0);
        assert_eq!(vibrating.load(Ordering::SeqCst), 1);

        // Stopping must not call sound.stop() for a channel that never
        // started.
        ctl.stop();
        assert_eq!(playing.load(Ordering::SeqCst), 0);
        assert_eq!(vibrating.load(Ordering::SeqCst), 0);
    }
}
