use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, TryLockError};

use crate::cycles::CycleProfile;

/// Top-level oven mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Idle,
    Running,
    Paused,
    Cooling,
}

/// The shared appliance record. Mutated only through [`StateCell`], by the
/// monitor tasks and the command dispatcher.
#[derive(Debug, Clone)]
pub struct OvenState {
    pub mode: Mode,
    pub remaining_secs: u32,
    pub door_open: bool,
    pub emergency: bool,
    pub schedule_active: bool,
    /// Scheduled-start countdown. The operator may enter any sign; values
    /// that are not positive never reach the positive-to-zero edge, so the
    /// schedule never fires.
    pub scheduled_secs: i64,
    /// Selected heating profile; `None` until the first selection.
    pub active_cycle: Option<CycleProfile>,

    /// Latched on the Running→Idle edge when the timer expires; consumed
    /// exactly once by the alert announcer.
    pub chime_pending: bool,
    /// Latched by the emergency stop handler when it cancels; consumed
    /// exactly once by the alert announcer.
    pub emergency_chime_pending: bool,
    /// True while a cycle-timer instance is live. Checked and set in the
    /// same guarded step by [`crate::monitor::timer::arm`] so two timers
    /// can never count down at once.
    pub timer_armed: bool,
}

impl OvenState {
    pub fn new() -> Self {
        Self {
            mode: Mode::Idle,
            remaining_secs: 0,
            door_open: false,
            emergency: false,
            schedule_active: false,
            scheduled_secs: 0,
            active_cycle: None,
            chime_pending: false,
            emergency_chime_pending: false,
            timer_armed: false,
        }
    }

    /// Timer expiry edge. Chimes only for a cycle that was actually running
    /// when its time ran out; a paused cycle expiring goes quietly idle.
    pub fn complete_cycle(&mut self) {
        if self.mode == Mode::Running {
            self.chime_pending = true;
        }
        self.mode = Mode::Idle;
        self.timer_armed = false;
    }

    /// Emergency cancellation. Single authoritative transition: any mode
    /// drops to Idle, the cook time is wiped and the flag is cleared in the
    /// same guarded step, leaving one acknowledgment chime latched.
    pub fn cancel_emergency(&mut self) {
        self.mode = Mode::Idle;
        self.remaining_secs = 0;
        self.emergency = false;
        self.emergency_chime_pending = true;
    }

    pub fn lamp_on(&self) -> bool {
        self.door_open || self.mode == Mode::Running
    }
}

impl Default for OvenState {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to the shared [`OvenState`].
///
/// Access discipline: every read or mutation is a *guarded step* executed
/// through [`StateCell::with`]. The closure cannot `.await`, so a task can
/// never suspend while holding the lock, and the guard is released on every
/// exit path. Monitors that need a long wait mid-transition (cooling,
/// auto-resume) run two guarded steps around a lock-free sleep and re-check
/// the mode before committing.
#[derive(Debug, Clone)]
pub struct StateCell {
    inner: Arc<Mutex<OvenState>>,
}

impl StateCell {
    pub fn new(state: OvenState) -> Self {
        Self { inner: Arc::new(Mutex::new(state)) }
    }

    /// Run one guarded step against the shared state.
    pub async fn with<R>(&self, f: impl FnOnce(&mut OvenState) -> R) -> R {
        let mut guard = self.inner.lock().await;
        f(&mut guard)
    }

    /// Clone of the current state, for display and assertions.
    pub async fn snapshot(&self) -> OvenState {
        self.with(|s| s.clone()).await
    }

    /// Non-blocking acquisition attempt. Used by tests to prove the lock is
    /// free while a cooling or auto-resume wait is in flight.
    pub fn try_lock(&self) -> Result<MutexGuard<'_, OvenState>, TryLockError> {
        self.inner.try_lock()
    }
}
