//! Operator command interface.
//!
//! Commands arrive as the menu integers 1-7 and mutate the shared state
//! under the same lock the monitors use. Dispatch errors are non-fatal and
//! leave the state untouched; an unrecognized code maps to no command at
//! all and is ignored without output.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::OvenCfg;
use crate::cycles;
use crate::monitor::timer;
use crate::report::ReportSender;
use crate::state::{Mode, StateCell};

/// An operator command, decoded from a menu code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    OpenDoor,
    CloseDoor,
    SelectCycle(i64),
    Start,
    Schedule(i64),
    Emergency,
    Exit,
}

impl Command {
    /// Decode a menu code. Codes 3 and 5 need the operator's follow-up
    /// value (cycle index, delay seconds). Anything else returns `None`,
    /// which callers drop silently.
    pub fn from_code(code: i64, arg: Option<i64>) -> Option<Self> {
        match code {
            1 => Some(Self::OpenDoor),
            2 => Some(Self::CloseDoor),
            3 => arg.map(Self::SelectCycle),
            4 => Some(Self::Start),
            5 => arg.map(Self::Schedule),
            6 => Some(Self::Emergency),
            7 => Some(Self::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("invalid cycle index {0}")]
    InvalidCycle(i64),
    #[error("cannot start: {0}")]
    StartBlocked(&'static str),
}

/// Synchronous mutation entry point used by the console. Cloneable; all
/// clones share the same state cell and cancellation token.
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    state: StateCell,
    reports: ReportSender,
    cfg: Arc<OvenCfg>,
    cancel: CancellationToken,
}

impl CommandDispatcher {
    pub(crate) fn new(
        state: StateCell,
        reports: ReportSender,
        cfg: Arc<OvenCfg>,
        cancel: CancellationToken,
    ) -> Self {
        Self { state, reports, cfg, cancel }
    }

    /// Apply one command as a guarded step.
    pub async fn dispatch(&self, cmd: Command) -> Result<(), CommandError> {
        match cmd {
            Command::OpenDoor => {
                self.state.with(|s| s.door_open = true).await;
                tracing::info!("door opened");
                Ok(())
            }
            Command::CloseDoor => {
                self.state.with(|s| s.door_open = false).await;
                tracing::info!("door closed");
                Ok(())
            }
            Command::SelectCycle(index) => {
                let profile = usize::try_from(index)
                    .ok()
                    .and_then(cycles::get)
                    .ok_or(CommandError::InvalidCycle(index))?;
                self.state
                    .with(|s| {
                        s.active_cycle = Some(profile);
                        s.remaining_secs = profile.duration_secs;
                    })
                    .await;
                tracing::info!(cycle = profile.name, duration = profile.duration_secs, "cycle selected");
                Ok(())
            }
            Command::Start => {
                self.state
                    .with(|s| {
                        if s.door_open {
                            return Err(CommandError::StartBlocked("door is open"));
                        }
                        if s.remaining_secs == 0 {
                            return Err(CommandError::StartBlocked("no cycle selected"));
                        }
                        s.mode = Mode::Running;
                        Ok(())
                    })
                    .await?;
                timer::arm(
                    self.state.clone(),
                    self.reports.clone(),
                    self.cfg.timer_tick_ms,
                    self.cancel.clone(),
                )
                .await;
                tracing::info!("cycle started");
                Ok(())
            }
            Command::Schedule(delay) => {
                self.state
                    .with(|s| {
                        s.scheduled_secs = delay;
                        s.schedule_active = true;
                    })
                    .await;
                tracing::info!(delay, "start scheduled");
                Ok(())
            }
            Command::Emergency => {
                self.state.with(|s| s.emergency = true).await;
                tracing::warn!("emergency tripped by operator");
                Ok(())
            }
            Command::Exit => {
                self.cancel.cancel();
                tracing::info!("shutdown requested");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report;
    use crate::state::OvenState;

    fn dispatcher() -> (CommandDispatcher, StateCell, CancellationToken) {
        let state = StateCell::new(OvenState::new());
        let (tx, _rx) = report::channel(8);
        let cancel = CancellationToken::new();
        let d = CommandDispatcher::new(
            state.clone(),
            tx,
            Arc::new(OvenCfg::default()),
            cancel.clone(),
        );
        (d, state, cancel)
    }

    #[test]
    fn code_mapping() {
        assert_eq!(Command::from_code(1, None), Some(Command::OpenDoor));
        assert_eq!(Command::from_code(3, Some(2)), Some(Command::SelectCycle(2)));
        assert_eq!(Command::from_code(5, Some(-4)), Some(Command::Schedule(-4)));
        assert_eq!(Command::from_code(7, None), Some(Command::Exit));
        // unrecognized codes decode to nothing
        assert_eq!(Command::from_code(0, None), None);
        assert_eq!(Command::from_code(8, None), None);
        assert_eq!(Command::from_code(-1, Some(1)), None);
    }

    #[tokio::test]
    async fn door_commands() {
        let (d, state, _) = dispatcher();
        d.dispatch(Command::OpenDoor).await.unwrap();
        assert!(state.snapshot().await.door_open);
        d.dispatch(Command::CloseDoor).await.unwrap();
        assert!(!state.snapshot().await.door_open);
    }

    #[tokio::test]
    async fn select_chicken_loads_profile() {
        let (d, state, _) = dispatcher();
        d.dispatch(Command::SelectCycle(2)).await.unwrap();
        let s = state.snapshot().await;
        assert_eq!(s.remaining_secs, 500);
        assert_eq!(s.active_cycle.unwrap().power_percent, 90);
    }

    #[tokio::test]
    async fn invalid_cycle_index_leaves_state_unchanged() {
        let (d, state, _) = dispatcher();
        let err = d.dispatch(Command::SelectCycle(5)).await.unwrap_err();
        assert_eq!(err, CommandError::InvalidCycle(5));
        let err = d.dispatch(Command::SelectCycle(-1)).await.unwrap_err();
        assert_eq!(err, CommandError::InvalidCycle(-1));

        let s = state.snapshot().await;
        assert!(s.active_cycle.is_none());
        assert_eq!(s.remaining_secs, 0);
    }

    #[tokio::test]
    async fn start_blocked_by_open_door() {
        let (d, state, cancel) = dispatcher();
        d.dispatch(Command::SelectCycle(4)).await.unwrap();
        d.dispatch(Command::OpenDoor).await.unwrap();

        let err = d.dispatch(Command::Start).await.unwrap_err();
        assert_eq!(err, CommandError::StartBlocked("door is open"));
        let s = state.snapshot().await;
        assert_eq!(s.mode, Mode::Idle);
        assert!(!s.timer_armed);
        cancel.cancel();
    }

    #[tokio::test]
    async fn start_blocked_without_cycle() {
        let (d, state, _) = dispatcher();
        let err = d.dispatch(Command::Start).await.unwrap_err();
        assert_eq!(err, CommandError::StartBlocked("no cycle selected"));
        assert_eq!(state.snapshot().await.mode, Mode::Idle);
    }

    #[tokio::test]
    async fn start_runs_and_arms_timer() {
        let (d, state, cancel) = dispatcher();
        d.dispatch(Command::SelectCycle(4)).await.unwrap();
        d.dispatch(Command::Start).await.unwrap();

        let s = state.snapshot().await;
        assert_eq!(s.mode, Mode::Running);
        assert!(s.timer_armed);
        cancel.cancel();
    }

    #[tokio::test]
    async fn schedule_accepts_any_sign() {
        let (d, state, _) = dispatcher();
        d.dispatch(Command::Schedule(-10)).await.unwrap();
        let s = state.snapshot().await;
        assert!(s.schedule_active);
        assert_eq!(s.scheduled_secs, -10);
    }

    #[tokio::test]
    async fn emergency_sets_flag_only() {
        let (d, state, _) = dispatcher();
        d.dispatch(Command::SelectCycle(0)).await.unwrap();
        d.dispatch(Command::Emergency).await.unwrap();
        let s = state.snapshot().await;
        assert!(s.emergency);
        // cancellation itself belongs to the emergency monitor
        assert_eq!(s.remaining_secs, 600);
    }

    #[tokio::test]
    async fn exit_cancels_runtime() {
        let (d, _, cancel) = dispatcher();
        d.dispatch(Command::Exit).await.unwrap();
        assert!(cancel.is_cancelled());
    }
}
