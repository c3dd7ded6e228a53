//! Runtime wiring: builds the shared state cell and report bus, spawns the
//! monitor tasks, and owns the cancellation token that is the only
//! termination path for all of them.

use std::sync::Arc;

use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::config::OvenCfg;
use crate::dispatch::CommandDispatcher;
use crate::monitor::{announcer, auto_resume, cooling, emergency, lamp, power, schedule, turntable};
use crate::report::{self, ReportReceiver, ReportSender};
use crate::state::{OvenState, StateCell};

pub struct Runtime {
    cfg: Arc<OvenCfg>,
    state: StateCell,
    reports: ReportSender,
    cancel: CancellationToken,
}

impl Runtime {
    /// Create the runtime. Returns it together with the report receiver the
    /// console (or a test) drains.
    pub fn new(cfg: OvenCfg) -> (Self, ReportReceiver) {
        let (reports, rx) = report::channel(cfg.report_buffer);
        let runtime = Self {
            cfg: Arc::new(cfg),
            state: StateCell::new(OvenState::new()),
            reports,
            cancel: CancellationToken::new(),
        };
        (runtime, rx)
    }

    /// Handle to the shared appliance state.
    pub fn state(&self) -> StateCell {
        self.state.clone()
    }

    /// The cancellation token every spawned task monitors.
    pub fn token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Dispatcher for the operator command interface.
    pub fn dispatcher(&self) -> CommandDispatcher {
        CommandDispatcher::new(
            self.state.clone(),
            self.reports.clone(),
            Arc::clone(&self.cfg),
            self.cancel.clone(),
        )
    }

    /// Launch the eight periodic monitors. The cycle timer is not spawned
    /// here; the dispatcher and the schedule monitor arm it on demand.
    pub fn spawn_monitors(&self) {
        let cfg = &self.cfg;
        power::spawn(self.state(), self.reports.clone(), cfg.power_poll_ms, self.token());
        announcer::spawn(self.state(), self.reports.clone(), cfg.announcer_poll_ms, self.token());
        emergency::spawn(self.state(), self.reports.clone(), cfg.emergency_poll_ms, self.token());
        cooling::spawn(
            self.state(),
            self.reports.clone(),
            cfg.cooling_poll_ms,
            cfg.cooldown_secs,
            self.token(),
        );
        schedule::spawn(
            self.state(),
            self.reports.clone(),
            cfg.schedule_poll_ms,
            cfg.timer_tick_ms,
            self.token(),
        );
        turntable::spawn(self.state(), self.reports.clone(), cfg.turntable_poll_ms, self.token());
        lamp::spawn(self.state(), self.reports.clone(), cfg.lamp_poll_ms, self.token());
        auto_resume::spawn(
            self.state(),
            self.reports.clone(),
            cfg.auto_resume_poll_ms,
            cfg.resume_delay_secs,
            self.token(),
        );
        tracing::info!("oven monitors running");
    }

    /// Spawn a background task that cancels the runtime on SIGTERM (or
    /// ctrl-c on non-unix platforms).
    pub fn spawn_signal_listener(&self) {
        let token = self.cancel.clone();
        tokio::spawn(async move {
            #[cfg(unix)]
            {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        let _ = sigterm.recv().await;
                        tracing::info!("received SIGTERM, shutting down");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to register SIGTERM handler");
                        return;
                    }
                }
            }
            #[cfg(not(unix))]
            {
                let _ = signal::ctrl_c().await;
                tracing::info!("received ctrl-c, shutting down");
            }
            token.cancel();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Mode;

    #[tokio::test]
    async fn fresh_runtime_is_idle() {
        let (runtime, _rx) = Runtime::new(OvenCfg::default());
        let s = runtime.state().snapshot().await;
        assert_eq!(s.mode, Mode::Idle);
        assert!(!runtime.token().is_cancelled());
    }

    #[tokio::test]
    async fn dispatchers_share_one_state() {
        let (runtime, _rx) = Runtime::new(OvenCfg::default());
        let a = runtime.dispatcher();
        let b = runtime.dispatcher();
        a.dispatch(crate::dispatch::Command::OpenDoor).await.unwrap();
        drop(b);
        assert!(runtime.state().snapshot().await.door_open);
    }
}
