//! Power emitter monitor. Purely observational: reports the emitter's
//! effective power while a cycle runs, and the cooling state while the fan
//! is on. Never mutates the shared state.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::report::{self, OvenEvent, ReportSender};
use crate::state::{Mode, StateCell};

pub fn spawn(state: StateCell, reports: ReportSender, poll_ms: u64, cancel: CancellationToken) {
    tokio::spawn(async move {
        let interval = Duration::from_millis(poll_ms);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("power monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports).await;
        }
    });
}

/// One power poll.
pub async fn tick(state: &StateCell, reports: &ReportSender) {
    state
        .with(|s| match s.mode {
            Mode::Running => {
                if let Some(cycle) = s.active_cycle {
                    let percent = cycle.power_at(s.remaining_secs);
                    report::emit(reports, OvenEvent::PowerLevel { percent, curve: cycle.curve });
                    tracing::debug!(percent, curve = ?cycle.curve, "emitter active");
                }
            }
            Mode::Cooling => report::emit(reports, OvenEvent::CoolingActive),
            Mode::Idle | Mode::Paused => {}
        })
        .await;
}
