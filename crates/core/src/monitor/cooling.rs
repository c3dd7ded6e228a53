//! Cooling monitor.
//!
//! The cooldown is a multi-second wait, so the lock is released for its
//! whole duration: one guarded step observes Cooling and reports the fan,
//! the task sleeps lock-free, and a second guarded step commits the
//! transition to Idle only if the oven is still cooling. An emergency stop
//! landing inside the window wins.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::report::{self, OvenEvent, ReportSender};
use crate::state::{Mode, StateCell};

pub fn spawn(
    state: StateCell,
    reports: ReportSender,
    poll_ms: u64,
    cooldown_secs: u64,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let interval = Duration::from_millis(poll_ms);
        let cooldown = Duration::from_secs(cooldown_secs);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("cooling monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports, cooldown).await;
        }
    });
}

/// One cooling poll, including the lock-free cooldown wait.
pub async fn tick(state: &StateCell, reports: &ReportSender, cooldown: Duration) {
    let cooling = state
        .with(|s| {
            if s.mode == Mode::Cooling {
                report::emit(reports, OvenEvent::FanOn);
                tracing::info!("cooling fan on");
                true
            } else {
                false
            }
        })
        .await;
    if !cooling {
        return;
    }

    tokio::time::sleep(cooldown).await;

    state
        .with(|s| {
            if s.mode == Mode::Cooling {
                s.mode = Mode::Idle;
                report::emit(reports, OvenEvent::CoolingComplete);
                tracing::info!("cooldown complete, oven ready");
            }
        })
        .await;
}
