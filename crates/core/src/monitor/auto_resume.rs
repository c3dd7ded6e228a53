//! Auto-resume monitor.
//!
//! A paused cycle with time left restarts by itself after a fixed delay.
//! Same two-step shape as the cooling monitor: observe and announce under
//! the lock, wait with the lock released, then commit Running only if the
//! oven is still paused with time left. The timer is not re-armed here;
//! that is the dispatcher's and the schedule monitor's job.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::report::{self, OvenEvent, ReportSender};
use crate::state::{Mode, StateCell};

pub fn spawn(
    state: StateCell,
    reports: ReportSender,
    poll_ms: u64,
    resume_delay_secs: u64,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let interval = Duration::from_millis(poll_ms);
        let delay = Duration::from_secs(resume_delay_secs);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("auto-resume monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports, delay).await;
        }
    });
}

/// One auto-resume poll, including the lock-free delay.
pub async fn tick(state: &StateCell, reports: &ReportSender, delay: Duration) {
    let pending = state
        .with(|s| {
            if s.mode == Mode::Paused && s.remaining_secs > 0 {
                report::emit(reports, OvenEvent::AutoResumePending);
                tracing::info!(delay_secs = delay.as_secs(), "automatic restart pending");
                true
            } else {
                false
            }
        })
        .await;
    if !pending {
        return;
    }

    tokio::time::sleep(delay).await;

    state
        .with(|s| {
            if s.mode == Mode::Paused && s.remaining_secs > 0 {
                s.mode = Mode::Running;
                report::emit(reports, OvenEvent::AutoResumed);
                tracing::info!("automatic restart committed");
            }
        })
        .await;
}
