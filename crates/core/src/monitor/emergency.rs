//! Emergency stop monitor.
//!
//! Polls faster than every other task so a tripped emergency is handled
//! within a fraction of a second. This is the single authoritative cancel
//! handler: it forces the oven idle, wipes the cook time and clears the
//! flag in one guarded step. The alert announcer only chimes afterwards.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::report::{self, OvenEvent, ReportSender};
use crate::state::StateCell;

pub fn spawn(state: StateCell, reports: ReportSender, poll_ms: u64, cancel: CancellationToken) {
    tokio::spawn(async move {
        let interval = Duration::from_millis(poll_ms);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("emergency monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports).await;
        }
    });
}

/// One emergency poll.
pub async fn tick(state: &StateCell, reports: &ReportSender) {
    state
        .with(|s| {
            if s.emergency {
                s.cancel_emergency();
                report::emit(reports, OvenEvent::EmergencyCancelled);
                tracing::warn!("emergency stop tripped, cycle cancelled");
            }
        })
        .await;
}
