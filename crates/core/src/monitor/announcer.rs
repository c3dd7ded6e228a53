//! Alert announcer.
//!
//! Consumes the two chime latches. Each latch is set on a transition edge
//! (cycle completion, emergency cancellation) and cleared here in the same
//! guarded step that emits the chime, so a chime can never repeat while the
//! oven sits idle.

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
                    tracing::debug!("announcer shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports).await;
        }
    });
}

/// One announcer poll.
pub async fn tick(state: &StateCell, reports: &ReportSender) {
    state
        .with(|s| {
            if s.chime_pending {
                s.chime_pending = false;
                report::emit(reports, OvenEvent::CompletionChime);
                tracing::info!("completion chime");
            }
            if s.emergency_chime_pending {
                s.emergency_chime_pending = false;
                report::emit(reports, OvenEvent::EmergencyChime);
                tracing::info!("emergency chime");
            }
        })
        .await;
}
