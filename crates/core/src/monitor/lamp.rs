//! Cavity lamp monitor. Pure observer: the lamp is lit whenever the door
//! is open or a cycle is running.

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
                    tracing::debug!("lamp monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports).await;
        }
    });
}

/// One lamp poll.
pub async fn tick(state: &StateCell, reports: &ReportSender) {
    state
        .with(|s| report::emit(reports, OvenEvent::Lamp { on: s.lamp_on() }))
        .await;
}
