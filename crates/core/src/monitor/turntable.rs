//! Turntable monitor. Pure observer: spinning while a cycle runs, stopped
//! while idle or cooling, silent while paused.

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
                    tracing::debug!("turntable monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports).await;
        }
    });
}

/// One turntable poll.
pub async fn tick(state: &StateCell, reports: &ReportSender) {
    state
        .with(|s| match s.mode {
            Mode::Running => report::emit(reports, OvenEvent::Turntable { spinning: true }),
            Mode::Idle | Mode::Cooling => {
                report::emit(reports, OvenEvent::Turntable { spinning: false })
            }
            Mode::Paused => {}
        })
        .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::OvenState;

    async fn observed(mode: Mode) -> Option<OvenEvent> {
        let mut s = OvenState::new();
        s.mode = mode;
        let cell = StateCell::new(s);
        let (tx, mut rx) = report::channel(4);
        tick(&cell, &tx).await;
        rx.try_recv().ok()
    }

    #[tokio::test]
    async fn spins_only_while_running() {
        assert_eq!(observed(Mode::Running).await, Some(OvenEvent::Turntable { spinning: true }));
        assert_eq!(observed(Mode::Idle).await, Some(OvenEvent::Turntable { spinning: false }));
        assert_eq!(observed(Mode::Cooling).await, Some(OvenEvent::Turntable { spinning: false }));
        assert_eq!(observed(Mode::Paused).await, None);
    }
}
