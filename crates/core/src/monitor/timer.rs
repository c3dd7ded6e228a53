//! Cycle countdown timer.
//!
//! Unlike the other monitors this task is not spawned at startup: it is
//! armed on demand by the command dispatcher (Start) and by the schedule
//! monitor when a scheduled start fires, and it disarms itself once the
//! remaining time reaches zero.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::report::{self, OvenEvent, ReportSender};
use crate::state::StateCell;

/// Arm a countdown for the currently selected cycle. No-ops when a timer
/// is already live or there is no remaining time, so double-arming and
/// zero-length countdowns are impossible.
pub async fn arm(state: StateCell, reports: ReportSender, tick_ms: u64, cancel: CancellationToken) {
    let armed = state
        .with(|s| {
            if s.timer_armed || s.remaining_secs == 0 {
                return false;
            }
            s.timer_armed = true;
            true
        })
        .await;
    if !armed {
        return;
    }
    tracing::debug!("cycle timer armed");

    tokio::spawn(async move {
        let interval = Duration::from_millis(tick_ms);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    state.with(|s| s.timer_armed = false).await;
                    tracing::debug!("cycle timer shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            if tick(&state, &reports).await {
                return;
            }
        }
    });
}

/// One countdown step. Returns true when the timer has disarmed itself,
/// either because the count reached zero or because the remaining time was
/// wiped out from under it (emergency stop).
pub async fn tick(state: &StateCell, reports: &ReportSender) -> bool {
    state
        .with(|s| {
            if s.remaining_secs == 0 {
                s.timer_armed = false;
                return true;
            }
            s.remaining_secs -= 1;
            report::emit(reports, OvenEvent::TimeRemaining(s.remaining_secs));
            tracing::debug!(remaining = s.remaining_secs, "cycle tick");
            if s.remaining_secs == 0 {
                s.complete_cycle();
                tracing::info!("cycle timer expired");
                return true;
            }
            false
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Mode, OvenState};

    fn running_state(remaining: u32) -> StateCell {
        let mut s = OvenState::new();
        s.mode = Mode::Running;
        s.remaining_secs = remaining;
        StateCell::new(s)
    }

    #[tokio::test]
    async fn countdown_is_monotonic_and_completes() {
        let cell = running_state(3);
        let (tx, mut rx) = report::channel(8);

        assert!(!tick(&cell, &tx).await);
        assert!(!tick(&cell, &tx).await);
        assert!(tick(&cell, &tx).await);

        let s = cell.snapshot().await;
        assert_eq!(s.mode, Mode::Idle);
        assert_eq!(s.remaining_secs, 0);
        assert!(s.chime_pending);
        assert!(!s.timer_armed);

        let mut seen = Vec::new();
        while let Ok(e) = rx.try_recv() {
            seen.push(e);
        }
        assert_eq!(
            seen,
            vec![
                OvenEvent::TimeRemaining(2),
                OvenEvent::TimeRemaining(1),
                OvenEvent::TimeRemaining(0),
            ]
        );
    }

    #[tokio::test]
    async fn expiry_while_paused_does_not_chime() {
        let cell = running_state(1);
        cell.with(|s| s.mode = Mode::Paused).await;
        let (tx, _rx) = report::channel(8);

        assert!(tick(&cell, &tx).await);
        let s = cell.snapshot().await;
        assert_eq!(s.mode, Mode::Idle);
        assert!(!s.chime_pending);
    }

    #[tokio::test]
    async fn exits_when_time_was_wiped() {
        let cell = running_state(10);
        cell.with(|s| {
            s.remaining_secs = 0;
            s.timer_armed = true;
        })
        .await;
        let (tx, mut rx) = report::channel(8);

        assert!(tick(&cell, &tx).await);
        assert!(!cell.snapshot().await.timer_armed);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn arm_refuses_double_and_empty() {
        let cell = running_state(5);
        let (tx, _rx) = report::channel(8);
        let cancel = CancellationToken::new();

        arm(cell.clone(), tx.clone(), 1000, cancel.clone()).await;
        assert!(cell.snapshot().await.timer_armed);
        // second arm is a no-op, state stays armed exactly once
        arm(cell.clone(), tx.clone(), 1000, cancel.clone()).await;
        assert!(cell.snapshot().await.timer_armed);

        let empty = StateCell::new(OvenState::new());
        arm(empty.clone(), tx, 1000, cancel.clone()).await;
        assert!(!empty.snapshot().await.timer_armed);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn armed_timer_runs_to_idle() {
        let cell = running_state(3);
        let (tx, mut rx) = report::channel(16);
        let cancel = CancellationToken::new();

        arm(cell.clone(), tx, 1000, cancel.clone()).await;
        tokio::time::sleep(Duration::from_secs(4)).await;

        let s = cell.snapshot().await;
        assert_eq!(s.mode, Mode::Idle);
        assert_eq!(s.remaining_secs, 0);
        assert!(s.chime_pending);
        assert!(!s.timer_armed);

        // remaining time never increased along the way
        let mut last = u32::MAX;
        while let Ok(e) = rx.try_recv() {
            if let OvenEvent::TimeRemaining(secs) = e {
                assert!(secs < last);
                last = secs;
            }
        }
        assert_eq!(last, 0);
        cancel.cancel();
    }
}
