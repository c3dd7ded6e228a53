//! Scheduled-start monitor.
//!
//! Counts a pending schedule down one second per poll. On the
//! positive-to-zero edge it starts the selected cycle and arms the cycle
//! timer. Non-positive delays never reach that edge, so a zero or negative
//! schedule is effectively inactive.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::monitor::timer;
use crate::report::{self, OvenEvent, ReportSender};
use crate::state::{Mode, StateCell};

pub fn spawn(
    state: StateCell,
    reports: ReportSender,
    poll_ms: u64,
    timer_tick_ms: u64,
    cancel: CancellationToken,
) {
    tokio::spawn(async move {
        let interval = Duration::from_millis(poll_ms);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("schedule monitor shutting down");
                    return;
                }
                _ = tokio::time::sleep(interval) => {}
            }
            tick(&state, &reports, timer_tick_ms, &cancel).await;
        }
    });
}

/// One schedule poll. Arms the cycle timer when the countdown fires.
pub async fn tick(
    state: &StateCell,
    reports: &ReportSender,
    timer_tick_ms: u64,
    cancel: &CancellationToken,
) {
    let fired = state
        .with(|s| {
            if !s.schedule_active || s.scheduled_secs <= 0 {
                return false;
            }
            s.scheduled_secs -= 1;
            if s.scheduled_secs > 0 {
                return false;
            }
            s.schedule_active = false;
            if s.remaining_secs == 0 {
                // nothing selected to cook; starting would strand the oven
                // in Running with zero remaining time
                tracing::warn!("scheduled start fired with no cycle time, ignored");
                return false;
            }
            s.mode = Mode::Running;
            let cycle = s.active_cycle.map(|c| c.name).unwrap_or("(none)");
            report::emit(reports, OvenEvent::ScheduledStart { cycle });
            tracing::info!(cycle, "scheduled start fired");
            true
        })
        .await;
    if fired {
        timer::arm(state.clone(), reports.clone(), timer_tick_ms, cancel.clone()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycles;
    use crate::state::OvenState;

    fn scheduled_state(delay: i64) -> StateCell {
        let mut s = OvenState::new();
        let chicken = cycles::get(2).unwrap();
        s.active_cycle = Some(chicken);
        s.remaining_secs = chicken.duration_secs;
        s.schedule_active = true;
        s.scheduled_secs = delay;
        StateCell::new(s)
    }

    #[tokio::test]
    async fn fires_after_exactly_three_polls() {
        let cell = scheduled_state(3);
        let (tx, mut rx) = report::channel(8);
        let cancel = CancellationToken::new();

        tick(&cell, &tx, 1000, &cancel).await;
        tick(&cell, &tx, 1000, &cancel).await;
        assert_eq!(cell.snapshot().await.mode, Mode::Idle);
        assert!(rx.try_recv().is_err());

        tick(&cell, &tx, 1000, &cancel).await;

        let s = cell.snapshot().await;
        assert_eq!(s.mode, Mode::Running);
        assert!(!s.schedule_active);
        assert!(s.timer_armed);
        assert_eq!(rx.try_recv().unwrap(), OvenEvent::ScheduledStart { cycle: "Chicken" });
        cancel.cancel();
    }

    #[tokio::test]
    async fn fired_schedule_stays_inactive() {
        let cell = scheduled_state(1);
        let (tx, mut rx) = report::channel(8);
        let cancel = CancellationToken::new();

        tick(&cell, &tx, 1000, &cancel).await;
        let _ = rx.try_recv();
        tick(&cell, &tx, 1000, &cancel).await;
        tick(&cell, &tx, 1000, &cancel).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(cell.snapshot().await.scheduled_secs, 0);
        cancel.cancel();
    }

    #[tokio::test]
    async fn non_positive_delay_never_fires() {
        for delay in [0, -5] {
            let cell = scheduled_state(delay);
            let (tx, mut rx) = report::channel(8);
            let cancel = CancellationToken::new();

            for _ in 0..10 {
                tick(&cell, &tx, 1000, &cancel).await;
            }

            let s = cell.snapshot().await;
            assert_eq!(s.mode, Mode::Idle);
            assert!(s.schedule_active);
            assert_eq!(s.scheduled_secs, delay);
            assert!(rx.try_recv().is_err());
        }
    }

    #[tokio::test]
    async fn firing_without_cycle_time_stays_idle() {
        let mut s = OvenState::new();
        s.schedule_active = true;
        s.scheduled_secs = 1;
        let cell = StateCell::new(s);
        let (tx, mut rx) = report::channel(8);
        let cancel = CancellationToken::new();

        tick(&cell, &tx, 1000, &cancel).await;

        let after = cell.snapshot().await;
        assert_eq!(after.mode, Mode::Idle);
        assert!(!after.schedule_active);
        assert!(!after.timer_armed);
        assert!(rx.try_recv().is_err());
    }
}
