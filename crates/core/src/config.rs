use serde::{Deserialize, Serialize};

/// All oven timing parameters. Defaults match the poll rates of the
/// reference appliance: one-second polls for most monitors, a sub-second
/// emergency poll, and five-second cooling / auto-resume delays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OvenCfg {
    // monitor poll intervals (ms)
    pub power_poll_ms: u64,
    pub announcer_poll_ms: u64,
    pub emergency_poll_ms: u64,
    pub cooling_poll_ms: u64,
    pub schedule_poll_ms: u64,
    pub turntable_poll_ms: u64,
    pub lamp_poll_ms: u64,
    pub auto_resume_poll_ms: u64,

    /// Countdown step of the cycle timer (ms). One step removes one second
    /// of remaining cook time.
    pub timer_tick_ms: u64,

    // lock-released waits (seconds)
    pub cooldown_secs: u64,
    pub resume_delay_secs: u64,

    /// Report bus capacity. Emission inside a guarded step never blocks;
    /// events are dropped with a warning when the bus is full.
    pub report_buffer: usize,
}

impl Default for OvenCfg {
    fn default() -> Self {
        Self {
            power_poll_ms: 1000,
            announcer_poll_ms: 1000,
            emergency_poll_ms: 100,
            cooling_poll_ms: 1000,
            schedule_poll_ms: 1000,
            turntable_poll_ms: 2000,
            lamp_poll_ms: 1000,
            auto_resume_poll_ms: 1000,
            timer_tick_ms: 1000,
            cooldown_secs: 5,
            resume_delay_secs: 5,
            report_buffer: 64,
        }
    }
}
