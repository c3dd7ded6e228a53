use std::fmt;

use tokio::sync::mpsc;

use crate::cycles::CurveKind;

/// An observation emitted by a monitor task. The console prints these;
/// tests count them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OvenEvent {
    PowerLevel { percent: u8, curve: CurveKind },
    CoolingActive,
    TimeRemaining(u32),
    CompletionChime,
    EmergencyChime,
    EmergencyCancelled,
    FanOn,
    CoolingComplete,
    ScheduledStart { cycle: &'static str },
    AutoResumePending,
    AutoResumed,
    Turntable { spinning: bool },
    Lamp { on: bool },
}

impl fmt::Display for OvenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerLevel { percent, curve: CurveKind::Constant } => {
                write!(f, "Emitter: constant power at {percent}%")
            }
            Self::PowerLevel { percent, curve: CurveKind::Exponential } => {
                write!(f, "Emitter: ramped power at {percent}% (exponential curve)")
            }
            Self::CoolingActive => write!(f, "Emitter: cooling cycle active"),
            Self::TimeRemaining(secs) => write!(f, "Time remaining: {secs} seconds"),
            Self::CompletionChime => write!(f, "Beep! Cycle complete!"),
            Self::EmergencyChime => write!(f, "Beep! Emergency stop!"),
            Self::EmergencyCancelled => write!(f, "Emergency stop: cycle cancelled"),
            Self::FanOn => write!(f, "Ventilation fan on for cooldown"),
            Self::CoolingComplete => write!(f, "Oven cooled down and ready"),
            Self::ScheduledStart { cycle } => write!(f, "Scheduled cycle started: {cycle}"),
            Self::AutoResumePending => write!(f, "Automatic restart pending..."),
            Self::AutoResumed => write!(f, "Automatic restart: oven running again"),
            Self::Turntable { spinning: true } => write!(f, "Turntable spinning"),
            Self::Turntable { spinning: false } => write!(f, "Turntable stopped"),
            Self::Lamp { on: true } => write!(f, "Cavity lamp: ON"),
            Self::Lamp { on: false } => write!(f, "Cavity lamp: OFF"),
        }
    }
}

/// Report bus sender; monitor tasks push observations here.
pub type ReportSender = mpsc::Sender<OvenEvent>;
/// Report bus receiver; the console (or a test) consumes from here.
pub type ReportReceiver = mpsc::Receiver<OvenEvent>;

/// Create a report bus with the given buffer size.
pub fn channel(buffer: usize) -> (ReportSender, ReportReceiver) {
    mpsc::channel(buffer)
}

/// Emit an event without blocking. Guarded steps call this while holding
/// the state lock, so a full bus must never suspend the sender.
pub fn emit(tx: &ReportSender, event: OvenEvent) {
    if let Err(e) = tx.try_send(event) {
        tracing::warn!(event = ?e.into_inner(), "report bus full, event dropped");
    }
}
