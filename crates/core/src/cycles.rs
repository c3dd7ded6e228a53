use serde::{Deserialize, Serialize};

/// Shape of the power curve a heating profile drives the emitter with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurveKind {
    /// Fixed power for the whole cycle.
    Constant,
    /// Power ramps toward the rated percentage as the cycle progresses.
    Exponential,
}

/// A named heating profile selectable by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleProfile {
    pub name: &'static str,
    pub duration_secs: u32,
    pub power_percent: u8,
    pub curve: CurveKind,
}

/// The fixed factory catalog, indexed 0-4.
pub const CATALOG: [CycleProfile; 5] = [
    CycleProfile { name: "Meats", duration_secs: 600, power_percent: 100, curve: CurveKind::Constant },
    CycleProfile { name: "Fish", duration_secs: 450, power_percent: 80, curve: CurveKind::Exponential },
    CycleProfile { name: "Chicken", duration_secs: 500, power_percent: 90, curve: CurveKind::Constant },
    CycleProfile { name: "Lasagna", duration_secs: 700, power_percent: 100, curve: CurveKind::Exponential },
    CycleProfile { name: "Popcorn", duration_secs: 300, power_percent: 70, curve: CurveKind::Constant },
];

/// Look up a catalog profile by operator index.
pub fn get(index: usize) -> Option<CycleProfile> {
    CATALOG.get(index).copied()
}

impl CycleProfile {
    /// Effective emitter power at a point in the cycle, given the remaining
    /// cook time. Constant curves emit the rated percentage throughout;
    /// exponential curves ramp up as `1 - e^(-3t/T)` over the elapsed time,
    /// so they read visibly lower early in the cycle.
    pub fn power_at(&self, remaining_secs: u32) -> u8 {
        match self.curve {
            CurveKind::Constant => self.power_percent,
            CurveKind::Exponential => {
                let elapsed = self.duration_secs.saturating_sub(remaining_secs) as f64;
                let ratio = 1.0 - (-3.0 * elapsed / self.duration_secs as f64).exp();
                (self.power_percent as f64 * ratio).round() as u8
            }
        }
    }
}
