use serde::{Deserialize, Serialize};

/// Days and hours a monthly salary is spread over to price overtime.
pub const SALARY_DAYS_PER_MONTH: f64 = 30.0;
pub const SALARY_HOURS_PER_DAY: f64 = 8.0;

/// Pay rules that are a product decision rather than arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayPolicy {
    /// Multiplier applied to the implied hourly rate for overtime minutes
    pub overtime_multiplier: f64,
    /// Net pay differences up to this amount do not flag a paid entry
    pub adjustment_tolerance: f64,
}

impl Default for PayPolicy {
    fn default() -> Self {
        Self {
            overtime_multiplier: 1.5,
            adjustment_tolerance: 0.01,
        }
    }
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
