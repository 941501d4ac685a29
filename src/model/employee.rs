use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::clock::{self, MINUTES_PER_DAY};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Rahim Uddin",
        "hourly_rate": null,
        "per_shift_amount": 800.0,
        "monthly_salary": null,
        "shift_start": "09:00",
        "shift_end": "18:00",
        "break_minutes": 60,
        "is_active": true
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "Rahim Uddin")]
    pub name: String,

    #[schema(example = 120.0, nullable = true)]
    pub hourly_rate: Option<f64>,

    #[schema(example = 800.0, nullable = true)]
    pub per_shift_amount: Option<f64>,

    /// Fixed monthly salary, used when neither per-shift nor hourly pay applies
    #[schema(example = 25000.0, nullable = true)]
    pub monthly_salary: Option<f64>,

    #[serde(with = "clock::hhmm")]
    #[schema(example = "09:00", value_type = String)]
    pub shift_start: NaiveTime,

    #[serde(with = "clock::hhmm")]
    #[schema(example = "18:00", value_type = String)]
    pub shift_end: NaiveTime,

    #[schema(example = 60)]
    pub break_minutes: u32,

    #[schema(example = true)]
    pub is_active: bool,
}

impl Employee {
    /// Length of the configured shift, overnight aware.
    pub fn standard_shift_minutes(&self) -> u32 {
        let start = clock::minute_of_day(self.shift_start);
        let end = clock::minute_of_day(self.shift_end);
        if end >= start {
            end - start
        } else {
            end + MINUTES_PER_DAY - start
        }
    }

    /// Billable minutes of a standard day: shift length minus the configured break.
    pub fn standard_billable_minutes(&self) -> u32 {
        self.standard_shift_minutes()
            .saturating_sub(self.break_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(start: &str, end: &str, break_minutes: u32) -> Employee {
        Employee {
            id: 1,
            name: "Test".into(),
            hourly_rate: None,
            per_shift_amount: None,
            monthly_salary: None,
            shift_start: clock::parse_clock(start).unwrap(),
            shift_end: clock::parse_clock(end).unwrap(),
            break_minutes,
            is_active: true,
        }
    }

    #[test]
    fn standard_day_subtracts_break() {
        assert_eq!(employee("09:00", "18:00", 60).standard_billable_minutes(), 480);
    }

    #[test]
    fn overnight_standard_shift_wraps() {
        assert_eq!(employee("22:00", "06:00", 30).standard_billable_minutes(), 450);
    }

    #[test]
    fn break_longer_than_shift_floors_at_zero() {
        assert_eq!(employee("09:00", "09:30", 60).standard_billable_minutes(), 0);
    }
}
