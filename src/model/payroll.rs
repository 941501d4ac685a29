use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

use crate::error::AppError;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
}

/// Which compensation rule produced the regular pay of an entry.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PayBasis {
    PerShift,
    Hourly,
    Salary,
}

/// Inclusive date range of a payroll cycle, identified by its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PayPeriod {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start: NaiveDate,
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub end: NaiveDate,
}

impl PayPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::Validation(format!(
                "period start {} is after period end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct DeductionTotals {
    #[schema(example = 1000.0)]
    pub advance_deductions: f64,
    #[schema(example = 0.0)]
    pub loan_deductions: f64,
    #[schema(example = 200.0)]
    pub other_deductions: f64,
    #[schema(example = 1200.0)]
    pub total_deductions: f64,
}

/// Stored result of a payroll recalculation for one (employee, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollEntry {
    /// `None` until the entry has been persisted
    #[schema(example = 7, nullable = true)]
    pub id: Option<i64>,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub period_end: NaiveDate,

    pub pay_basis: PayBasis,

    #[schema(example = 12)]
    pub working_days: u32,

    #[schema(example = 5940)]
    pub total_minutes: u32,

    #[schema(example = 5220)]
    pub billable_minutes: u32,

    #[schema(example = 300)]
    pub overtime_minutes: u32,

    /// Rate used to price overtime
    #[schema(example = 100.0)]
    pub hourly_rate: f64,

    #[schema(example = 8700.0)]
    pub regular_pay: f64,

    #[schema(example = 750.0)]
    pub overtime_pay: f64,

    #[schema(example = 9450.0)]
    pub gross_pay: f64,

    #[sqlx(flatten)]
    pub deductions: DeductionTotals,

    #[schema(example = 8250.0)]
    pub net_pay: f64,

    pub payment_status: PaymentStatus,

    #[schema(example = "2026-01-16T10:00:00Z", format = "date-time", value_type = Option<String>)]
    pub paid_at: Option<DateTime<Utc>>,

    /// Net pay at the moment the entry was marked paid
    #[schema(example = 8250.0, nullable = true)]
    pub paid_amount: Option<f64>,

    pub is_adjusted: bool,

    /// Signed difference between the recomputed net pay and the paid amount
    #[schema(example = -49.5)]
    pub adjustment_amount: f64,

    #[schema(example = "2026-01-16T09:00:00Z", format = "date-time", value_type = Option<String>)]
    pub created_at: Option<DateTime<Utc>>,
}

impl PayrollEntry {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// Records a payment of the current net pay. The paid amount becomes the
    /// baseline later recalculations are compared against.
    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.payment_status = PaymentStatus::Paid;
        self.paid_at = Some(at);
        self.paid_amount = Some(self.net_pay);
        self.is_adjusted = false;
        self.adjustment_amount = 0.0;
    }

    pub fn mark_unpaid(&mut self) {
        self.payment_status = PaymentStatus::Unpaid;
        self.paid_at = None;
        self.paid_amount = None;
        self.is_adjusted = false;
        self.adjustment_amount = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn period_rejects_reversed_range() {
        assert!(matches!(
            PayPeriod::new(date(15), date(1)),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let period = PayPeriod::new(date(1), date(15)).unwrap();
        assert!(period.contains(date(1)));
        assert!(period.contains(date(15)));
        assert!(!period.contains(date(16)));
    }

    #[test]
    fn status_strings_round_trip_through_strum() {
        use std::str::FromStr;
        assert_eq!(PaymentStatus::from_str("paid").unwrap(), PaymentStatus::Paid);
        assert_eq!(PayBasis::PerShift.to_string(), "per_shift");
    }
}
