use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

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
pub enum DeductionCategory {
    /// Salary paid ahead of the period end
    Advance,
    Loan,
    Other,
}

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
pub enum DeductionStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Deduction {
    #[schema(example = 3)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub period_end: NaiveDate,

    pub category: DeductionCategory,

    #[schema(example = 1500.0)]
    pub amount: f64,

    #[schema(example = "Eid advance", nullable = true)]
    pub description: Option<String>,

    pub status: DeductionStatus,
}

impl Deduction {
    pub fn is_active(&self) -> bool {
        self.status == DeductionStatus::Active
    }
}
