use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

use crate::utils::clock;

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
pub enum EntryStatus {
    Active,
    Voided,
}

/// One clock-in/clock-out record. Entries are never deleted, only voided.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TimesheetEntry {
    #[schema(example = 10)]
    pub id: i64,

    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,

    #[serde(with = "clock::hhmm_option")]
    #[schema(example = "09:00", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,

    #[serde(with = "clock::hhmm_option")]
    #[schema(example = "18:00", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,

    #[schema(example = 60)]
    pub break_minutes: u32,

    pub status: EntryStatus,

    #[schema(example = "covered evening delivery", nullable = true)]
    pub note: Option<String>,
}

impl TimesheetEntry {
    pub fn is_active(&self) -> bool {
        self.status == EntryStatus::Active
    }

    pub fn has_complete_clock(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_some()
    }
}
