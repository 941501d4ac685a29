use chrono::NaiveTime;
use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

use crate::utils::clock::{MINUTES_PER_DAY, minute_of_day};

/// Dinner window deducted from billable time, in minutes of day.
pub const DINNER_WINDOW: (u32, u32) = (20 * 60, 21 * 60);

/// Clock-outs at or after this minute of day count as night work.
pub const NIGHT_SHIFT_FROM: u32 = 20 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema, Display)]
pub enum NightStatus {
    #[default]
    #[serde(rename = "None")]
    #[strum(serialize = "None")]
    NotNight,
    #[serde(rename = "Night Shift")]
    #[strum(serialize = "Night Shift")]
    NightShift,
    #[serde(rename = "Extended Night")]
    #[strum(serialize = "Extended Night")]
    ExtendedNight,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct ShiftHours {
    /// Minutes between clock-in and clock-out
    pub total_minutes: u32,
    /// Elapsed minus configured break minus dinner overlap
    pub billable_minutes: u32,
    /// Billable minutes that are not overtime
    pub regular_minutes: u32,
    pub overtime_minutes: u32,
    pub night_status: NightStatus,
    /// Dinner-window overlap actually deducted
    pub dinner_break_deduction: u32,
}

/// Splits one worked shift into billable, regular and overtime minutes.
///
/// A clock-out earlier than the clock-in is read as next-day. The standard
/// shift end is placed on the clock-in day; everything worked after it is
/// overtime, minus whatever part of the dinner window falls in that span.
/// A missing clock-in or clock-out yields the all-zero result.
pub fn compute_shift_hours(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    break_minutes: u32,
    standard_shift_end: NaiveTime,
) -> ShiftHours {
    split_shift(clock_in, clock_out, break_minutes, |_| {
        minute_of_day(standard_shift_end)
    })
}

/// Like [`compute_shift_hours`], but knows where the standard shift starts.
/// When the standard shift crosses midnight, its end moves to the day after
/// the clock-in unless the clock-in already falls before that end.
pub fn compute_rostered_shift_hours(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    break_minutes: u32,
    standard_shift_start: NaiveTime,
    standard_shift_end: NaiveTime,
) -> ShiftHours {
    let shift_start = minute_of_day(standard_shift_start);
    let shift_end = minute_of_day(standard_shift_end);

    split_shift(clock_in, clock_out, break_minutes, |start| {
        if shift_end < shift_start && start > shift_end {
            shift_end + MINUTES_PER_DAY
        } else {
            shift_end
        }
    })
}

/// `resolve_shift_end` maps the clock-in minute to the standard shift end,
/// measured on the same axis as the clock-in.
fn split_shift(
    clock_in: Option<NaiveTime>,
    clock_out: Option<NaiveTime>,
    break_minutes: u32,
    resolve_shift_end: impl FnOnce(u32) -> u32,
) -> ShiftHours {
    let (Some(clock_in), Some(clock_out)) = (clock_in, clock_out) else {
        return ShiftHours::default();
    };

    let start = minute_of_day(clock_in);
    let out = minute_of_day(clock_out);
    let crosses_midnight = out < start;
    let end = if crosses_midnight {
        out + MINUTES_PER_DAY
    } else {
        out
    };

    let total_minutes = end - start;
    let dinner_break_deduction = dinner_overlap(start, end);
    let billable_minutes = total_minutes
        .saturating_sub(break_minutes)
        .saturating_sub(dinner_break_deduction);

    let overtime_from = start.max(resolve_shift_end(start));
    let overtime_minutes = if overtime_from < end {
        (end - overtime_from)
            .saturating_sub(dinner_overlap(overtime_from, end))
            .min(billable_minutes)
    } else {
        0
    };

    let night_status = if crosses_midnight {
        NightStatus::ExtendedNight
    } else if out >= NIGHT_SHIFT_FROM {
        NightStatus::NightShift
    } else {
        NightStatus::NotNight
    };

    ShiftHours {
        total_minutes,
        billable_minutes,
        regular_minutes: billable_minutes - overtime_minutes,
        overtime_minutes,
        night_status,
        dinner_break_deduction,
    }
}

/// Minutes of `[start, end)` that fall in a dinner window. `end` may run
/// into the next day, so the next day's window is checked too.
fn dinner_overlap(start: u32, end: u32) -> u32 {
    let (from, to) = DINNER_WINDOW;
    [0, MINUTES_PER_DAY]
        .iter()
        .map(|offset| overlap(start, end, from + offset, to + offset))
        .sum()
}

fn overlap(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> u32 {
    a_end.min(b_end).saturating_sub(a_start.max(b_start))
}
