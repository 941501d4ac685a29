use std::collections::BTreeSet;

use crate::{
    engine::{
        policy::{PayPolicy, SALARY_DAYS_PER_MONTH, SALARY_HOURS_PER_DAY, round_cents},
        shift_hours::compute_rostered_shift_hours,
    },
    model::{
        deduction::{Deduction, DeductionCategory},
        employee::Employee,
        payroll::{DeductionTotals, PayBasis, PayPeriod, PaymentStatus, PayrollEntry},
        timesheet::TimesheetEntry,
    },
};

/// Everything a recalculation owns. Identity, payment status and timestamps
/// are not part of it; those come from the stored entry in [`merge`].
#[derive(Debug, Clone, PartialEq)]
pub struct PayrollDerived {
    pub employee_id: i64,
    pub period: PayPeriod,
    pub pay_basis: PayBasis,
    pub working_days: u32,
    pub total_minutes: u32,
    pub billable_minutes: u32,
    pub overtime_minutes: u32,
    pub hourly_rate: f64,
    pub regular_pay: f64,
    pub overtime_pay: f64,
    pub gross_pay: f64,
    pub deductions: DeductionTotals,
    pub net_pay: f64,
}

#[derive(Debug, Default)]
struct MinuteTotals {
    total: u32,
    billable: u32,
    overtime: u32,
    working_days: u32,
}

/// Recomputes the payroll entry of `employee` for `period` and folds it into
/// the previously stored entry, if any.
pub fn recalculate_payroll(
    employee: &Employee,
    period: &PayPeriod,
    entries: &[TimesheetEntry],
    deductions: &[Deduction],
    previous: Option<&PayrollEntry>,
    policy: &PayPolicy,
) -> PayrollEntry {
    merge(
        previous,
        compute_derived(employee, period, entries, deductions, policy),
        policy,
    )
}

pub fn compute_derived(
    employee: &Employee,
    period: &PayPeriod,
    entries: &[TimesheetEntry],
    deductions: &[Deduction],
    policy: &PayPolicy,
) -> PayrollDerived {
    let minutes = sum_minutes(employee, period, entries);
    let (pay_basis, regular_pay, hourly_rate) = base_pay(employee, &minutes);

    let overtime_pay =
        minutes.overtime as f64 / 60.0 * hourly_rate * policy.overtime_multiplier;
    let regular_pay = round_cents(regular_pay);
    let overtime_pay = round_cents(overtime_pay);
    let gross_pay = round_cents(regular_pay + overtime_pay);

    let deductions = sum_deductions(employee.id, period, deductions);
    let net_pay = round_cents((gross_pay - deductions.total_deductions).max(0.0));

    PayrollDerived {
        employee_id: employee.id,
        period: *period,
        pay_basis,
        working_days: minutes.working_days,
        total_minutes: minutes.total,
        billable_minutes: minutes.billable,
        overtime_minutes: minutes.overtime,
        hourly_rate: round_cents(hourly_rate),
        regular_pay,
        overtime_pay,
        gross_pay,
        deductions,
        net_pay,
    }
}

/// Overwrites the derived fields of `existing` with `derived`. Identity,
/// payment status, `paid_at`, `paid_amount` and `created_at` are carried
/// over untouched. A paid entry whose net pay moved away from what was paid
/// by more than the tolerance is flagged as adjusted.
pub fn merge(
    existing: Option<&PayrollEntry>,
    derived: PayrollDerived,
    policy: &PayPolicy,
) -> PayrollEntry {
    let (is_adjusted, adjustment_amount) = match existing {
        Some(prev) if prev.payment_status == PaymentStatus::Paid => {
            let baseline = prev.paid_amount.unwrap_or(prev.net_pay);
            let delta = round_cents(derived.net_pay - baseline);
            if delta.abs() > policy.adjustment_tolerance {
                (true, delta)
            } else {
                (false, 0.0)
            }
        }
        _ => (false, 0.0),
    };

    PayrollEntry {
        id: existing.and_then(|e| e.id),
        employee_id: derived.employee_id,
        period_start: derived.period.start,
        period_end: derived.period.end,
        pay_basis: derived.pay_basis,
        working_days: derived.working_days,
        total_minutes: derived.total_minutes,
        billable_minutes: derived.billable_minutes,
        overtime_minutes: derived.overtime_minutes,
        hourly_rate: derived.hourly_rate,
        regular_pay: derived.regular_pay,
        overtime_pay: derived.overtime_pay,
        gross_pay: derived.gross_pay,
        deductions: derived.deductions,
        net_pay: derived.net_pay,
        payment_status: existing.map_or(PaymentStatus::Unpaid, |e| e.payment_status),
        paid_at: existing.and_then(|e| e.paid_at),
        paid_amount: existing.and_then(|e| e.paid_amount),
        is_adjusted,
        adjustment_amount,
        created_at: existing.and_then(|e| e.created_at),
    }
}

fn sum_minutes(employee: &Employee, period: &PayPeriod, entries: &[TimesheetEntry]) -> MinuteTotals {
    let mut totals = MinuteTotals::default();
    let mut days = BTreeSet::new();

    for entry in entries
        .iter()
        .filter(|e| e.employee_id == employee.id && e.is_active() && period.contains(e.work_date))
    {
        let hours = compute_rostered_shift_hours(
            entry.clock_in,
            entry.clock_out,
            entry.break_minutes,
            employee.shift_start,
            employee.shift_end,
        );
        totals.total += hours.total_minutes;
        totals.billable += hours.billable_minutes;
        totals.overtime += hours.overtime_minutes;

        if entry.has_complete_clock() {
            days.insert(entry.work_date);
        }
    }

    totals.working_days = days.len() as u32;
    totals
}

/// Returns the pay basis, unrounded regular pay and the implied hourly rate.
fn base_pay(employee: &Employee, minutes: &MinuteTotals) -> (PayBasis, f64, f64) {
    match (employee.per_shift_amount, employee.hourly_rate) {
        (Some(per_shift), _) if minutes.working_days > 0 => {
            let days = minutes.working_days as f64;
            let standard = employee.standard_billable_minutes();
            if standard == 0 {
                // nothing to prorate against, pay the flat shift amount
                let rate = per_shift / SALARY_HOURS_PER_DAY;
                return (PayBasis::PerShift, per_shift * days, rate);
            }

            let rate = per_shift / (standard as f64 / 60.0);
            let expected = standard as f64 * days;
            let regular = per_shift * days * (minutes.billable as f64 / expected);
            (PayBasis::PerShift, regular, rate)
        }
        (_, Some(rate)) => (PayBasis::Hourly, rate * minutes.billable as f64 / 60.0, rate),
        _ => {
            let salary = employee.monthly_salary.unwrap_or(0.0);
            let rate = salary / SALARY_DAYS_PER_MONTH / SALARY_HOURS_PER_DAY;
            (PayBasis::Salary, salary, rate)
        }
    }
}

fn sum_deductions(employee_id: i64, period: &PayPeriod, deductions: &[Deduction]) -> DeductionTotals {
    let mut totals = DeductionTotals::default();

    for d in deductions
        .iter()
        .filter(|d| d.employee_id == employee_id && d.is_active() && d.period_start == period.start)
    {
        match d.category {
            DeductionCategory::Advance => totals.advance_deductions += d.amount,
            DeductionCategory::Loan => totals.loan_deductions += d.amount,
            DeductionCategory::Other => totals.other_deductions += d.amount,
        }
    }

    totals.advance_deductions = round_cents(totals.advance_deductions);
    totals.loan_deductions = round_cents(totals.loan_deductions);
    totals.other_deductions = round_cents(totals.other_deductions);
    totals.total_deductions = round_cents(
        totals.advance_deductions + totals.loan_deductions + totals.other_deductions,
    );
    totals
}
