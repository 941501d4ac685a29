//! Row-level reads and writes shared by the handlers and the payroll service.
//! Every function takes any SQLite executor so it can run on the pool or
//! inside a transaction.

use chrono::NaiveDate;
use sqlx::{Executor, Sqlite};

use crate::model::{
    deduction::Deduction,
    employee::Employee,
    payroll::{PayPeriod, PayrollEntry},
    timesheet::TimesheetEntry,
};

const PAYROLL_COLUMNS: &str = r#"
    id, employee_id, period_start, period_end, pay_basis, working_days,
    total_minutes, billable_minutes, overtime_minutes, hourly_rate,
    regular_pay, overtime_pay, gross_pay,
    advance_deductions, loan_deductions, other_deductions, total_deductions,
    net_pay, payment_status, paid_at, paid_amount, is_adjusted,
    adjustment_amount, created_at
"#;

pub async fn find_employee<'e, E>(exec: E, employee_id: i64) -> sqlx::Result<Option<Employee>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, hourly_rate, per_shift_amount, monthly_salary,
               shift_start, shift_end, break_minutes, is_active
        FROM employees
        WHERE id = ?
        "#,
    )
    .bind(employee_id)
    .fetch_optional(exec)
    .await
}

pub async fn active_employee_ids<'e, E>(exec: E) -> sqlx::Result<Vec<i64>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>("SELECT id FROM employees WHERE is_active = 1 ORDER BY id")
        .fetch_all(exec)
        .await
}

pub async fn find_timesheet<'e, E>(exec: E, entry_id: i64) -> sqlx::Result<Option<TimesheetEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TimesheetEntry>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes, status, note
        FROM timesheet_entries
        WHERE id = ?
        "#,
    )
    .bind(entry_id)
    .fetch_optional(exec)
    .await
}

/// Active entries of one employee dated inside the period.
pub async fn timesheets_for_period<'e, E>(
    exec: E,
    employee_id: i64,
    period: &PayPeriod,
) -> sqlx::Result<Vec<TimesheetEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TimesheetEntry>(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes, status, note
        FROM timesheet_entries
        WHERE employee_id = ?
          AND status = 'active'
          AND work_date BETWEEN ? AND ?
        ORDER BY work_date, id
        "#,
    )
    .bind(employee_id)
    .bind(period.start)
    .bind(period.end)
    .fetch_all(exec)
    .await
}

pub async fn find_deduction<'e, E>(exec: E, deduction_id: i64) -> sqlx::Result<Option<Deduction>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Deduction>(
        r#"
        SELECT id, employee_id, period_start, period_end, category, amount, description, status
        FROM deductions
        WHERE id = ?
        "#,
    )
    .bind(deduction_id)
    .fetch_optional(exec)
    .await
}

/// Active deductions booked against the period start.
pub async fn deductions_for_period<'e, E>(
    exec: E,
    employee_id: i64,
    period_start: NaiveDate,
) -> sqlx::Result<Vec<Deduction>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Deduction>(
        r#"
        SELECT id, employee_id, period_start, period_end, category, amount, description, status
        FROM deductions
        WHERE employee_id = ?
          AND period_start = ?
          AND status = 'active'
        ORDER BY id
        "#,
    )
    .bind(employee_id)
    .bind(period_start)
    .fetch_all(exec)
    .await
}

pub async fn find_payroll<'e, E>(exec: E, payroll_id: i64) -> sqlx::Result<Option<PayrollEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!("SELECT {} FROM payroll_entries WHERE id = ?", PAYROLL_COLUMNS);
    sqlx::query_as::<_, PayrollEntry>(&sql)
        .bind(payroll_id)
        .fetch_optional(exec)
        .await
}

pub async fn find_payroll_by_key<'e, E>(
    exec: E,
    employee_id: i64,
    period_start: NaiveDate,
) -> sqlx::Result<Option<PayrollEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT {} FROM payroll_entries WHERE employee_id = ? AND period_start = ?",
        PAYROLL_COLUMNS
    );
    sqlx::query_as::<_, PayrollEntry>(&sql)
        .bind(employee_id)
        .bind(period_start)
        .fetch_optional(exec)
        .await
}

/// Writes every column of `entry`. Inserts when it has no id yet and returns
/// the row id either way.
pub async fn save_payroll<'e, E>(exec: E, entry: &PayrollEntry) -> sqlx::Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    match entry.id {
        Some(id) => {
            sqlx::query(
                r#"
                UPDATE payroll_entries
                SET period_end = ?, pay_basis = ?, working_days = ?,
                    total_minutes = ?, billable_minutes = ?, overtime_minutes = ?,
                    hourly_rate = ?, regular_pay = ?, overtime_pay = ?, gross_pay = ?,
                    advance_deductions = ?, loan_deductions = ?, other_deductions = ?,
                    total_deductions = ?, net_pay = ?, payment_status = ?, paid_at = ?,
                    paid_amount = ?, is_adjusted = ?, adjustment_amount = ?
                WHERE id = ?
                "#,
            )
            .bind(entry.period_end)
            .bind(entry.pay_basis)
            .bind(entry.working_days)
            .bind(entry.total_minutes)
            .bind(entry.billable_minutes)
            .bind(entry.overtime_minutes)
            .bind(entry.hourly_rate)
            .bind(entry.regular_pay)
            .bind(entry.overtime_pay)
            .bind(entry.gross_pay)
            .bind(entry.deductions.advance_deductions)
            .bind(entry.deductions.loan_deductions)
            .bind(entry.deductions.other_deductions)
            .bind(entry.deductions.total_deductions)
            .bind(entry.net_pay)
            .bind(entry.payment_status)
            .bind(entry.paid_at)
            .bind(entry.paid_amount)
            .bind(entry.is_adjusted)
            .bind(entry.adjustment_amount)
            .bind(id)
            .execute(exec)
            .await?;

            Ok(id)
        }
        None => {
            let result = sqlx::query(
                r#"
                INSERT INTO payroll_entries
                (employee_id, period_start, period_end, pay_basis, working_days,
                 total_minutes, billable_minutes, overtime_minutes, hourly_rate,
                 regular_pay, overtime_pay, gross_pay,
                 advance_deductions, loan_deductions, other_deductions, total_deductions,
                 net_pay, payment_status, paid_at, paid_amount, is_adjusted,
                 adjustment_amount, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.employee_id)
            .bind(entry.period_start)
            .bind(entry.period_end)
            .bind(entry.pay_basis)
            .bind(entry.working_days)
            .bind(entry.total_minutes)
            .bind(entry.billable_minutes)
            .bind(entry.overtime_minutes)
            .bind(entry.hourly_rate)
            .bind(entry.regular_pay)
            .bind(entry.overtime_pay)
            .bind(entry.gross_pay)
            .bind(entry.deductions.advance_deductions)
            .bind(entry.deductions.loan_deductions)
            .bind(entry.deductions.other_deductions)
            .bind(entry.deductions.total_deductions)
            .bind(entry.net_pay)
            .bind(entry.payment_status)
            .bind(entry.paid_at)
            .bind(entry.paid_amount)
            .bind(entry.is_adjusted)
            .bind(entry.adjustment_amount)
            .bind(entry.created_at)
            .execute(exec)
            .await?;

            Ok(result.last_insert_rowid())
        }
    }
}
