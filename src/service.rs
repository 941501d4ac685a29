//! Read-modify-write cycles around a payroll entry. Each one runs inside a
//! single transaction while holding the [`WriteGate`].

use chrono::Utc;
use futures::lock::{Mutex, MutexGuard};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    engine::{PayPolicy, recalculate_payroll},
    error::AppError,
    model::payroll::{PayPeriod, PaymentStatus, PayrollEntry},
    store,
};

/// Serializes every database write within the process. Handlers that write
/// hold it for the whole statement, so a recalculation never sees its read
/// snapshot go stale before it writes.
#[derive(Default)]
pub struct WriteGate(Mutex<()>);

impl WriteGate {
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.0.lock().await
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecalculationFailure {
    #[schema(example = 4)]
    pub employee_id: i64,
    #[schema(example = "Internal Server Error")]
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkRecalculation {
    pub entries: Vec<PayrollEntry>,
    pub failures: Vec<RecalculationFailure>,
}

/// Recomputes and stores the payroll entry of one employee for one period.
#[instrument(skip(pool, gate, policy), fields(period_start = %period.start))]
pub async fn recalculate(
    pool: &SqlitePool,
    gate: &WriteGate,
    employee_id: i64,
    period: PayPeriod,
    policy: &PayPolicy,
) -> Result<PayrollEntry, AppError> {
    let _guard = gate.lock().await;
    recalculate_locked(pool, employee_id, period, policy).await
}

/// Recomputes every active employee. One employee failing does not stop the
/// others; failures are reported next to the stored entries.
#[instrument(skip(pool, gate, policy), fields(period_start = %period.start))]
pub async fn recalculate_all(
    pool: &SqlitePool,
    gate: &WriteGate,
    period: PayPeriod,
    policy: &PayPolicy,
) -> Result<BulkRecalculation, AppError> {
    let _guard = gate.lock().await;

    let employee_ids = store::active_employee_ids(pool).await?;
    let mut result = BulkRecalculation {
        entries: Vec::with_capacity(employee_ids.len()),
        failures: Vec::new(),
    };

    for employee_id in employee_ids {
        match recalculate_locked(pool, employee_id, period, policy).await {
            Ok(entry) => result.entries.push(entry),
            Err(e) => {
                warn!(error = %e, employee_id, "Recalculation failed");
                let message = match e {
                    AppError::Database(_) | AppError::Migration(_) => {
                        "Internal Server Error".to_string()
                    }
                    other => other.to_string(),
                };
                result.failures.push(RecalculationFailure {
                    employee_id,
                    message,
                });
            }
        }
    }

    info!(
        recalculated = result.entries.len(),
        failed = result.failures.len(),
        "Bulk recalculation finished"
    );

    Ok(result)
}

async fn recalculate_locked(
    pool: &SqlitePool,
    employee_id: i64,
    period: PayPeriod,
    policy: &PayPolicy,
) -> Result<PayrollEntry, AppError> {
    let mut tx = pool.begin().await?;

    let employee = store::find_employee(&mut *tx, employee_id)
        .await?
        .ok_or_else(|| AppError::not_found("employee", employee_id))?;
    let entries = store::timesheets_for_period(&mut *tx, employee_id, &period).await?;
    let deductions = store::deductions_for_period(&mut *tx, employee_id, period.start).await?;
    let previous = store::find_payroll_by_key(&mut *tx, employee_id, period.start).await?;

    let mut entry = recalculate_payroll(
        &employee,
        &period,
        &entries,
        &deductions,
        previous.as_ref(),
        policy,
    );
    if entry.created_at.is_none() {
        entry.created_at = Some(Utc::now());
    }

    let id = store::save_payroll(&mut *tx, &entry).await?;
    entry.id = Some(id);

    tx.commit().await?;

    if entry.is_adjusted {
        warn!(
            employee_id,
            net_pay = entry.net_pay,
            adjustment_amount = entry.adjustment_amount,
            "Paid payroll entry changed after recalculation"
        );
    } else {
        info!(employee_id, net_pay = entry.net_pay, "Payroll recalculated");
    }

    Ok(entry)
}

/// Moves an entry between paid and unpaid. Setting the status it already has
/// leaves the entry untouched.
#[instrument(skip(pool, gate))]
pub async fn set_payment_status(
    pool: &SqlitePool,
    gate: &WriteGate,
    payroll_id: i64,
    status: PaymentStatus,
) -> Result<PayrollEntry, AppError> {
    let _guard = gate.lock().await;
    let mut tx = pool.begin().await?;

    let mut entry = store::find_payroll(&mut *tx, payroll_id)
        .await?
        .ok_or_else(|| AppError::not_found("payroll entry", payroll_id))?;

    if entry.payment_status == status {
        return Ok(entry);
    }

    match status {
        PaymentStatus::Paid => entry.mark_paid(Utc::now()),
        PaymentStatus::Unpaid => entry.mark_unpaid(),
    }

    store::save_payroll(&mut *tx, &entry).await?;
    tx.commit().await?;

    info!(payroll_id, status = %status, net_pay = entry.net_pay, "Payment status changed");

    Ok(entry)
}
