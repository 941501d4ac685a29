use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

use crate::{
    engine::PayPolicy,
    error::AppError,
    model::payroll::{PayPeriod, PaymentStatus, PayrollEntry},
    service::{self, BulkRecalculation, WriteGate},
    store,
};

#[derive(Deserialize, ToSchema)]
pub struct RecalculatePayroll {
    #[schema(example = 1)]
    pub employee_id: i64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub period_end: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct RecalculateAll {
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub period_start: NaiveDate,

    #[schema(example = "2026-01-15", value_type = String, format = "date")]
    pub period_end: NaiveDate,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePaymentStatus {
    #[schema(example = "paid")]
    pub status: PaymentStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1)]
    pub employee_id: Option<i64>,

    #[schema(example = "2026-01-01", value_type = Option<String>, format = "date")]
    pub period_start: Option<NaiveDate>,

    pub status: Option<PaymentStatus>,

    /// Only entries flagged as adjusted after payment
    pub adjusted: Option<bool>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollEntry>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    I64(i64),
    Date(NaiveDate),
    Str(&'static str),
    Bool(bool),
}

#[utoipa::path(
    post,
    path = "/api/payroll/recalculate",
    request_body = RecalculatePayroll,
    responses(
        (status = 200, description = "Entry recomputed and stored", body = PayrollEntry),
        (status = 400, description = "Invalid period"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 9 not found"
        }))
    ),
    tag = "Payroll"
)]
pub async fn recalculate_payroll(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    policy: web::Data<PayPolicy>,
    payload: web::Json<RecalculatePayroll>,
) -> actix_web::Result<impl Responder> {
    let period = PayPeriod::new(payload.period_start, payload.period_end)?;

    let entry = service::recalculate(
        pool.get_ref(),
        gate.get_ref(),
        payload.employee_id,
        period,
        policy.get_ref(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    post,
    path = "/api/payroll/recalculate-all",
    request_body = RecalculateAll,
    responses(
        (status = 200, description = "Stored entries and per-employee failures", body = BulkRecalculation),
        (status = 400, description = "Invalid period")
    ),
    tag = "Payroll"
)]
pub async fn recalculate_all(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    policy: web::Data<PayPolicy>,
    payload: web::Json<RecalculateAll>,
) -> actix_web::Result<impl Responder> {
    let period = PayPeriod::new(payload.period_start, payload.period_end)?;

    let result =
        service::recalculate_all(pool.get_ref(), gate.get_ref(), period, policy.get_ref()).await?;

    Ok(HttpResponse::Ok().json(result))
}

#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/status",
    request_body = UpdatePaymentStatus,
    params(
        ("payroll_id" = i64, Path, description = "Payroll entry ID")
    ),
    responses(
        (status = 200, description = "Payment status updated", body = PayrollEntry),
        (status = 404, description = "Payroll entry not found")
    ),
    tag = "Payroll"
)]
pub async fn update_payment_status(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    path: web::Path<i64>,
    body: web::Json<UpdatePaymentStatus>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let entry =
        service::set_payment_status(pool.get_ref(), gate.get_ref(), payroll_id, body.status)
            .await?;

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id" = i64, Path, description = "Payroll entry ID")
    ),
    responses(
        (status = 200, body = PayrollEntry),
        (status = 404)
    ),
    tag = "Payroll"
)]
pub async fn get_payroll(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let payroll = store::find_payroll(pool.get_ref(), payroll_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, payroll_id, "Failed to fetch payroll");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found("payroll entry", payroll_id))?;

    Ok(HttpResponse::Ok().json(payroll))
}

#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse)
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    pool: web::Data<SqlitePool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::I64(employee_id));
    }

    if let Some(period_start) = query.period_start {
        where_sql.push_str(" AND period_start = ?");
        args.push(FilterValue::Date(period_start));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND payment_status = ?");
        args.push(FilterValue::Str(status.into()));
    }

    if let Some(adjusted) = query.adjusted {
        where_sql.push_str(" AND is_adjusted = ?");
        args.push(FilterValue::Bool(adjusted));
    }

    let count_sql = format!("SELECT COUNT(*) FROM payroll_entries{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::I64(v) => count_q.bind(*v),
            FilterValue::Date(d) => count_q.bind(*d),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Bool(b) => count_q.bind(*b),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payrolls");
        AppError::from(e)
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, period_start, period_end, pay_basis, working_days,
               total_minutes, billable_minutes, overtime_minutes, hourly_rate,
               regular_pay, overtime_pay, gross_pay,
               advance_deductions, loan_deductions, other_deductions, total_deductions,
               net_pay, payment_status, paid_at, paid_amount, is_adjusted,
               adjustment_amount, created_at
        FROM payroll_entries
        {}
        ORDER BY period_start DESC, employee_id
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayrollEntry>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Bool(b) => data_q.bind(b),
        };
    }

    let data = data_q
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payroll list");
            AppError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}
