use crate::{
    error::AppError,
    model::deduction::{Deduction, DeductionCategory, DeductionStatus},
    service::WriteGate,
    store,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateDeduction {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub period_start: NaiveDate,
    #[schema(example = "2026-01-15", format = "date", value_type = String)]
    pub period_end: NaiveDate,
    #[schema(example = "advance")]
    pub category: DeductionCategory,
    #[schema(example = 1500.0)]
    pub amount: f64,
    #[schema(example = "Eid advance", nullable = true)]
    pub description: Option<String>,
}

impl CreateDeduction {
    fn validate(&self) -> Result<(), AppError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(AppError::Validation(
                "amount must be a non-negative number".into(),
            ));
        }
        if self.period_start > self.period_end {
            return Err(AppError::Validation(
                "period_start cannot be after period_end".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DeductionFilter {
    #[schema(example = 1)]
    /// Filter by employee ID
    pub employee_id: Option<i64>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    /// Filter by the period the deduction is booked against
    pub period_start: Option<NaiveDate>,
    /// Filter by category
    pub category: Option<DeductionCategory>,
    /// Filter by status, active only when omitted
    pub status: Option<DeductionStatus>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    I64(i64),
    Date(NaiveDate),
    Str(&'static str),
}

/* =========================
Record a deduction or advance
========================= */
#[utoipa::path(
    post,
    path = "/api/deductions",
    request_body = CreateDeduction,
    responses(
        (status = 201, description = "Deduction recorded", body = Deduction),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Deduction"
)]
pub async fn create_deduction(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    payload: web::Json<CreateDeduction>,
) -> actix_web::Result<impl Responder> {
    payload.validate()?;

    let _guard = gate.lock().await;

    if store::find_employee(pool.get_ref(), payload.employee_id)
        .await
        .map_err(AppError::from)?
        .is_none()
    {
        return Err(AppError::not_found("employee", payload.employee_id).into());
    }

    let result = sqlx::query(
        r#"
        INSERT INTO deductions
            (employee_id, period_start, period_end, category, amount, description, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.period_start)
    .bind(payload.period_end)
    .bind(payload.category)
    .bind(payload.amount)
    .bind(payload.description.as_deref())
    .bind(DeductionStatus::Active)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to create deduction");
        AppError::from(e)
    })?;

    let deduction_id = result.last_insert_rowid();
    let deduction = store::find_deduction(pool.get_ref(), deduction_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("deduction", deduction_id))?;

    info!(
        deduction_id,
        employee_id = deduction.employee_id,
        category = %deduction.category,
        amount = deduction.amount,
        "Deduction recorded"
    );

    Ok(HttpResponse::Created().json(deduction))
}

#[utoipa::path(
    get,
    path = "/api/deductions",
    params(DeductionFilter),
    responses(
        (status = 200, description = "Matching deductions", body = [Deduction])
    ),
    tag = "Deduction"
)]
pub async fn list_deductions(
    pool: web::Data<SqlitePool>,
    query: web::Query<DeductionFilter>,
) -> actix_web::Result<impl Responder> {
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

    if let Some(category) = query.category {
        where_sql.push_str(" AND category = ?");
        args.push(FilterValue::Str(category.into()));
    }

    where_sql.push_str(" AND status = ?");
    args.push(FilterValue::Str(
        query.status.unwrap_or(DeductionStatus::Active).into(),
    ));

    let data_sql = format!(
        r#"
        SELECT id, employee_id, period_start, period_end, category, amount, description, status
        FROM deductions
        {}
        ORDER BY period_start DESC, id
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Deduction>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let deductions = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch deduction list");
        AppError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(deductions))
}

/* =========================
Soft-delete a deduction
========================= */
#[utoipa::path(
    delete,
    path = "/api/deductions/{deduction_id}",
    params(
        ("deduction_id" = i64, Path, description = "Deduction ID")
    ),
    responses(
        (status = 200, description = "Deduction deleted", body = Object, example = json!({
            "message": "Deduction deleted"
        })),
        (status = 404, description = "Deduction not found")
    ),
    tag = "Deduction"
)]
pub async fn delete_deduction(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let deduction_id = path.into_inner();

    let _guard = gate.lock().await;

    let result = sqlx::query("UPDATE deductions SET status = ? WHERE id = ?")
        .bind(DeductionStatus::Deleted)
        .bind(deduction_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, deduction_id, "Failed to delete deduction");
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("deduction", deduction_id).into());
    }

    info!(deduction_id, "Deduction deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Deduction deleted"
    })))
}
