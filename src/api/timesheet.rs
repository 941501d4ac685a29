use crate::{
    engine::{ShiftHours, compute_rostered_shift_hours, compute_shift_hours},
    error::AppError,
    model::timesheet::{EntryStatus, TimesheetEntry},
    service::WriteGate,
    store,
    utils::clock::{self, MINUTES_PER_DAY},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct SaveTimesheet {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "09:00", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "18:00", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    #[schema(example = 60)]
    pub break_minutes: u32,
    #[schema(example = "covered evening delivery", nullable = true)]
    pub note: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct EditTimesheet {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub work_date: NaiveDate,
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "09:00", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "19:30", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    #[schema(example = 60)]
    pub break_minutes: u32,
    #[schema(nullable = true)]
    pub note: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TimesheetFilter {
    #[schema(example = 1)]
    /// Filter by employee ID
    pub employee_id: Option<i64>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    /// First work date, inclusive
    pub from: Option<NaiveDate>,
    #[schema(example = "2026-01-15", format = "date", value_type = Option<String>)]
    /// Last work date, inclusive
    pub to: Option<NaiveDate>,
    /// Include voided entries
    pub include_voided: Option<bool>,
}

#[derive(Deserialize, ToSchema)]
pub struct ShiftPreview {
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "19:30", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "20:45", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
    #[serde(default)]
    #[schema(example = 0)]
    pub break_minutes: u32,
    /// When given, an overnight standard shift ends on the following day
    #[serde(default, with = "clock::hhmm_option")]
    #[schema(example = "09:00", value_type = Option<String>)]
    pub standard_shift_start: Option<NaiveTime>,
    #[serde(with = "clock::hhmm")]
    #[schema(example = "18:00", value_type = String)]
    pub standard_shift_end: NaiveTime,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    I64(i64),
    Date(NaiveDate),
}

fn validate_break(break_minutes: u32) -> Result<(), AppError> {
    if break_minutes > MINUTES_PER_DAY {
        return Err(AppError::Validation(
            "break_minutes must not exceed 1440".into(),
        ));
    }
    Ok(())
}

/* =========================
Save a new timesheet entry
========================= */
#[utoipa::path(
    post,
    path = "/api/timesheets",
    request_body = SaveTimesheet,
    responses(
        (status = 201, description = "Entry saved", body = TimesheetEntry),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Employee not found")
    ),
    tag = "Timesheet"
)]
pub async fn save_timesheet(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    payload: web::Json<SaveTimesheet>,
) -> actix_web::Result<impl Responder> {
    validate_break(payload.break_minutes)?;

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
        INSERT INTO timesheet_entries
            (employee_id, work_date, clock_in, clock_out, break_minutes, status, note)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.work_date)
    .bind(payload.clock_in)
    .bind(payload.clock_out)
    .bind(payload.break_minutes)
    .bind(EntryStatus::Active)
    .bind(payload.note.as_deref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to save timesheet");
        AppError::from(e)
    })?;

    let entry_id = result.last_insert_rowid();
    let entry = store::find_timesheet(pool.get_ref(), entry_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("timesheet entry", entry_id))?;

    info!(entry_id, employee_id = entry.employee_id, "Timesheet entry saved");

    Ok(HttpResponse::Created().json(entry))
}

/* =========================
Edit an active entry
========================= */
#[utoipa::path(
    put,
    path = "/api/timesheets/{entry_id}",
    params(
        ("entry_id" = i64, Path, description = "Timesheet entry ID")
    ),
    request_body = EditTimesheet,
    responses(
        (status = 200, description = "Entry updated", body = TimesheetEntry),
        (status = 404, description = "Entry not found"),
        (status = 409, description = "Entry is voided", body = Object, example = json!({
            "message": "timesheet entry 3 is voided"
        }))
    ),
    tag = "Timesheet"
)]
pub async fn edit_timesheet(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    path: web::Path<i64>,
    payload: web::Json<EditTimesheet>,
) -> actix_web::Result<impl Responder> {
    let entry_id = path.into_inner();
    validate_break(payload.break_minutes)?;

    let _guard = gate.lock().await;

    let current = store::find_timesheet(pool.get_ref(), entry_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("timesheet entry", entry_id))?;

    if !current.is_active() {
        return Err(AppError::Conflict(format!("timesheet entry {} is voided", entry_id)).into());
    }

    sqlx::query(
        r#"
        UPDATE timesheet_entries
        SET work_date = ?, clock_in = ?, clock_out = ?, break_minutes = ?, note = ?
        WHERE id = ?
          AND status = 'active'
        "#,
    )
    .bind(payload.work_date)
    .bind(payload.clock_in)
    .bind(payload.clock_out)
    .bind(payload.break_minutes)
    .bind(payload.note.as_deref())
    .bind(entry_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, entry_id, "Failed to edit timesheet");
        AppError::from(e)
    })?;

    let entry = store::find_timesheet(pool.get_ref(), entry_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("timesheet entry", entry_id))?;

    Ok(HttpResponse::Ok().json(entry))
}

/* =========================
Void an entry
========================= */
#[utoipa::path(
    post,
    path = "/api/timesheets/{entry_id}/void",
    params(
        ("entry_id" = i64, Path, description = "Timesheet entry ID")
    ),
    responses(
        (status = 200, description = "Entry voided", body = TimesheetEntry),
        (status = 404, description = "Entry not found")
    ),
    tag = "Timesheet"
)]
pub async fn void_timesheet(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let entry_id = path.into_inner();

    let _guard = gate.lock().await;

    let result = sqlx::query("UPDATE timesheet_entries SET status = ? WHERE id = ?")
        .bind(EntryStatus::Voided)
        .bind(entry_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, entry_id, "Failed to void timesheet");
            AppError::from(e)
        })?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("timesheet entry", entry_id).into());
    }

    let entry = store::find_timesheet(pool.get_ref(), entry_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("timesheet entry", entry_id))?;

    info!(entry_id, "Timesheet entry voided");

    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/timesheets",
    params(TimesheetFilter),
    responses(
        (status = 200, description = "Matching entries ordered by date", body = [TimesheetEntry])
    ),
    tag = "Timesheet"
)]
pub async fn list_timesheets(
    pool: web::Data<SqlitePool>,
    query: web::Query<TimesheetFilter>,
) -> actix_web::Result<impl Responder> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::I64(employee_id));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND work_date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND work_date <= ?");
        args.push(FilterValue::Date(to));
    }

    if !query.include_voided.unwrap_or(false) {
        where_sql.push_str(" AND status = 'active'");
    }

    let data_sql = format!(
        r#"
        SELECT id, employee_id, work_date, clock_in, clock_out, break_minutes, status, note
        FROM timesheet_entries
        {}
        ORDER BY work_date, id
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, TimesheetEntry>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::I64(v) => data_q.bind(v),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let entries = data_q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch timesheet list");
        AppError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Runs the shift-hour calculator on ad-hoc input without storing anything.
#[utoipa::path(
    post,
    path = "/api/timesheets/preview",
    request_body = ShiftPreview,
    responses(
        (status = 200, description = "Computed shift hours", body = ShiftHours, example = json!({
            "total_minutes": 75,
            "billable_minutes": 30,
            "regular_minutes": 0,
            "overtime_minutes": 30,
            "night_status": "Night Shift",
            "dinner_break_deduction": 45
        }))
    ),
    tag = "Timesheet"
)]
pub async fn preview_shift(payload: web::Json<ShiftPreview>) -> actix_web::Result<impl Responder> {
    validate_break(payload.break_minutes)?;

    let hours = match payload.standard_shift_start {
        Some(shift_start) => compute_rostered_shift_hours(
            payload.clock_in,
            payload.clock_out,
            payload.break_minutes,
            shift_start,
            payload.standard_shift_end,
        ),
        None => compute_shift_hours(
            payload.clock_in,
            payload.clock_out,
            payload.break_minutes,
            payload.standard_shift_end,
        ),
    };

    Ok(HttpResponse::Ok().json(hours))
}
