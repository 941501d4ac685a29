use crate::{
    error::AppError,
    model::employee::Employee,
    service::WriteGate,
    store,
    utils::{
        clock::{self, MINUTES_PER_DAY},
        db_utils::{Column, ColumnKind, build_update_sql, execute_update},
    },
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

/// Columns a PUT may touch
const UPDATABLE: &[Column] = &[
    Column::new("name", ColumnKind::Text),
    Column::nullable("hourly_rate", ColumnKind::Money),
    Column::nullable("per_shift_amount", ColumnKind::Money),
    Column::nullable("monthly_salary", ColumnKind::Money),
    Column::new("shift_start", ColumnKind::Clock),
    Column::new("shift_end", ColumnKind::Clock),
    Column::new("break_minutes", ColumnKind::Minutes),
    Column::new("is_active", ColumnKind::Flag),
];

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Rahim Uddin")]
    pub name: String,
    #[schema(example = 120.0, nullable = true)]
    pub hourly_rate: Option<f64>,
    #[schema(example = 800.0, nullable = true)]
    pub per_shift_amount: Option<f64>,
    #[schema(example = 25000.0, nullable = true)]
    pub monthly_salary: Option<f64>,
    #[serde(with = "clock::hhmm")]
    #[schema(example = "09:00", value_type = String)]
    pub shift_start: NaiveTime,
    #[serde(with = "clock::hhmm")]
    #[schema(example = "18:00", value_type = String)]
    pub shift_end: NaiveTime,
    #[serde(default)]
    #[schema(example = 60)]
    pub break_minutes: u32,
}

impl CreateEmployee {
    fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name must not be empty".into()));
        }

        for (field, value) in [
            ("hourly_rate", self.hourly_rate),
            ("per_shift_amount", self.per_shift_amount),
            ("monthly_salary", self.monthly_salary),
        ] {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(AppError::Validation(format!(
                        "{} must be a non-negative number",
                        field
                    )));
                }
            }
        }

        if self.break_minutes > MINUTES_PER_DAY {
            return Err(AppError::Validation(
                "break_minutes must not exceed 1440".into(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    #[schema(example = true)]
    /// Filter by active flag
    pub is_active: Option<bool>,
    #[schema(example = "rahim")]
    /// Search by name
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    Bool(bool),
    Str(String),
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid payload", body = Object, example = json!({
            "message": "name must not be empty"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    payload.validate()?;

    let _guard = gate.lock().await;

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (name, hourly_rate, per_shift_amount, monthly_salary, shift_start, shift_end, break_minutes)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(payload.hourly_rate)
    .bind(payload.per_shift_amount)
    .bind(payload.monthly_salary)
    .bind(payload.shift_start)
    .bind(payload.shift_end)
    .bind(payload.break_minutes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        AppError::from(e)
    })?;

    let employee_id = result.last_insert_rowid();
    let employee = store::find_employee(pool.get_ref(), employee_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("employee", employee_id))?;

    info!(employee_id, "Employee created");

    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse)
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(is_active) = query.is_active {
        conditions.push("is_active = ?");
        bindings.push(FilterValue::Bool(is_active));
    }

    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        conditions.push("name LIKE ?");
        bindings.push(FilterValue::Str(format!("%{}%", search)));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    // ---------- total count ----------
    let count_sql = format!("SELECT COUNT(*) FROM employees {}", where_clause);
    debug!(sql = %count_sql, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::Bool(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.as_str()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, sql = %count_sql, "Failed to count employees");
        AppError::from(e)
    })?;

    // ---------- data query ----------
    let data_sql = format!(
        r#"
        SELECT id, name, hourly_rate, per_shift_amount, monthly_salary,
               shift_start, shift_end, break_minutes, is_active
        FROM employees
        {}
        ORDER BY id
        LIMIT ? OFFSET ?
        "#,
        where_clause
    );
    debug!(page, per_page, offset, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::Bool(v) => data_query.bind(*v),
            FilterValue::Str(s) => data_query.bind(s.as_str()),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let employees = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        AppError::from(e)
    })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Update Employee
///
/// Only the listed fields are accepted. Stored payroll entries are not
/// touched; recalculate the open periods afterwards.
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    request_body(content = Object, description = "Any subset of name, hourly_rate, per_shift_amount, monthly_salary, shift_start, shift_end, break_minutes, is_active"),
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Unknown or invalid field"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "employee 9 not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<SqlitePool>,
    gate: web::Data<WriteGate>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let _guard = gate.lock().await;

    let update = build_update_sql("employees", UPDATABLE, &body, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to update employee");
        AppError::from(e)
    })?;

    if affected == 0 {
        return Err(AppError::not_found("employee", employee_id).into());
    }

    let employee = store::find_employee(pool.get_ref(), employee_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::not_found("employee", employee_id))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = i64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = store::find_employee(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch employee");
            AppError::from(e)
        })?
        .ok_or_else(|| AppError::not_found("employee", employee_id))?;

    Ok(HttpResponse::Ok().json(employee))
}
