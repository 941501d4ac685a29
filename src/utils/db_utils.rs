use chrono::NaiveTime;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::{error::AppError, utils::clock::{MINUTES_PER_DAY, parse_clock}};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    Text(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Time(NaiveTime),
    Null,
}

/// ===============================
/// Updatable column description
/// ===============================
#[derive(Debug, Clone, Copy)]
pub enum ColumnKind {
    /// Non-empty string
    Text,
    /// Non-negative amount
    Money,
    /// Whole minutes within one day
    Minutes,
    /// `HH:MM` time of day
    Clock,
    Flag,
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, nullable: false }
    }

    pub const fn nullable(name: &'static str, kind: ColumnKind) -> Self {
        Self { name, kind, nullable: true }
    }
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Only keys listed in `columns` are accepted, so column names in the
/// generated SQL never come from the request.
pub fn build_update_sql(
    table: &str,
    columns: &[Column],
    payload: &Value,
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, AppError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::Validation("Payload must be a JSON object".into()))?;

    if obj.is_empty() {
        return Err(AppError::Validation("No fields provided for update".into()));
    }

    if let Some(unknown) = obj.keys().find(|k| !columns.iter().any(|c| c.name == k.as_str())) {
        return Err(AppError::Validation(format!(
            "Field '{}' cannot be updated",
            unknown
        )));
    }

    let mut assignments = Vec::with_capacity(obj.len());
    let mut values = Vec::with_capacity(obj.len() + 1);

    // SET clause follows the column list, not the payload
    for column in columns {
        if let Some(value) = obj.get(column.name) {
            assignments.push(format!("{} = ?", column.name));
            values.push(convert(column, value)?);
        }
    }

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ?",
        table,
        assignments.join(", "),
        id_column
    );

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

fn convert(column: &Column, value: &Value) -> Result<SqlValue, AppError> {
    let invalid = |expected: &str| {
        AppError::Validation(format!("Field '{}' must be {}", column.name, expected))
    };

    if value.is_null() {
        return if column.nullable {
            Ok(SqlValue::Null)
        } else {
            Err(invalid("present"))
        };
    }

    match column.kind {
        ColumnKind::Text => match value.as_str().map(str::trim) {
            Some(s) if !s.is_empty() => Ok(SqlValue::Text(s.to_string())),
            _ => Err(invalid("a non-empty string")),
        },
        ColumnKind::Money => match value.as_f64() {
            Some(n) if n >= 0.0 && n.is_finite() => Ok(SqlValue::F64(n)),
            _ => Err(invalid("a non-negative number")),
        },
        ColumnKind::Minutes => match value.as_i64() {
            Some(n) if (0..=MINUTES_PER_DAY as i64).contains(&n) => Ok(SqlValue::I64(n)),
            _ => Err(invalid("whole minutes between 0 and 1440")),
        },
        ColumnKind::Clock => value
            .as_str()
            .and_then(parse_clock)
            .map(SqlValue::Time)
            .ok_or_else(|| invalid("a time formatted HH:MM")),
        ColumnKind::Flag => value
            .as_bool()
            .map(SqlValue::Bool)
            .ok_or_else(|| invalid("true or false")),
    }
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &SqlitePool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Time(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const COLUMNS: &[Column] = &[
        Column::new("name", ColumnKind::Text),
        Column::nullable("hourly_rate", ColumnKind::Money),
        Column::new("break_minutes", ColumnKind::Minutes),
        Column::new("shift_end", ColumnKind::Clock),
    ];

    #[test]
    fn builds_set_clause_for_known_columns() {
        let update = build_update_sql(
            "employees",
            COLUMNS,
            &json!({"name": "Nadia", "shift_end": "17:30", "hourly_rate": null}),
            "id",
            7,
        )
        .unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET name = ?, hourly_rate = ?, shift_end = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::Text("Nadia".into()),
                SqlValue::Null,
                SqlValue::Time(NaiveTime::from_hms_opt(17, 30, 0).unwrap()),
                SqlValue::I64(7),
            ]
        );
    }

    #[test]
    fn rejects_unknown_columns() {
        let err = build_update_sql("employees", COLUMNS, &json!({"id": 3}), "id", 7).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("'id'")));
    }

    #[test]
    fn rejects_negative_money_and_bad_clock() {
        assert!(build_update_sql("employees", COLUMNS, &json!({"hourly_rate": -1}), "id", 1).is_err());
        assert!(build_update_sql("employees", COLUMNS, &json!({"shift_end": "7pm"}), "id", 1).is_err());
        assert!(build_update_sql("employees", COLUMNS, &json!({"break_minutes": 2000}), "id", 1).is_err());
    }

    #[test]
    fn rejects_empty_payload_and_null_for_required() {
        assert!(build_update_sql("employees", COLUMNS, &json!({}), "id", 1).is_err());
        assert!(build_update_sql("employees", COLUMNS, &json!({"name": null}), "id", 1).is_err());
        assert!(build_update_sql("employees", COLUMNS, &json!([1, 2]), "id", 1).is_err());
    }
}
