use actix_web::{
    App,
    http::{Method, StatusCode},
    test,
    web::Data,
};
use serde_json::{Value, json};
use shiftpay::{db::init_db, routes, service::WriteGate};

mod common;

use common::{request, test_config};

/// Fresh app over its own in-memory database.
macro_rules! test_app {
    () => {{
        let config = test_config("sqlite::memory:", 1);
        // a single connection keeps every query on the same in-memory database
        let pool = init_db(&config.database_url, 1)
            .await
            .expect("in-memory database");
        test::init_service(
            App::new()
                .app_data(Data::new(pool))
                .app_data(Data::new(WriteGate::default()))
                .app_data(Data::new(config.pay_policy()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

/// Sends a request and returns the status with the JSON body.
macro_rules! send {
    (@go $app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
    ($app:expr, $method:expr, $uri:expr) => {
        send!(@go $app, request($method, $uri))
    };
    ($app:expr, $method:expr, $uri:expr, $body:expr) => {
        send!(@go $app, request($method, $uri).set_json($body))
    };
}

fn money(v: &Value) -> f64 {
    v.as_f64().expect("numeric amount")
}

fn assert_money(v: &Value, expected: f64) {
    assert!(
        (money(v) - expected).abs() < 0.005,
        "expected {}, got {}",
        expected,
        v
    );
}

fn hourly_employee() -> Value {
    json!({
        "name": "Rahim Uddin",
        "hourly_rate": 100.0,
        "shift_start": "09:00",
        "shift_end": "18:00",
        "break_minutes": 60
    })
}

fn shift(employee_id: i64, date: &str, clock_in: &str, clock_out: &str) -> Value {
    json!({
        "employee_id": employee_id,
        "work_date": date,
        "clock_in": clock_in,
        "clock_out": clock_out,
        "break_minutes": 60
    })
}

fn first_half(employee_id: i64) -> Value {
    json!({
        "employee_id": employee_id,
        "period_start": "2026-01-01",
        "period_end": "2026-01-15"
    })
}

#[actix_web::test]
async fn health_answers_outside_the_api_scope() {
    let app = test_app!();
    let (status, body) = send!(app, Method::GET, "/health");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn employee_create_get_and_partial_update() {
    let app = test_app!();

    let (status, created) = send!(app, Method::POST, "/api/employees", hourly_employee());
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["shift_end"], "18:00");
    assert_eq!(created["is_active"], true);

    let (status, updated) = send!(
        app,
        Method::PUT,
        &format!("/api/employees/{}", id),
        json!({ "hourly_rate": 120.0, "shift_end": "19:00" })
    );
    assert_eq!(status, StatusCode::OK);
    assert_money(&updated["hourly_rate"], 120.0);
    assert_eq!(updated["shift_end"], "19:00");
    assert_eq!(updated["name"], "Rahim Uddin");

    let (status, _) = send!(
        app,
        Method::PUT,
        &format!("/api/employees/{}", id),
        json!({ "salary_grade": 3 })
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send!(app, Method::GET, "/api/employees/999");
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "employee 999 not found");

    let (status, list) = send!(app, Method::GET, "/api/employees?search=rahim");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
}

#[actix_web::test]
async fn employee_with_blank_name_is_rejected() {
    let app = test_app!();
    let mut payload = hourly_employee();
    payload["name"] = json!("   ");

    let (status, body) = send!(app, Method::POST, "/api/employees", payload);
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name must not be empty");
}

#[actix_web::test]
async fn timesheet_for_unknown_employee_is_not_found() {
    let app = test_app!();
    let (status, _) = send!(
        app,
        Method::POST,
        "/api/timesheets",
        shift(42, "2026-01-05", "09:00", "18:00")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn voided_timesheet_cannot_be_edited() {
    let app = test_app!();
    let (_, employee) = send!(app, Method::POST, "/api/employees", hourly_employee());
    let employee_id = employee["id"].as_i64().unwrap();

    let (status, entry) = send!(
        app,
        Method::POST,
        "/api/timesheets",
        shift(employee_id, "2026-01-05", "09:00", "18:00")
    );
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = entry["id"].as_i64().unwrap();

    let (status, voided) = send!(
        app,
        Method::POST,
        &format!("/api/timesheets/{}/void", entry_id)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voided["status"], "voided");

    // voiding twice is harmless
    let (status, _) = send!(
        app,
        Method::POST,
        &format!("/api/timesheets/{}/void", entry_id)
    );
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send!(
        app,
        Method::PUT,
        &format!("/api/timesheets/{}", entry_id),
        json!({ "work_date": "2026-01-05", "clock_in": "09:00", "clock_out": "20:00" })
    );
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listed) = send!(
        app,
        Method::GET,
        &format!("/api/timesheets?employee_id={}", employee_id)
    );
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let (_, listed) = send!(
        app,
        Method::GET,
        &format!(
            "/api/timesheets?employee_id={}&include_voided=true",
            employee_id
        )
    );
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn preview_splits_a_short_evening_shift() {
    let app = test_app!();
    let (status, hours) = send!(
        app,
        Method::POST,
        "/api/timesheets/preview",
        json!({
            "clock_in": "19:30",
            "clock_out": "20:45",
            "break_minutes": 0,
            "standard_shift_end": "18:00"
        })
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hours["total_minutes"], 75);
    assert_eq!(hours["dinner_break_deduction"], 45);
    assert_eq!(hours["billable_minutes"], 30);
    assert_eq!(hours["overtime_minutes"], 30);
    assert_eq!(hours["regular_minutes"], 0);
    assert_eq!(hours["night_status"], "Night Shift");
}

#[actix_web::test]
async fn preview_with_overnight_roster_ends_next_day() {
    let app = test_app!();
    let (status, hours) = send!(
        app,
        Method::POST,
        "/api/timesheets/preview",
        json!({
            "clock_in": "22:00",
            "clock_out": "06:00",
            "break_minutes": 30,
            "standard_shift_start": "22:00",
            "standard_shift_end": "06:00"
        })
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hours["billable_minutes"], 450);
    assert_eq!(hours["overtime_minutes"], 0);
    assert_eq!(hours["night_status"], "Extended Night");
}

#[actix_web::test]
async fn recalculation_rejects_bad_input() {
    let app = test_app!();

    let (status, _) = send!(app, Method::POST, "/api/payroll/recalculate", first_half(999));
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, employee) = send!(app, Method::POST, "/api/employees", hourly_employee());
    let (status, _) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        json!({
            "employee_id": employee["id"],
            "period_start": "2026-01-15",
            "period_end": "2026-01-01"
        })
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send!(app, Method::PUT, "/api/payroll/77/status", json!({ "status": "paid" }));
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn paid_entry_is_flagged_when_timesheets_change() {
    let app = test_app!();

    let (_, employee) = send!(app, Method::POST, "/api/employees", hourly_employee());
    let employee_id = employee["id"].as_i64().unwrap();

    // 480 billable minutes
    send!(
        app,
        Method::POST,
        "/api/timesheets",
        shift(employee_id, "2026-01-05", "09:00", "18:00")
    );
    // 570 billable minutes, 90 of them after the 18:00 shift end
    let (_, late) = send!(
        app,
        Method::POST,
        "/api/timesheets",
        shift(employee_id, "2026-01-06", "09:00", "19:30")
    );
    let late_id = late["id"].as_i64().unwrap();

    let (status, _) = send!(
        app,
        Method::POST,
        "/api/deductions",
        json!({
            "employee_id": employee_id,
            "period_start": "2026-01-01",
            "period_end": "2026-01-15",
            "category": "advance",
            "amount": 500.0
        })
    );
    assert_eq!(status, StatusCode::CREATED);

    let (status, entry) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        first_half(employee_id)
    );
    assert_eq!(status, StatusCode::OK);
    let payroll_id = entry["id"].as_i64().unwrap();
    assert_eq!(entry["pay_basis"], "hourly");
    assert_eq!(entry["working_days"], 2);
    assert_eq!(entry["billable_minutes"], 1050);
    assert_eq!(entry["overtime_minutes"], 90);
    assert_money(&entry["regular_pay"], 1750.0);
    assert_money(&entry["overtime_pay"], 225.0);
    assert_money(&entry["gross_pay"], 1975.0);
    assert_money(&entry["deductions"]["advance_deductions"], 500.0);
    assert_money(&entry["net_pay"], 1475.0);
    assert_eq!(entry["payment_status"], "unpaid");

    let (status, paid) = send!(
        app,
        Method::PUT,
        &format!("/api/payroll/{}/status", payroll_id),
        json!({ "status": "paid" })
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(paid["payment_status"], "paid");
    assert_money(&paid["paid_amount"], 1475.0);
    assert!(paid["paid_at"].is_string());

    // the late shift turns out to have ended on time
    let (status, _) = send!(
        app,
        Method::PUT,
        &format!("/api/timesheets/{}", late_id),
        json!({
            "work_date": "2026-01-06",
            "clock_in": "09:00",
            "clock_out": "18:00",
            "break_minutes": 60
        })
    );
    assert_eq!(status, StatusCode::OK);

    let (_, adjusted) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        first_half(employee_id)
    );
    assert_eq!(adjusted["id"], payroll_id);
    assert_eq!(adjusted["payment_status"], "paid");
    assert_eq!(adjusted["paid_at"], paid["paid_at"]);
    assert_money(&adjusted["net_pay"], 1100.0);
    assert_eq!(adjusted["is_adjusted"], true);
    assert_money(&adjusted["adjustment_amount"], -375.0);

    // recalculating again compares against what was paid, not the last result
    let (_, again) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        first_half(employee_id)
    );
    assert_eq!(again["is_adjusted"], true);
    assert_money(&again["adjustment_amount"], -375.0);

    let (_, flagged) = send!(app, Method::GET, "/api/payroll?adjusted=true");
    assert_eq!(flagged["total"], 1);
    assert_eq!(flagged["data"][0]["id"], payroll_id);

    // marking unpaid drops the paid baseline
    let (_, unpaid) = send!(
        app,
        Method::PUT,
        &format!("/api/payroll/{}/status", payroll_id),
        json!({ "status": "unpaid" })
    );
    assert_eq!(unpaid["payment_status"], "unpaid");
    assert_eq!(unpaid["is_adjusted"], false);
    assert!(unpaid["paid_amount"].is_null());
}

#[actix_web::test]
async fn deleted_deduction_no_longer_reduces_net_pay() {
    let app = test_app!();

    let (_, employee) = send!(app, Method::POST, "/api/employees", hourly_employee());
    let employee_id = employee["id"].as_i64().unwrap();
    send!(
        app,
        Method::POST,
        "/api/timesheets",
        shift(employee_id, "2026-01-05", "09:00", "18:00")
    );

    let (_, deduction) = send!(
        app,
        Method::POST,
        "/api/deductions",
        json!({
            "employee_id": employee_id,
            "period_start": "2026-01-01",
            "period_end": "2026-01-15",
            "category": "loan",
            "amount": 200.0
        })
    );
    let deduction_id = deduction["id"].as_i64().unwrap();

    let (_, entry) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        first_half(employee_id)
    );
    assert_money(&entry["net_pay"], 600.0);

    let (status, body) = send!(
        app,
        Method::DELETE,
        &format!("/api/deductions/{}", deduction_id)
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Deduction deleted");

    let (_, entry) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate",
        first_half(employee_id)
    );
    assert_money(&entry["deductions"]["total_deductions"], 0.0);
    assert_money(&entry["net_pay"], 800.0);

    let (status, _) = send!(app, Method::DELETE, "/api/deductions/999");
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn recalculate_all_covers_active_employees_only() {
    let app = test_app!();

    let (_, first) = send!(app, Method::POST, "/api/employees", hourly_employee());
    let (_, second) = send!(
        app,
        Method::POST,
        "/api/employees",
        json!({
            "name": "Karim",
            "monthly_salary": 24000.0,
            "shift_start": "10:00",
            "shift_end": "19:00"
        })
    );
    let (_, retired) = send!(app, Method::POST, "/api/employees", hourly_employee());
    send!(
        app,
        Method::PUT,
        &format!("/api/employees/{}", retired["id"]),
        json!({ "is_active": false })
    );

    let (status, result) = send!(
        app,
        Method::POST,
        "/api/payroll/recalculate-all",
        json!({ "period_start": "2026-01-01", "period_end": "2026-01-15" })
    );
    assert_eq!(status, StatusCode::OK);
    assert!(result["failures"].as_array().unwrap().is_empty());

    let entries = result["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["employee_id"], first["id"]);
    assert_money(&entries[0]["net_pay"], 0.0);
    assert_eq!(entries[1]["employee_id"], second["id"]);
    assert_eq!(entries[1]["pay_basis"], "salary");
    assert_money(&entries[1]["gross_pay"], 24000.0);

    // a second run updates in place
    send!(
        app,
        Method::POST,
        "/api/payroll/recalculate-all",
        json!({ "period_start": "2026-01-01", "period_end": "2026-01-15" })
    );
    let (_, listed) = send!(app, Method::GET, "/api/payroll?period_start=2026-01-01");
    assert_eq!(listed["total"], 2);
}
