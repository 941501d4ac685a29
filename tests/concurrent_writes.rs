use actix_web::{
    App,
    http::{Method, StatusCode},
    test,
    web::Data,
};
use futures::future::join_all;
use serde_json::{Value, json};
use shiftpay::{db::init_db, routes, service::WriteGate};

mod common;

use common::{request, test_config};

#[actix_web::test]
async fn recalculations_interleaved_with_timesheet_writes_all_succeed() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let url = format!("sqlite://{}", dir.path().join("payroll.db").display());
    // several connections so writes can land while a recalculation is open
    let config = test_config(&url, 4);
    let pool = init_db(&config.database_url, config.db_max_connections)
        .await
        .expect("file database");

    let app = test::init_service(
        App::new()
            .app_data(Data::new(pool))
            .app_data(Data::new(WriteGate::default()))
            .app_data(Data::new(config.pay_policy()))
            .configure(|cfg| routes::configure(cfg, &config)),
    )
    .await;
    let app = &app;

    let req = request(Method::POST, "/api/employees")
        .set_json(json!({
            "name": "Rahim Uddin",
            "hourly_rate": 100.0,
            "shift_start": "09:00",
            "shift_end": "18:00",
            "break_minutes": 60
        }))
        .to_request();
    let employee: Value = test::call_and_read_body_json(app, req).await;
    let employee_id = employee["id"].as_i64().unwrap();

    let period = json!({
        "employee_id": employee_id,
        "period_start": "2026-01-01",
        "period_end": "2026-01-15"
    });

    let recalculations = (0..10).map(|_| {
        let period = period.clone();
        async move {
            let req = request(Method::POST, "/api/payroll/recalculate")
                .set_json(period)
                .to_request();
            test::call_service(app, req).await.status()
        }
    });
    let saves = (1..=10).map(|day| async move {
        let req = request(Method::POST, "/api/timesheets")
            .set_json(json!({
                "employee_id": employee_id,
                "work_date": format!("2026-01-{:02}", day),
                "clock_in": "09:00",
                "clock_out": "18:00",
                "break_minutes": 60
            }))
            .to_request();
        test::call_service(app, req).await.status()
    });

    let (recalculated, saved) = futures::join!(join_all(recalculations), join_all(saves));

    assert!(recalculated.iter().all(|s| *s == StatusCode::OK), "{:?}", recalculated);
    assert!(saved.iter().all(|s| *s == StatusCode::CREATED), "{:?}", saved);

    let req = request(Method::POST, "/api/payroll/recalculate")
        .set_json(period)
        .to_request();
    let entry: Value = test::call_and_read_body_json(app, req).await;
    assert_eq!(entry["working_days"], 10);
    assert_eq!(entry["billable_minutes"], 4800);
}
