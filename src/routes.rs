use crate::{
    api::{deduction, employee, payroll, timesheet},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Helper to build per-scope limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let requests_per_min = requests_per_min.max(1);
        let per_ms = (60_000 / requests_per_min as u64).max(1);
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.route("/health", web::get().to(health));

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee)),
                    ),
            )
            .service(
                web::scope("/timesheets")
                    // /timesheets
                    .service(
                        web::resource("")
                            .route(web::post().to(timesheet::save_timesheet))
                            .route(web::get().to(timesheet::list_timesheets)),
                    )
                    // /timesheets/preview, registered ahead of /{id}
                    .service(
                        web::resource("/preview").route(web::post().to(timesheet::preview_shift)),
                    )
                    // /timesheets/{id}
                    .service(
                        web::resource("/{id}").route(web::put().to(timesheet::edit_timesheet)),
                    )
                    // /timesheets/{id}/void
                    .service(
                        web::resource("/{id}/void")
                            .route(web::post().to(timesheet::void_timesheet)),
                    ),
            )
            .service(
                web::scope("/deductions")
                    // /deductions
                    .service(
                        web::resource("")
                            .route(web::post().to(deduction::create_deduction))
                            .route(web::get().to(deduction::list_deductions)),
                    )
                    // /deductions/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::delete().to(deduction::delete_deduction)),
                    ),
            )
            .service(
                web::scope("/payroll")
                    // /payroll
                    .service(web::resource("").route(web::get().to(payroll::list_payrolls)))
                    // /payroll/recalculate
                    .service(
                        web::resource("/recalculate")
                            .route(web::post().to(payroll::recalculate_payroll)),
                    )
                    // /payroll/recalculate-all
                    .service(
                        web::resource("/recalculate-all")
                            .route(web::post().to(payroll::recalculate_all)),
                    )
                    // /payroll/{id}
                    .service(web::resource("/{id}").route(web::get().to(payroll::get_payroll)))
                    // /payroll/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(payroll::update_payment_status)),
                    ),
            ),
    );
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
