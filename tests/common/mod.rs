use actix_web::{http::Method, test::TestRequest};
use shiftpay::config::Config;

pub fn test_config(database_url: &str, max_connections: u32) -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        database_url: database_url.into(),
        db_max_connections: max_connections,
        api_prefix: "/api".into(),
        rate_protected_per_min: 10_000,
        log_dir: "logs".into(),
        log_level: tracing::Level::INFO,
        overtime_multiplier: 1.5,
        adjustment_tolerance: 0.01,
    }
}

pub fn request(method: Method, uri: &str) -> TestRequest {
    // the rate limiter keys on the peer address
    TestRequest::default()
        .method(method)
        .uri(uri)
        .peer_addr("127.0.0.1:40000".parse().unwrap())
}
