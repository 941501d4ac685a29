use std::{env, str::FromStr};

use anyhow::{Context, Result};
use dotenvy::dotenv;

use crate::engine::PayPolicy;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub database_url: String,
    pub db_max_connections: u32,

    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,

    // Pay policy
    pub overtime_multiplier: f64,
    pub adjustment_tolerance: f64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let defaults = PayPolicy::default();

        Ok(Self {
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            database_url: var_or("DATABASE_URL", "sqlite://payroll.db"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,

            api_prefix: var_or("API_PREFIX", "/api"),

            rate_protected_per_min: parse_or("RATE_PROTECTED_PER_MIN", 1000)?,

            log_dir: var_or("LOG_DIR", "logs"),
            log_level: parse_or("LOG_LEVEL", tracing::Level::INFO)?,

            overtime_multiplier: parse_or("OVERTIME_MULTIPLIER", defaults.overtime_multiplier)?,
            adjustment_tolerance: parse_or("ADJUSTMENT_TOLERANCE", defaults.adjustment_tolerance)?,
        })
    }

    pub fn pay_policy(&self) -> PayPolicy {
        PayPolicy {
            overtime_multiplier: self.overtime_multiplier,
            adjustment_tolerance: self.adjustment_tolerance,
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // a single test so the env mutations cannot race each other
    #[test]
    fn env_overrides_apply_and_bad_values_fail_startup() {
        unsafe {
            env::set_var("OVERTIME_MULTIPLIER", "2.0");
            env::set_var("LOG_LEVEL", "debug");
        }
        let config = Config::from_env().unwrap();
        assert_eq!(config.pay_policy().overtime_multiplier, 2.0);
        assert_eq!(config.pay_policy().adjustment_tolerance, 0.01);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
        assert_eq!(config.api_prefix, "/api");

        unsafe {
            env::set_var("DB_MAX_CONNECTIONS", "many");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("DB_MAX_CONNECTIONS"));

        unsafe {
            for key in ["OVERTIME_MULTIPLIER", "LOG_LEVEL", "DB_MAX_CONNECTIONS"] {
                env::remove_var(key);
            }
        }
    }
}
