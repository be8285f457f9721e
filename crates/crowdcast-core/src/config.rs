use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_cron = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let fields = raw.split_whitespace().count();
        if fields == 6 || fields == 7 {
            Ok(raw)
        } else {
            Err(invalid(
                var,
                format!("expected a 6-field cron expression, got {fields} fields"),
            ))
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CROWDCAST_ENV", "development"))?;

    let bind_addr = parse_addr("CROWDCAST_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CROWDCAST_LOG_LEVEL", "info");
    let achievements_path = PathBuf::from(or_default(
        "CROWDCAST_ACHIEVEMENTS_PATH",
        "./config/achievements.yaml",
    ));

    let db_max_connections = parse_u32("CROWDCAST_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CROWDCAST_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CROWDCAST_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let trending_cron = parse_cron("CROWDCAST_TRENDING_CRON", "0 */5 * * * *")?;
    let streak_reset_cron = parse_cron("CROWDCAST_STREAK_RESET_CRON", "0 5 0 * * *")?;
    let rate_limit_per_minute = parse_usize("CROWDCAST_RATE_LIMIT_PER_MINUTE", "120")?;

    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "CROWDCAST_RATE_LIMIT_PER_MINUTE",
            "must be greater than zero".to_string(),
        ));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        achievements_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        trending_cron,
        streak_reset_cron,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CROWDCAST_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
