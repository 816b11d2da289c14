use std::env;

use rolegate_application::InactiveGrantPolicy;
use rolegate_core::AppError;
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub inactive_grants: InactiveGrantPolicy,
}

impl AdminConfig {
    pub fn load() -> Result<Self, AppError> {
        let database_url = required_non_empty_env("DATABASE_URL")?;

        let max_connections = match env::var("ROLEGATE_DB_MAX_CONNECTIONS") {
            Ok(value) => parse_max_connections(value.as_str())?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let inactive_grants = env::var("ROLEGATE_INACTIVE_GRANTS")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<InactiveGrantPolicy>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            max_connections,
            inactive_grants,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_max_connections(value: &str) -> Result<u32, AppError> {
    let parsed = value.trim().parse::<u32>().map_err(|error| {
        AppError::Validation(format!("invalid ROLEGATE_DB_MAX_CONNECTIONS: {error}"))
    })?;
    if parsed == 0 {
        return Err(AppError::Validation(
            "ROLEGATE_DB_MAX_CONNECTIONS must be at least 1".to_owned(),
        ));
    }

    Ok(parsed)
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
