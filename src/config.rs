use std::collections::HashMap;
use thiserror::Error;

use crate::paging::PagingStrategy;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub max_connections: u32,
    pub audit_actor: String,
    pub page_size: i64,
    pub paging_strategy: PagingStrategy,
    pub purge_retention_days: i64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_path = env_map
            .get("DATABASE_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let max_connections = env_map
            .get("DB_MAX_CONNECTIONS")
            .map(|s| s.as_str())
            .unwrap_or("5")
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DB_MAX_CONNECTIONS".to_string(),
                    "must be a positive u32".to_string(),
                )
            })?;

        let audit_actor = env_map
            .get("AUDIT_ACTOR")
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|| "system".to_string());
        if audit_actor.is_empty() {
            return Err(ConfigError::InvalidValue(
                "AUDIT_ACTOR".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let page_size = env_map
            .get("PAGE_SIZE")
            .map(|s| s.as_str())
            .unwrap_or("10")
            .parse::<i64>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "PAGE_SIZE".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        let paging_strategy = match env_map
            .get("PAGING_STRATEGY")
            .map(|s| s.as_str())
            .unwrap_or("offset")
        {
            "materialized" => PagingStrategy::Materialized,
            "offset" => PagingStrategy::Offset,
            other => {
                return Err(ConfigError::InvalidValue(
                    "PAGING_STRATEGY".to_string(),
                    format!("must be materialized or offset, got {}", other),
                ))
            }
        };

        let purge_retention_days = env_map
            .get("PURGE_RETENTION_DAYS")
            .map(|s| s.as_str())
            .unwrap_or("30")
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "PURGE_RETENTION_DAYS".to_string(),
                    "must be a non-negative integer".to_string(),
                )
            })?;

        Ok(Config {
            database_path,
            max_connections,
            audit_actor,
            page_size,
            paging_strategy,
            purge_retention_days,
        })
    }
}
