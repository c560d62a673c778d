//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;

use super::toll_rates::TollRateTable;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub tag_index_ttl: u64,
    pub scanner_token: String,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub request_timeout: Duration,
    pub toll_rates: TollRateTable,
    pub max_commit_attempts: u32,
}

impl EnvironmentConfig {
    /// Cargar configuración desde variables de entorno
    pub fn from_env() -> Result<Self> {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_map(&vars)
    }

    /// Cargar configuración desde un mapa clave/valor (tests y from_env)
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let default_rate = match get("DEFAULT_TOLL_RATE") {
            Some(raw) => Decimal::from_str(&raw).context("DEFAULT_TOLL_RATE must be a decimal amount")?,
            None => TollRateTable::default().default_rate(),
        };
        let toll_rates = match get("TOLL_RATES") {
            Some(raw) => TollRateTable::parse(&raw, default_rate).context("invalid TOLL_RATES")?,
            None => {
                let defaults = TollRateTable::default();
                if default_rate == defaults.default_rate() {
                    defaults
                } else {
                    TollRateTable::new(HashMap::new(), default_rate)?
                }
            }
        };

        let max_commit_attempts = parse_or(&get, "MAX_COMMIT_ATTEMPTS", 3u32)?;
        if max_commit_attempts == 0 {
            return Err(anyhow!("MAX_COMMIT_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            port: parse_or(&get, "PORT", 3000u16)?,
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 20u32)?,
            redis_url: get("REDIS_URL"),
            tag_index_ttl: parse_or(&get, "TAG_INDEX_TTL_SECS", 3600u64)?,
            scanner_token: get("SCANNER_TOKEN").ok_or_else(|| anyhow!("SCANNER_TOKEN must be set"))?,
            jwt_secret: get("JWT_SECRET").ok_or_else(|| anyhow!("JWT_SECRET must be set"))?,
            cors_origins: get("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            request_timeout: Duration::from_secs(parse_or(&get, "REQUEST_TIMEOUT_SECS", 10u64)?),
            toll_rates,
            max_commit_attempts,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
