use std::env;

use crate::config::engine::parse_var;
use crate::error::AppError;

/// HTTP listener settings: `BACKEND_HOST` (0.0.0.0) and `BACKEND_PORT` (3001).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("BACKEND_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&lookup, "BACKEND_PORT")?.unwrap_or(3001);
        Ok(Self { host, port })
    }
}
