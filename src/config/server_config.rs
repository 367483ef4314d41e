//! config/server_config.rs
//! Parámetros del servidor HTTP y de la base de datos.

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub database_url: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("SERVER_PORT") {
            Ok(p) => p.parse().context("SERVER_PORT inválido")?,
            Err(_) => 5022,
        };
        let workers = match std::env::var("SERVER_WORKERS") {
            Ok(w) => w.parse().context("SERVER_WORKERS inválido")?,
            Err(_) => 1,
        };
        // Por defecto: ./data/notifier.db
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/notifier.db".to_string());

        Ok(Self {
            host,
            port,
            workers,
            database_url,
        })
    }
}
