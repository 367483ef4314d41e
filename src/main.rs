use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};
use std::{str::FromStr, sync::Arc};

use crate::config::{notifier_config::NotifierConfig, server_config::ServerConfig};
use crate::logger::init_logger;
use crate::services::channel_registry::ChannelRegistry;
use crate::services::notifier_service::NotifierService;
use crate::services::send_log_service::SendLogService;
use crate::services::send_request_service::SendRequestService;

mod app;
mod config;
mod errors;
mod handlers;
mod logger;
mod models;
mod services;
#[cfg(test)]
mod tests;

async fn setup_database(database_url: &str) -> anyhow::Result<Pool<Sqlite>> {
    // Carpeta "data" para la ruta por defecto
    std::fs::create_dir_all("data")?;

    log::info!("Conectando a SQLite en {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(db_pool)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok(); // Cargar .env al inicio
    init_logger();

    let server_config = ServerConfig::from_env().map_err(std::io::Error::other)?;
    let notifier_config = NotifierConfig::from_env().map_err(std::io::Error::other)?;

    // Conectarnos a la DB
    let db_pool = setup_database(&server_config.database_url)
        .await
        .map_err(std::io::Error::other)?;

    // Solicitudes (y migraciones)
    let request_service = SendRequestService::new(db_pool.clone());
    if let Err(e) = request_service.run_migrations().await {
        log::error!("Fallo en migraciones: {:?}", e);
        return Err(std::io::Error::other(e));
    }

    let log_service = SendLogService::new(db_pool.clone());

    // Canales: se resuelven una sola vez a partir de la configuración
    let registry = ChannelRegistry::from_config(&notifier_config).map_err(std::io::Error::other)?;

    let notifier_service = NotifierService::new(
        Arc::new(registry),
        Arc::new(log_service.clone()),
        request_service.clone(),
    );

    log::info!(
        "Levantando servidor en {}:{}",
        server_config.host,
        server_config.port
    );
    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(request_service.clone()))
            .app_data(web::Data::new(log_service.clone()))
            .app_data(web::Data::new(notifier_service.clone()))
            .configure(app::init_app)
    })
    .workers(server_config.workers)
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await
}
