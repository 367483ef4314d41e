//! config/mod.rs
//! Configuración de la aplicación (servidor y proveedores de notificación).

pub mod notifier_config;
pub mod server_config;
