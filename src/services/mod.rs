//! services/mod.rs
//! Módulo que agrupa distintos "servicios" o "capas de negocio" de la app.

pub mod channel_registry;
pub mod channels;
pub mod notifier_service;
pub mod phone_normalizer;
pub mod send_log_service;
pub mod send_request_service;
