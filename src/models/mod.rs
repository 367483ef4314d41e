//! models/mod.rs
//! Módulo raíz para modelos/estructuras compartidas.

pub mod channel_model;
pub mod send_log_model;
pub mod send_options_model;
pub mod send_request_model;
