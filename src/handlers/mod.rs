//! handlers/mod.rs
pub mod notifier_handler;
pub mod send_log_handler;
