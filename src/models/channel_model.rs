//! models/channel_model.rs
//! Tipos compartidos de canal: tipo de canal, estado de entrega y payload.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categoría del medio de entrega.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelType {
    Sms,
    Call,
    Push,
    Mail,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::Sms => "SMS",
            ChannelType::Call => "CALL",
            ChannelType::Push => "PUSH",
            ChannelType::Mail => "MAIL",
        }
    }
}

impl fmt::Display for ChannelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resultado registrado para un destinatario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryStatus {
    Sent,
    Error,
}

impl DeliveryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "SENT",
            DeliveryStatus::Error => "ERROR",
        }
    }
}

/// Contenido del mensaje. Cada canal usa los campos que necesita:
/// SMS y voz usan `message`, push usa `subject` como título y `data`,
/// mail usa `subject` + `message` (HTML).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelPayload {
    pub message: Option<String>,
    pub subject: Option<String>,
    pub data: Option<serde_json::Map<String, serde_json::Value>>,
}
