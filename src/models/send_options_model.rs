//! models/send_options_model.rs
//! Entrada y salida del despachador y del endpoint de envío.

use serde::{Deserialize, Serialize};

use crate::models::channel_model::{ChannelPayload, ChannelType};

/// Un destinatario o una lista de destinatarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Recipients {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Recipients::One(r) => vec![r],
            Recipients::Many(list) => list,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Recipients::One(_) => 1,
            Recipients::Many(list) => list.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for Recipients {
    fn from(value: &str) -> Self {
        Recipients::One(value.to_string())
    }
}

impl From<Vec<&str>> for Recipients {
    fn from(value: Vec<&str>) -> Self {
        Recipients::Many(value.into_iter().map(String::from).collect())
    }
}

/// Opciones de un despacho.
#[derive(Debug, Clone)]
pub struct SendOptions {
    pub channel_type: ChannelType,
    /// None => nombre por defecto configurado para el tipo
    pub channel_name: Option<String>,
    pub recipient: Recipients,
    pub payload: ChannelPayload,
    pub send_request_id: Option<String>,
}

/// Resultado agregado: un log por destinatario (en orden de entrada)
/// y los payloads de los envíos exitosos.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DispatchResult {
    pub log_ids: Vec<String>,
    pub provider_payloads: Vec<serde_json::Value>,
}

/// Body de POST /api/notifier/send
#[derive(Debug, Clone, Deserialize)]
pub struct NotifyRequest {
    pub channel_type: ChannelType,
    pub channel_name: Option<String>,
    pub recipient: Recipients,
    #[serde(default)]
    pub payload: ChannelPayload,
    #[serde(default)]
    pub async_send: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotifyResponse {
    pub success: bool,
    pub send_request_id: String,
    pub status: String,
    pub log_ids: Vec<String>,
    pub provider_payloads: Vec<serde_json::Value>,
}
