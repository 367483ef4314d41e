use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::channel_model::{ChannelType, DeliveryStatus};

/// Registro de auditoría de un intento de entrega (inmutable).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendLogRecord {
    pub id: String,
    pub send_request_id: Option<String>,
    pub channel_type: String,
    pub channel_name: String,
    pub receiver: String,
    pub status: String, // "SENT" | "ERROR"
    pub error_message: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Datos para crear un log; el id y la fecha los pone el store.
#[derive(Debug, Clone)]
pub struct NewSendLog {
    pub send_request_id: Option<String>,
    pub channel_type: ChannelType,
    pub channel_name: String,
    pub receiver: String,
    pub status: DeliveryStatus,
    pub error_message: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Filtros de igualdad para GET /api/notifier/logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendLogFilter {
    pub send_request_id: Option<String>,
    pub channel_type: Option<String>,
    pub channel_name: Option<String>,
    pub receiver: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendPushLogRecord {
    pub id: String,
    pub send_log_id: String,
    pub message_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filtros de igualdad para GET /api/notifier/push-logs
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendPushLogFilter {
    pub id: Option<String>,
    pub send_log_id: Option<String>,
    pub message_id: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<T>,
}
