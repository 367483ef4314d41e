use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Estados agregados de una solicitud de envío.
pub const REQUEST_PENDING: &str = "pending";
pub const REQUEST_SENT: &str = "sent";
pub const REQUEST_PARTIAL: &str = "partial";
pub const REQUEST_ERROR: &str = "error";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequestRecord {
    pub id: String,
    pub channel_type: String, // "SMS", "CALL", ...
    pub payload: Option<serde_json::Value>,
    pub status: String, // "pending", "sent", "partial", "error"
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
