//! services/channels/mod.rs
//! Canales de entrega: cada implementación sabe enviar un mensaje a un
//! destinatario por un proveedor concreto y clasificar su respuesta.
//!
//! Un canal nunca devuelve `Err`: todos los fallos (configuración,
//! rechazo del proveedor, respuesta inválida, red) son valores
//! `DeliveryOutcome::Failure` para que el despachador los registre.

use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::models::channel_model::{ChannelPayload, ChannelType};

pub mod firebase_push;
pub mod smsc;
pub mod smsru;
pub mod smtp_mail;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Falta una credencial obligatoria; no se hizo llamada de red.
    Configuration,
    /// El payload no trae lo que el canal necesita.
    InvalidPayload,
    /// El proveedor respondió con un error explícito.
    BackendRejected,
    /// Falta el indicador de éxito esperado en la respuesta.
    MalformedResponse,
    /// Error de red / timeout.
    Transport,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Configuration => "configuration",
            FailureKind::InvalidPayload => "invalid_payload",
            FailureKind::BackendRejected => "backend_rejected",
            FailureKind::MalformedResponse => "malformed_response",
            FailureKind::Transport => "transport",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Datos del proveedor asociados al fallo (p.ej. errorCode de push)
    pub metadata: Option<Value>,
}

impl DeliveryFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            metadata: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Configuration, message)
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

impl fmt::Display for DeliveryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

#[derive(Debug, Clone)]
pub enum DeliveryOutcome {
    Success { payload: Value },
    Failure(DeliveryFailure),
}

impl From<Result<Value, DeliveryFailure>> for DeliveryOutcome {
    fn from(res: Result<Value, DeliveryFailure>) -> Self {
        match res {
            Ok(payload) => DeliveryOutcome::Success { payload },
            Err(failure) => DeliveryOutcome::Failure(failure),
        }
    }
}

#[async_trait]
pub trait DeliveryChannel: Send + Sync {
    fn channel_type(&self) -> ChannelType;

    /// Nombre del proveedor ("smsc", "smsru", ...)
    fn name(&self) -> &str;

    /// Forma canónica del destinatario para este canal.
    fn normalize_recipient(&self, raw: &str) -> String {
        raw.trim().to_string()
    }

    async fn send(&self, recipient: &str, payload: &ChannelPayload) -> DeliveryOutcome;
}

/// Devuelve la credencial o un fallo de configuración con la clave que falta.
pub(crate) fn require<'a>(
    value: &'a Option<String>,
    provider: &str,
    key: &str,
) -> Result<&'a str, DeliveryFailure> {
    value.as_deref().ok_or_else(|| {
        DeliveryFailure::configuration(format!(
            "Configuración incorrecta de {provider}, falta el parámetro \"{key}\""
        ))
    })
}

/// Ejecuta la petición y devuelve el body JSON.
///
/// Errores de red => Transport; body que no es JSON => MalformedResponse
/// (o BackendRejected si además el status HTTP no es 2xx).
pub(crate) async fn fetch_json(
    provider: &str,
    request: RequestBuilder,
) -> Result<(reqwest::StatusCode, Value), DeliveryFailure> {
    let resp = request.send().await.map_err(|e| {
        DeliveryFailure::new(
            FailureKind::Transport,
            format!("{provider}, error de red: {e}"),
        )
    })?;

    let status = resp.status();
    let body_txt = resp.text().await.map_err(|e| {
        DeliveryFailure::new(
            FailureKind::Transport,
            format!("{provider}, error leyendo respuesta: {e}"),
        )
    })?;

    match serde_json::from_str::<Value>(&body_txt) {
        Ok(json) => Ok((status, json)),
        Err(_) if !status.is_success() => Err(DeliveryFailure::new(
            FailureKind::BackendRejected,
            format!("{provider}, HTTP {status}: {body_txt}"),
        )),
        Err(_) => Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{provider}, la respuesta no es JSON válido: {body_txt}"),
        )),
    }
}

/// Campo como texto, aceptando strings o números.
pub(crate) fn field_as_string(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Un campo de error "presente": no nulo, no vacío, no cero/false.
pub(crate) fn error_field(json: &Value, key: &str) -> Option<String> {
    match json.get(key)? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_ignores_empty_values() {
        for body in [
            json!({}),
            json!({"error": null}),
            json!({"error": false}),
            json!({"error": 0}),
            json!({"error": ""}),
        ] {
            assert_eq!(error_field(&body, "error"), None, "{body}");
        }
    }

    #[test]
    fn error_field_reports_present_values() {
        assert_eq!(error_field(&json!({"error": "invalid number"}), "error").as_deref(), Some("invalid number"));
        assert_eq!(error_field(&json!({"error": 7}), "error").as_deref(), Some("7"));
        assert_eq!(error_field(&json!({"error": true}), "error").as_deref(), Some("true"));
    }
}
