//! services/channels/smsc.rs
//! Proveedor SMSC (https://smsc.ru): SMS, llamada con código y mensaje de voz.
//!
//! Todas las variantes usan `POST /sys/send.php` con parámetros en la query.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::notifier_config::SmscCredentials,
    models::channel_model::{ChannelPayload, ChannelType},
    services::{
        channels::{
            error_field, fetch_json, field_as_string, require, DeliveryChannel, DeliveryFailure,
            DeliveryOutcome, FailureKind,
        },
        phone_normalizer,
    },
};

const PROVIDER: &str = "SMSC.RU";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmscMode {
    Sms,
    /// Llamada cuyo número entrante contiene el código (`mes=code`)
    FlashCall,
    /// Llamada que lee en voz alta el texto del mensaje
    VoiceMessage,
}

#[derive(Clone)]
pub struct SmscChannel {
    mode: SmscMode,
    credentials: SmscCredentials,
    http_client: Client,
}

impl SmscChannel {
    pub fn new(mode: SmscMode, credentials: SmscCredentials, http_client: Client) -> Self {
        Self {
            mode,
            credentials,
            http_client,
        }
    }

    fn config_key(&self, key: &str) -> String {
        let section = match self.mode {
            SmscMode::Sms => "sms",
            SmscMode::FlashCall | SmscMode::VoiceMessage => "call",
        };
        format!("notifier.providers.{section}.smsc.{key}")
    }

    async fn deliver(&self, phone: &str, payload: &ChannelPayload) -> Result<Value, DeliveryFailure> {
        let login = require(&self.credentials.login, PROVIDER, &self.config_key("login"))?;
        let password = require(
            &self.credentials.password,
            PROVIDER,
            &self.config_key("password"),
        )?;

        let message = match self.mode {
            SmscMode::FlashCall => "code".to_string(),
            SmscMode::Sms | SmscMode::VoiceMessage => payload
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .ok_or_else(|| {
                    DeliveryFailure::new(
                        FailureKind::InvalidPayload,
                        format!("{PROVIDER}, el payload no tiene 'message'"),
                    )
                })?,
        };

        let mut params: Vec<(&str, String)> = vec![
            ("login", login.to_string()),
            ("psw", password.to_string()),
            ("phones", phone.to_string()),
            ("mes", message),
            ("fmt", "3".to_string()),
            ("charset", "utf-8".to_string()),
        ];
        if self.mode != SmscMode::Sms {
            params.push(("call", "1".to_string()));
        }
        if let Some(sender) = &self.credentials.sender {
            params.push(("sender", sender.clone()));
        }

        let url = format!("{}/sys/send.php", self.credentials.base_url.trim_end_matches('/'));
        let (_status, body) =
            fetch_json(PROVIDER, self.http_client.post(&url).query(&params)).await?;

        classify_response(body)
    }
}

/// `error` presente => rechazo; sin indicador de éxito => respuesta inválida.
fn classify_response(body: Value) -> Result<Value, DeliveryFailure> {
    if let Some(error) = error_field(&body, "error") {
        let metadata = json!({
            "error": error,
            "error_code": body.get("error_code").cloned().unwrap_or(Value::Null),
        });
        return Err(
            DeliveryFailure::new(FailureKind::BackendRejected, format!("{PROVIDER}: {error}"))
                .with_metadata(metadata),
        );
    }

    // En todos los modos el indicador de éxito es `code`
    if field_as_string(&body, "code").is_none() {
        return Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{PROVIDER}, no se encontró 'code' en la respuesta: {body}"),
        ));
    }

    Ok(body)
}

#[async_trait]
impl DeliveryChannel for SmscChannel {
    fn channel_type(&self) -> ChannelType {
        match self.mode {
            SmscMode::Sms => ChannelType::Sms,
            SmscMode::FlashCall | SmscMode::VoiceMessage => ChannelType::Call,
        }
    }

    fn name(&self) -> &str {
        match self.mode {
            SmscMode::VoiceMessage => "smsc_voice",
            SmscMode::Sms | SmscMode::FlashCall => "smsc",
        }
    }

    fn normalize_recipient(&self, raw: &str) -> String {
        phone_normalizer::normalize(raw)
    }

    async fn send(&self, recipient: &str, payload: &ChannelPayload) -> DeliveryOutcome {
        self.deliver(recipient, payload).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_wins_over_code() {
        let res = classify_response(json!({
            "error": "invalid number", "error_code": 7, "code": "1234"
        }));
        let failure = res.unwrap_err();
        assert_eq!(failure.kind, FailureKind::BackendRejected);
        assert!(failure.message.contains("invalid number"));
        assert_eq!(failure.metadata.unwrap()["error_code"], 7);
    }

    #[test]
    fn code_is_required_even_with_id() {
        let failure = classify_response(json!({"id": 10, "cnt": 1})).unwrap_err();
        assert_eq!(failure.kind, FailureKind::MalformedResponse);
        assert!(failure.message.contains("'code'"));
    }

    #[test]
    fn code_alone_is_success() {
        assert!(classify_response(json!({"code": 55})).is_ok());
        assert!(classify_response(json!({"id": 10, "code": "1234"})).is_ok());
    }

    #[test]
    fn zero_error_is_not_a_rejection() {
        assert!(classify_response(json!({"error": 0, "code": 55})).is_ok());
    }
}
