//! services/channels/smsru.rs
//! Proveedor SMS.RU (https://sms.ru): SMS y llamada con código.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    config::notifier_config::SmsRuCredentials,
    models::channel_model::{ChannelPayload, ChannelType},
    services::{
        channels::{
            fetch_json, field_as_string, require, DeliveryChannel, DeliveryFailure,
            DeliveryOutcome, FailureKind,
        },
        phone_normalizer,
    },
};

const PROVIDER: &str = "SMS.RU";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmsRuMode {
    Sms,
    Call,
}

#[derive(Clone)]
pub struct SmsRuChannel {
    mode: SmsRuMode,
    credentials: SmsRuCredentials,
    http_client: Client,
}

impl SmsRuChannel {
    pub fn new(mode: SmsRuMode, credentials: SmsRuCredentials, http_client: Client) -> Self {
        Self {
            mode,
            credentials,
            http_client,
        }
    }

    async fn deliver(&self, phone: &str, payload: &ChannelPayload) -> Result<Value, DeliveryFailure> {
        let section = match self.mode {
            SmsRuMode::Sms => "sms",
            SmsRuMode::Call => "call",
        };
        let api_id = require(
            &self.credentials.api_id,
            PROVIDER,
            &format!("notifier.providers.{section}.smsru.api_id"),
        )?;
        let base_url = self.credentials.base_url.trim_end_matches('/');

        match self.mode {
            SmsRuMode::Sms => {
                let message = payload
                    .message
                    .as_deref()
                    .filter(|m| !m.is_empty())
                    .ok_or_else(|| {
                        DeliveryFailure::new(
                            FailureKind::InvalidPayload,
                            format!("{PROVIDER}, el payload no tiene 'message'"),
                        )
                    })?;

                let mut params: Vec<(&str, &str)> = vec![
                    ("api_id", api_id),
                    ("to", phone),
                    ("msg", message),
                    ("json", "1"),
                ];
                if let Some(from) = &self.credentials.from {
                    params.push(("from", from.as_str()));
                }

                let request = self
                    .http_client
                    .get(format!("{base_url}/sms/send"))
                    .query(&params);
                let (_status, body) = fetch_json(PROVIDER, request).await?;
                classify_sms_response(phone, body)
            }
            SmsRuMode::Call => {
                let params = [("api_id", api_id), ("phone", phone), ("ip", "-1")];
                let request = self
                    .http_client
                    .get(format!("{base_url}/code/call"))
                    .query(&params);
                let (_status, body) = fetch_json(PROVIDER, request).await?;
                classify_call_response(body)
            }
        }
    }
}

fn rejected(body: &Value) -> DeliveryFailure {
    let text = body
        .get("status_text")
        .and_then(Value::as_str)
        .unwrap_or("sin status_text");
    DeliveryFailure::new(FailureKind::BackendRejected, format!("{PROVIDER}: {text}"))
        .with_metadata(serde_json::json!({
            "status_code": body.get("status_code").cloned().unwrap_or(Value::Null),
        }))
}

fn status_ok(body: &Value) -> bool {
    body.get("status").and_then(Value::as_str) == Some("OK")
}

/// La respuesta trae un estado global y otro por teléfono en `sms.<phone>`.
fn classify_sms_response(phone: &str, body: Value) -> Result<Value, DeliveryFailure> {
    if !status_ok(&body) {
        return Err(rejected(&body));
    }
    let Some(entry) = body.get("sms").and_then(|sms| sms.get(phone)) else {
        return Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{PROVIDER}, no se encontró 'sms.{phone}' en la respuesta: {body}"),
        ));
    };
    if !status_ok(entry) {
        return Err(rejected(entry));
    }
    if field_as_string(entry, "sms_id").is_none() {
        return Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{PROVIDER}, no se encontró 'sms_id' en la respuesta: {body}"),
        ));
    }
    Ok(body)
}

fn classify_call_response(body: Value) -> Result<Value, DeliveryFailure> {
    if !status_ok(&body) {
        return Err(rejected(&body));
    }
    if field_as_string(&body, "code").is_none() {
        return Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{PROVIDER}, no se encontró 'code' en la respuesta: {body}"),
        ));
    }
    Ok(body)
}

#[async_trait]
impl DeliveryChannel for SmsRuChannel {
    fn channel_type(&self) -> ChannelType {
        match self.mode {
            SmsRuMode::Sms => ChannelType::Sms,
            SmsRuMode::Call => ChannelType::Call,
        }
    }

    fn name(&self) -> &str {
        "smsru"
    }

    fn normalize_recipient(&self, raw: &str) -> String {
        phone_normalizer::normalize(raw)
    }

    async fn send(&self, recipient: &str, payload: &ChannelPayload) -> DeliveryOutcome {
        self.deliver(recipient, payload).await.into()
    }
}
