//! services/channels/firebase_push.rs
//! Push vía Firebase Cloud Messaging (API HTTP v1). El destinatario es el
//! token del dispositivo.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::{
    config::notifier_config::FirebaseCredentials,
    models::channel_model::{ChannelPayload, ChannelType},
    services::channels::{
        fetch_json, require, DeliveryChannel, DeliveryFailure, DeliveryOutcome, FailureKind,
    },
};

const PROVIDER: &str = "Firebase";

#[derive(Clone)]
pub struct FirebasePushChannel {
    credentials: FirebaseCredentials,
    http_client: Client,
}

impl FirebasePushChannel {
    pub fn new(credentials: FirebaseCredentials, http_client: Client) -> Self {
        Self {
            credentials,
            http_client,
        }
    }

    async fn deliver(&self, token: &str, payload: &ChannelPayload) -> Result<Value, DeliveryFailure> {
        let project_id = require(
            &self.credentials.project_id,
            PROVIDER,
            "notifier.providers.push.firebase.project_id",
        )?;
        let access_token = require(
            &self.credentials.access_token,
            PROVIDER,
            "notifier.providers.push.firebase.access_token",
        )?;
        if token.is_empty() {
            return Err(DeliveryFailure::new(
                FailureKind::InvalidPayload,
                format!("{PROVIDER}, token de dispositivo vacío"),
            ));
        }

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.credentials.base_url.trim_end_matches('/'),
            project_id
        );
        let request = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&build_message(token, payload));

        let (status, body) = fetch_json(PROVIDER, request).await?;
        classify_response(status, body)
    }
}

fn build_message(token: &str, payload: &ChannelPayload) -> Value {
    let mut message = json!({
        "token": token,
        "notification": {
            "title": payload.subject.clone().unwrap_or_default(),
            "body": payload.message.clone().unwrap_or_default(),
        },
    });
    // FCM solo acepta valores string dentro de `data`
    if let Some(data) = &payload.data {
        let data: serde_json::Map<String, Value> = data
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), Value::String(v))
            })
            .collect();
        message["data"] = Value::Object(data);
    }
    json!({ "message": message })
}

/// Éxito: `{ name: "projects/<p>/messages/<id>" }` => `{ messageId }`.
/// Error: `{ error: { code, status, message } }` => `{ errorCode, errorMessage }`.
fn classify_response(status: reqwest::StatusCode, body: Value) -> Result<Value, DeliveryFailure> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let error_code = error
            .get("details")
            .and_then(Value::as_array)
            .and_then(|details| details.iter().find_map(|d| d.get("errorCode")))
            .or_else(|| error.get("status"))
            .or_else(|| error.get("code"))
            .map(|c| match c {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .unwrap_or_else(|| status.as_u16().to_string());
        let error_message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("sin mensaje")
            .to_string();

        return Err(DeliveryFailure::new(
            FailureKind::BackendRejected,
            format!("{PROVIDER}: {error_code} {error_message}"),
        )
        .with_metadata(json!({
            "errorCode": error_code,
            "errorMessage": error_message,
        })));
    }

    if !status.is_success() {
        return Err(DeliveryFailure::new(
            FailureKind::BackendRejected,
            format!("{PROVIDER}, HTTP {status}: {body}"),
        )
        .with_metadata(json!({
            "errorCode": status.as_u16().to_string(),
            "errorMessage": body.to_string(),
        })));
    }

    let Some(name) = body.get("name").and_then(Value::as_str) else {
        return Err(DeliveryFailure::new(
            FailureKind::MalformedResponse,
            format!("{PROVIDER}, no se encontró 'name' en la respuesta: {body}"),
        ));
    };
    let message_id = name.rsplit('/').next().unwrap_or(name);

    Ok(json!({ "messageId": message_id, "name": name }))
}

#[async_trait]
impl DeliveryChannel for FirebasePushChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Push
    }

    fn name(&self) -> &str {
        "firebase"
    }

    async fn send(&self, recipient: &str, payload: &ChannelPayload) -> DeliveryOutcome {
        self.deliver(recipient, payload).await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn data_values_are_stringified() {
        let mut data = serde_json::Map::new();
        data.insert("order".to_string(), json!(42));
        data.insert("kind".to_string(), json!("paid"));
        let payload = ChannelPayload {
            message: Some("Pedido pagado".to_string()),
            subject: Some("Tienda".to_string()),
            data: Some(data),
        };
        let msg = build_message("tok-1", &payload);
        assert_eq!(msg["message"]["token"], "tok-1");
        assert_eq!(msg["message"]["notification"]["title"], "Tienda");
        assert_eq!(msg["message"]["data"]["order"], "42");
        assert_eq!(msg["message"]["data"]["kind"], "paid");
    }

    #[test]
    fn error_details_code_is_preferred() {
        let body = json!({"error": {
            "code": 404,
            "status": "NOT_FOUND",
            "message": "Requested entity was not found.",
            "details": [{"@type": "type.googleapis.com/google.firebase.fcm.v1.FcmError", "errorCode": "UNREGISTERED"}]
        }});
        let failure = classify_response(StatusCode::NOT_FOUND, body).unwrap_err();
        let meta = failure.metadata.unwrap();
        assert_eq!(meta["errorCode"], "UNREGISTERED");
        assert_eq!(meta["errorMessage"], "Requested entity was not found.");
    }

    #[test]
    fn message_id_is_extracted_from_name() {
        let payload = classify_response(
            StatusCode::OK,
            json!({"name": "projects/acme/messages/0:1500415314455276%31bd1c96"}),
        )
        .unwrap();
        assert_eq!(payload["messageId"], "0:1500415314455276%31bd1c96");
    }
}
