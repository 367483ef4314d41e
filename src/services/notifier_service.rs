//! services/notifier_service.rs
//! Despachador: resuelve el canal, recorre los destinatarios en orden y
//! escribe exactamente un log por destinatario, haya éxito o error.

use serde_json::{json, Value};
use std::sync::Arc;

use crate::{
    errors::NotifierError,
    models::{
        channel_model::DeliveryStatus,
        send_log_model::NewSendLog,
        send_options_model::{DispatchResult, NotifyRequest, NotifyResponse, SendOptions},
        send_request_model::{REQUEST_ERROR, REQUEST_PARTIAL, REQUEST_SENT},
    },
    services::{
        channel_registry::ChannelRegistry,
        channels::{DeliveryFailure, DeliveryOutcome},
        send_log_service::SendLogStore,
        send_request_service::SendRequestService,
    },
};

#[derive(Clone)]
pub struct NotifierService {
    registry: Arc<ChannelRegistry>,
    log_store: Arc<dyn SendLogStore>,
    request_service: SendRequestService,
}

impl NotifierService {
    pub fn new(
        registry: Arc<ChannelRegistry>,
        log_store: Arc<dyn SendLogStore>,
        request_service: SendRequestService,
    ) -> Self {
        Self {
            registry,
            log_store,
            request_service,
        }
    }

    /// Envía a todos los destinatarios, uno detrás de otro.
    ///
    /// Solo falla si el canal no está configurado (antes de crear logs) o
    /// si no se puede escribir un log. Los fallos de entrega quedan en los
    /// logs con estado ERROR; `log_ids` tiene un id por destinatario en el
    /// orden de entrada y `provider_payloads` solo los envíos exitosos.
    pub async fn send(&self, options: SendOptions) -> Result<DispatchResult, NotifierError> {
        let channel = self
            .registry
            .resolve(options.channel_type, options.channel_name.as_deref())?;
        let channel_name = channel.name().to_string();
        let recipients = options.recipient.into_vec();

        log::info!(
            "(send) Despachando {}/{} a {} destinatario(s), send_request_id={:?}",
            options.channel_type,
            channel_name,
            recipients.len(),
            options.send_request_id
        );

        let mut result = DispatchResult::default();
        for raw in &recipients {
            let receiver = channel.normalize_recipient(raw);

            let new_log = match channel.send(&receiver, &options.payload).await {
                DeliveryOutcome::Success { payload } => {
                    log::info!(
                        "(send) {}/{} -> '{}' enviado",
                        options.channel_type,
                        channel_name,
                        receiver
                    );
                    result.provider_payloads.push(payload.clone());
                    NewSendLog {
                        send_request_id: options.send_request_id.clone(),
                        channel_type: options.channel_type,
                        channel_name: channel_name.clone(),
                        receiver,
                        status: DeliveryStatus::Sent,
                        error_message: None,
                        metadata: Some(payload),
                    }
                }
                DeliveryOutcome::Failure(failure) => {
                    log::error!(
                        "(send) {}/{} -> '{}' falló: {}",
                        options.channel_type,
                        channel_name,
                        receiver,
                        failure
                    );
                    let metadata = failure_metadata(&failure);
                    NewSendLog {
                        send_request_id: options.send_request_id.clone(),
                        channel_type: options.channel_type,
                        channel_name: channel_name.clone(),
                        receiver,
                        status: DeliveryStatus::Error,
                        error_message: Some(failure.message),
                        metadata: Some(metadata),
                    }
                }
            };

            let entry = self.log_store.create(new_log).await.map_err(|e| {
                log::error!("(send) No se pudo guardar el log de envío: {:?}", e);
                NotifierError::Storage(e)
            })?;
            result.log_ids.push(entry.id);
        }

        log::info!(
            "(send) Finalizado {}/{}: {} enviados, {} con error",
            options.channel_type,
            channel_name,
            result.provider_payloads.len(),
            result.log_ids.len() - result.provider_payloads.len()
        );
        Ok(result)
    }

    /// Registra la solicitud, despacha y actualiza su estado agregado.
    pub async fn notify(&self, req: NotifyRequest) -> Result<NotifyResponse, NotifierError> {
        let record = self
            .request_service
            .create_request(req.channel_type, &req.payload)
            .await?;
        self.dispatch_request(record.id, req).await
    }

    /// Despacha una solicitud ya registrada (usado también por el envío asíncrono).
    pub async fn dispatch_request(
        &self,
        send_request_id: String,
        req: NotifyRequest,
    ) -> Result<NotifyResponse, NotifierError> {
        let options = SendOptions {
            channel_type: req.channel_type,
            channel_name: req.channel_name,
            recipient: req.recipient,
            payload: req.payload,
            send_request_id: Some(send_request_id.clone()),
        };

        match self.send(options).await {
            Ok(result) => {
                let status = rollup_status(&result);
                self.request_service
                    .update_status(&send_request_id, status)
                    .await?;
                log::info!(
                    "(dispatch_request) send_request_id={} -> {}",
                    send_request_id,
                    status
                );
                Ok(NotifyResponse {
                    success: true,
                    send_request_id,
                    status: status.to_string(),
                    log_ids: result.log_ids,
                    provider_payloads: result.provider_payloads,
                })
            }
            Err(e) => {
                if let Err(update_err) = self
                    .request_service
                    .update_status(&send_request_id, REQUEST_ERROR)
                    .await
                {
                    log::error!(
                        "(dispatch_request) No se pudo marcar send_request_id={} como error: {:?}",
                        send_request_id,
                        update_err
                    );
                }
                Err(e)
            }
        }
    }
}

/// Todos enviados => sent; ninguno => error; si no, partial.
pub fn rollup_status(result: &DispatchResult) -> &'static str {
    let sent = result.provider_payloads.len();
    if sent == result.log_ids.len() {
        REQUEST_SENT
    } else if sent == 0 {
        REQUEST_ERROR
    } else {
        REQUEST_PARTIAL
    }
}

/// Metadata del fallo + su tipo, para auditoría y reintentos manuales.
fn failure_metadata(failure: &DeliveryFailure) -> Value {
    let mut metadata = match &failure.metadata {
        Some(Value::Object(map)) => Value::Object(map.clone()),
        Some(other) => json!({ "details": other }),
        None => json!({}),
    };
    metadata["failureKind"] = json!(failure.kind.to_string());
    metadata
}
