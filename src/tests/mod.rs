//! tests/mod.rs
//! Pruebas del despachador, canales y almacenamiento.
//! Utilidades compartidas: base SQLite en memoria y canales simulados.

mod registry_tests;
mod send_log_tests;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::{collections::HashMap, sync::Mutex};

use crate::{
    models::channel_model::{ChannelPayload, ChannelType},
    services::{
        channels::{DeliveryChannel, DeliveryFailure, DeliveryOutcome, FailureKind},
        phone_normalizer,
        send_request_service::SendRequestService,
    },
};

impl ChannelPayload {
    /// Payload con solo `message`.
    pub fn text(message: &str) -> Self {
        Self {
            message: Some(message.to_string()),
            ..Default::default()
        }
    }
}

/// SQLite en memoria con las migraciones aplicadas.
/// Una sola conexión: cada conexión a `:memory:` es una base distinta.
pub async fn test_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo abrir SQLite en memoria");
    SendRequestService::new(pool.clone())
        .run_migrations()
        .await
        .expect("Fallo en migraciones");
    pool
}

/// Puerto local sin nadie escuchando (para provocar errores de red).
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local_addr").port();
    drop(listener);
    port
}

/// Canal telefónico simulado: responde según el destinatario normalizado
/// y recuerda a quién se envió.
pub struct ScriptedChannel {
    channel_type: ChannelType,
    name: String,
    responses: HashMap<String, DeliveryOutcome>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedChannel {
    pub fn new(channel_type: ChannelType, name: &str) -> Self {
        Self {
            channel_type,
            name: name.to_string(),
            responses: HashMap::new(),
            calls: Mutex::new(vec![]),
        }
    }

    pub fn accept(mut self, receiver: &str, payload: Value) -> Self {
        self.responses
            .insert(receiver.to_string(), DeliveryOutcome::Success { payload });
        self
    }

    pub fn reject(mut self, receiver: &str, kind: FailureKind, message: &str) -> Self {
        self.responses.insert(
            receiver.to_string(),
            DeliveryOutcome::Failure(DeliveryFailure::new(kind, message)),
        );
        self
    }
}

#[async_trait]
impl DeliveryChannel for ScriptedChannel {
    fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn normalize_recipient(&self, raw: &str) -> String {
        phone_normalizer::normalize(raw)
    }

    async fn send(&self, recipient: &str, _payload: &ChannelPayload) -> DeliveryOutcome {
        self.calls.lock().unwrap().push(recipient.to_string());
        self.responses.get(recipient).cloned().unwrap_or_else(|| {
            DeliveryOutcome::Failure(DeliveryFailure::new(
                FailureKind::BackendRejected,
                format!("sin respuesta para {recipient}"),
            ))
        })
    }
}
