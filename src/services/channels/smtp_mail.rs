//! services/channels/smtp_mail.rs
//! Envío de correo por SMTP con lettre. Que el servidor acepte el mensaje
//! es la señal de éxito.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use serde_json::{json, Value};
use std::time::Duration;

use crate::{
    config::notifier_config::SmtpCredentials,
    models::channel_model::{ChannelPayload, ChannelType},
    services::channels::{
        require, DeliveryChannel, DeliveryFailure, DeliveryOutcome, FailureKind,
    },
};

const PROVIDER: &str = "SMTP";

#[derive(Clone)]
pub struct SmtpMailChannel {
    credentials: SmtpCredentials,
    timeout: Duration,
}

impl SmtpMailChannel {
    pub fn new(credentials: SmtpCredentials, timeout: Duration) -> Self {
        Self {
            credentials,
            timeout,
        }
    }

    fn build_transport(
        &self,
        host: &str,
        user: &str,
        password: &str,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, DeliveryFailure> {
        let builder = if self.credentials.tls {
            let tls_params = TlsParameters::new(host.to_string()).map_err(|e| {
                DeliveryFailure::configuration(format!("{PROVIDER}, parámetros TLS inválidos: {e}"))
            })?;
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| {
                    DeliveryFailure::configuration(format!("{PROVIDER}, host inválido: {e}"))
                })?
                .tls(Tls::Required(tls_params))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
        };

        Ok(builder
            .port(self.credentials.port)
            .credentials(Credentials::new(user.to_string(), password.to_string()))
            .timeout(Some(self.timeout))
            .build())
    }

    async fn deliver(&self, address: &str, payload: &ChannelPayload) -> Result<Value, DeliveryFailure> {
        let host = require(&self.credentials.host, PROVIDER, "notifier.providers.mail.smtp.host")?;
        let user = require(&self.credentials.user, PROVIDER, "notifier.providers.mail.smtp.user")?;
        let password = require(
            &self.credentials.password,
            PROVIDER,
            "notifier.providers.mail.smtp.password",
        )?;

        let from: Mailbox = self
            .credentials
            .from
            .as_deref()
            .unwrap_or(user)
            .parse()
            .map_err(|e| {
                DeliveryFailure::configuration(format!("{PROVIDER}, remitente inválido: {e}"))
            })?;
        let to: Mailbox = address.parse().map_err(|e| {
            DeliveryFailure::new(
                FailureKind::InvalidPayload,
                format!("{PROVIDER}, dirección inválida '{address}': {e}"),
            )
        })?;
        let body = payload.message.clone().ok_or_else(|| {
            DeliveryFailure::new(
                FailureKind::InvalidPayload,
                format!("{PROVIDER}, el payload no tiene 'message'"),
            )
        })?;

        // Cuerpo en HTML
        let html_part = SinglePart::builder()
            .header(ContentType::TEXT_HTML)
            .body(body);
        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(payload.subject.clone().unwrap_or_default())
            .singlepart(html_part)
            .map_err(|e| {
                DeliveryFailure::new(
                    FailureKind::InvalidPayload,
                    format!("{PROVIDER}, no se pudo construir el mensaje: {e}"),
                )
            })?;

        let mailer = self.build_transport(host, user, password)?;
        let response = match tokio::time::timeout(self.timeout, mailer.send(message)).await {
            Err(_) => {
                return Err(DeliveryFailure::new(
                    FailureKind::Transport,
                    format!("{PROVIDER}, timeout tras {:?}", self.timeout),
                ))
            }
            Ok(Err(e)) => {
                // 5xx => rechazo definitivo; el resto es problema de conexión
                let kind = if e.is_permanent() {
                    FailureKind::BackendRejected
                } else {
                    FailureKind::Transport
                };
                return Err(DeliveryFailure::new(kind, format!("{PROVIDER}: {e}")));
            }
            Ok(Ok(response)) => response,
        };

        Ok(json!({
            "code": response.code().to_string(),
            "message": response.message().collect::<Vec<_>>().join(" "),
        }))
    }
}

#[async_trait]
impl DeliveryChannel for SmtpMailChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Mail
    }

    fn name(&self) -> &str {
        "smtp"
    }

    async fn send(&self, recipient: &str, payload: &ChannelPayload) -> DeliveryOutcome {
        self.deliver(recipient, payload).await.into()
    }
}
