//! services/channel_registry.rs
//! Mapa (tipo, nombre) -> canal de entrega, construido al arrancar a partir
//! de `NotifierConfig`. No hay fallback entre proveedores.

use anyhow::{Context, Result};
use reqwest::Client;
use std::{collections::HashMap, sync::Arc, time::Duration};

use crate::{
    config::notifier_config::NotifierConfig,
    errors::NotifierError,
    models::channel_model::ChannelType,
    services::channels::{
        firebase_push::FirebasePushChannel,
        smsc::{SmscChannel, SmscMode},
        smsru::{SmsRuChannel, SmsRuMode},
        smtp_mail::SmtpMailChannel,
        DeliveryChannel,
    },
};

#[derive(Clone, Default)]
pub struct ChannelRegistry {
    channels: HashMap<(ChannelType, String), Arc<dyn DeliveryChannel>>,
    defaults: HashMap<ChannelType, String>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un canal por cada sección de credenciales presente.
    pub fn from_config(config: &NotifierConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.http_timeout_secs);
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .context("No se pudo construir el cliente HTTP")?;

        let mut registry = Self::new();
        for channel_type in [
            ChannelType::Sms,
            ChannelType::Call,
            ChannelType::Push,
            ChannelType::Mail,
        ] {
            registry.set_default(channel_type, config.default_channel_name(channel_type));
        }

        if let Some(creds) = &config.sms.smsc {
            registry.register(Arc::new(SmscChannel::new(
                SmscMode::Sms,
                creds.clone(),
                http_client.clone(),
            )));
        }
        if let Some(creds) = &config.sms.smsru {
            registry.register(Arc::new(SmsRuChannel::new(
                SmsRuMode::Sms,
                creds.clone(),
                http_client.clone(),
            )));
        }
        if let Some(creds) = &config.call.smsc {
            registry.register(Arc::new(SmscChannel::new(
                SmscMode::FlashCall,
                creds.clone(),
                http_client.clone(),
            )));
            registry.register(Arc::new(SmscChannel::new(
                SmscMode::VoiceMessage,
                creds.clone(),
                http_client.clone(),
            )));
        }
        if let Some(creds) = &config.call.smsru {
            registry.register(Arc::new(SmsRuChannel::new(
                SmsRuMode::Call,
                creds.clone(),
                http_client.clone(),
            )));
        }
        if let Some(creds) = &config.push.firebase {
            registry.register(Arc::new(FirebasePushChannel::new(
                creds.clone(),
                http_client.clone(),
            )));
        }
        if let Some(creds) = &config.mail.smtp {
            registry.register(Arc::new(SmtpMailChannel::new(creds.clone(), timeout)));
        }

        log::info!(
            "(from_config) Canales registrados: {:?}",
            registry.registered()
        );
        Ok(registry)
    }

    /// Registra (o reemplaza) el canal bajo su propio (tipo, nombre).
    pub fn register(&mut self, channel: Arc<dyn DeliveryChannel>) {
        let key = (channel.channel_type(), channel.name().to_string());
        self.channels.insert(key, channel);
    }

    pub fn set_default(&mut self, channel_type: ChannelType, name: &str) {
        self.defaults.insert(channel_type, name.to_string());
    }

    /// Canal para (tipo, nombre). Sin nombre se usa el nombre por defecto del tipo.
    pub fn resolve(
        &self,
        channel_type: ChannelType,
        channel_name: Option<&str>,
    ) -> Result<Arc<dyn DeliveryChannel>, NotifierError> {
        let name = channel_name
            .or_else(|| self.defaults.get(&channel_type).map(String::as_str))
            .unwrap_or_default();

        self.channels
            .get(&(channel_type, name.to_string()))
            .cloned()
            .ok_or_else(|| NotifierError::UnconfiguredChannel {
                channel_type,
                channel_name: name.to_string(),
            })
    }

    /// Pares registrados, ordenados (para logs y diagnósticos).
    pub fn registered(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .channels
            .keys()
            .map(|(t, n)| format!("{t}/{n}"))
            .collect();
        keys.sort();
        keys
    }
}
