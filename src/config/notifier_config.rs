//! config/notifier_config.rs
//! Credenciales y endpoints de cada proveedor, por tipo y nombre de canal.
//!
//! Se construye una sola vez al arrancar (desde el entorno / .env) y se
//! entrega al `ChannelRegistry`. Una sección existe si al menos una de sus
//! variables está definida; las claves obligatorias se validan al enviar.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::models::channel_model::ChannelType;

pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const SMSC_DEFAULT_URL: &str = "https://smsc.ru";
pub const SMSRU_DEFAULT_URL: &str = "https://sms.ru";
pub const FIREBASE_DEFAULT_URL: &str = "https://fcm.googleapis.com";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub http_timeout_secs: u64,
    pub defaults: DefaultChannels,
    pub sms: SmsProvidersConfig,
    pub call: CallProvidersConfig,
    pub push: PushProvidersConfig,
    pub mail: MailProvidersConfig,
}

/// Nombre de canal usado cuando la solicitud no indica uno.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultChannels {
    pub sms: String,
    pub call: String,
    pub push: String,
    pub mail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmsProvidersConfig {
    pub smsc: Option<SmscCredentials>,
    pub smsru: Option<SmsRuCredentials>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallProvidersConfig {
    pub smsc: Option<SmscCredentials>,
    pub smsru: Option<SmsRuCredentials>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushProvidersConfig {
    pub firebase: Option<FirebaseCredentials>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MailProvidersConfig {
    pub smtp: Option<SmtpCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmscCredentials {
    pub login: Option<String>,
    pub password: Option<String>,
    pub sender: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmsRuCredentials {
    pub api_id: Option<String>,
    pub from: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseCredentials {
    pub project_id: Option<String>,
    pub access_token: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpCredentials {
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Remitente; si falta se usa `user`
    pub from: Option<String>,
    pub tls: bool,
}

impl Default for DefaultChannels {
    fn default() -> Self {
        DefaultChannels {
            sms: "smsc".to_string(),
            call: "smsc".to_string(),
            push: "firebase".to_string(),
            mail: "smtp".to_string(),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig {
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            defaults: DefaultChannels::default(),
            sms: SmsProvidersConfig::default(),
            call: CallProvidersConfig::default(),
            push: PushProvidersConfig::default(),
            mail: MailProvidersConfig::default(),
        }
    }
}

impl NotifierConfig {
    /// Lee la configuración de las variables de entorno (ya cargadas con dotenv).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Igual que `from_env` pero con una fuente de claves arbitraria.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_timeout_secs = match get("NOTIFIER_HTTP_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .context("NOTIFIER_HTTP_TIMEOUT_SECS debe ser un entero")?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let base = DefaultChannels::default();
        let defaults = DefaultChannels {
            sms: get("NOTIFIER_SMS_DEFAULT").unwrap_or(base.sms),
            call: get("NOTIFIER_CALL_DEFAULT").unwrap_or(base.call),
            push: get("NOTIFIER_PUSH_DEFAULT").unwrap_or(base.push),
            mail: get("NOTIFIER_MAIL_DEFAULT").unwrap_or(base.mail),
        };

        let smsc = |prefix: &str| -> Option<SmscCredentials> {
            let login = get(&format!("{prefix}_LOGIN"));
            let password = get(&format!("{prefix}_PASSWORD"));
            let sender = get(&format!("{prefix}_SENDER"));
            let url = get(&format!("{prefix}_URL"));
            if login.is_none() && password.is_none() && sender.is_none() && url.is_none() {
                return None;
            }
            Some(SmscCredentials {
                login,
                password,
                sender,
                base_url: url.unwrap_or_else(|| SMSC_DEFAULT_URL.to_string()),
            })
        };

        let smsru = |prefix: &str| -> Option<SmsRuCredentials> {
            let api_id = get(&format!("{prefix}_API_ID"));
            let from = get(&format!("{prefix}_FROM"));
            let url = get(&format!("{prefix}_URL"));
            if api_id.is_none() && from.is_none() && url.is_none() {
                return None;
            }
            Some(SmsRuCredentials {
                api_id,
                from,
                base_url: url.unwrap_or_else(|| SMSRU_DEFAULT_URL.to_string()),
            })
        };

        let firebase = {
            let project_id = get("NOTIFIER_PUSH_FIREBASE_PROJECT_ID");
            let access_token = get("NOTIFIER_PUSH_FIREBASE_ACCESS_TOKEN");
            let url = get("NOTIFIER_PUSH_FIREBASE_URL");
            if project_id.is_none() && access_token.is_none() && url.is_none() {
                None
            } else {
                Some(FirebaseCredentials {
                    project_id,
                    access_token,
                    base_url: url.unwrap_or_else(|| FIREBASE_DEFAULT_URL.to_string()),
                })
            }
        };

        let smtp = {
            let host = get("NOTIFIER_MAIL_SMTP_HOST");
            let port = get("NOTIFIER_MAIL_SMTP_PORT");
            let user = get("NOTIFIER_MAIL_SMTP_USER");
            let password = get("NOTIFIER_MAIL_SMTP_PASSWORD");
            let from = get("NOTIFIER_MAIL_SMTP_FROM");
            let tls = get("NOTIFIER_MAIL_SMTP_TLS");
            if [&host, &port, &user, &password, &from, &tls]
                .iter()
                .all(|v| v.is_none())
            {
                None
            } else {
                Some(SmtpCredentials {
                    host,
                    port: match port {
                        Some(p) => p.parse().context("NOTIFIER_MAIL_SMTP_PORT inválido")?,
                        None => 587,
                    },
                    user,
                    password,
                    from,
                    tls: tls
                        .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no"))
                        .unwrap_or(true),
                })
            }
        };

        Ok(NotifierConfig {
            http_timeout_secs,
            defaults,
            sms: SmsProvidersConfig {
                smsc: smsc("NOTIFIER_SMS_SMSC"),
                smsru: smsru("NOTIFIER_SMS_SMSRU"),
            },
            call: CallProvidersConfig {
                smsc: smsc("NOTIFIER_CALL_SMSC"),
                smsru: smsru("NOTIFIER_CALL_SMSRU"),
            },
            push: PushProvidersConfig { firebase },
            mail: MailProvidersConfig { smtp },
        })
    }

    pub fn default_channel_name(&self, channel_type: ChannelType) -> &str {
        match channel_type {
            ChannelType::Sms => &self.defaults.sms,
            ChannelType::Call => &self.defaults.call,
            ChannelType::Push => &self.defaults.push,
            ChannelType::Mail => &self.defaults.mail,
        }
    }
}
