//! tests/registry_tests.rs

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, sync::Arc};

    use crate::{
        config::notifier_config::NotifierConfig,
        errors::NotifierError,
        models::channel_model::ChannelType,
        services::channel_registry::ChannelRegistry,
        tests::ScriptedChannel,
    };

    fn config_from(pairs: &[(&str, &str)]) -> NotifierConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        NotifierConfig::from_lookup(|key| env.get(key).cloned()).unwrap()
    }

    #[test]
    fn from_config_registers_only_present_sections() {
        let config = config_from(&[
            ("NOTIFIER_SMS_SMSC_LOGIN", "acme"),
            ("NOTIFIER_SMS_SMSC_PASSWORD", "secret"),
            ("NOTIFIER_CALL_SMSC_LOGIN", "acme"),
            ("NOTIFIER_PUSH_FIREBASE_PROJECT_ID", "acme-app"),
        ]);
        let registry = ChannelRegistry::from_config(&config).unwrap();

        assert_eq!(
            registry.registered(),
            vec!["CALL/smsc", "CALL/smsc_voice", "PUSH/firebase", "SMS/smsc"]
        );
    }

    #[test]
    fn resolve_uses_type_default_when_name_is_missing() {
        let config = config_from(&[
            ("NOTIFIER_SMS_SMSRU_API_ID", "api-123"),
            ("NOTIFIER_SMS_SMSC_LOGIN", "acme"),
            ("NOTIFIER_SMS_DEFAULT", "smsru"),
        ]);
        let registry = ChannelRegistry::from_config(&config).unwrap();

        let channel = registry.resolve(ChannelType::Sms, None).unwrap();
        assert_eq!(channel.name(), "smsru");

        let explicit = registry.resolve(ChannelType::Sms, Some("smsc")).unwrap();
        assert_eq!(explicit.name(), "smsc");
    }

    #[test]
    fn resolve_unknown_pair_is_an_error() {
        let registry = ChannelRegistry::from_config(&config_from(&[])).unwrap();
        assert!(registry.registered().is_empty());

        match registry.resolve(ChannelType::Mail, None) {
            Err(NotifierError::UnconfiguredChannel {
                channel_type,
                channel_name,
            }) => {
                assert_eq!(channel_type, ChannelType::Mail);
                assert_eq!(channel_name, "smtp");
            }
            Err(other) => panic!("error inesperado: {other}"),
            Ok(_) => panic!("no debería resolver un canal sin configurar"),
        }
    }

    #[test]
    fn same_name_under_another_type_does_not_resolve() {
        let mut registry = ChannelRegistry::new();
        registry.register(Arc::new(ScriptedChannel::new(ChannelType::Sms, "smsc")));

        assert!(registry.resolve(ChannelType::Sms, Some("smsc")).is_ok());
        assert!(matches!(
            registry.resolve(ChannelType::Call, Some("smsc")),
            Err(NotifierError::UnconfiguredChannel { .. })
        ));
    }

    #[test]
    fn register_replaces_existing_pair() {
        let mut registry = ChannelRegistry::new();
        registry.register(Arc::new(ScriptedChannel::new(ChannelType::Push, "firebase")));
        registry.register(Arc::new(ScriptedChannel::new(ChannelType::Push, "firebase")));
        assert_eq!(registry.registered(), vec!["PUSH/firebase"]);
    }
}
