use super::settings::{ConnectionSettings, GatewayConfig};
use crate::types::{DebugMode, Environment, TransactionType};

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            title: "Credit Card".into(),
            description: "Pay securely using your credit card.".into(),
            environment: Environment::Production,
            merchant_id: String::new(),
            transaction_key_test: Default::default(),
            transaction_key_live: Default::default(),
            // accepted brands must match what the Business Center account is enabled for
            card_types: Vec::new(),
            transaction_type: TransactionType::Charge,
            enable_csc: true,
            debug_mode: DebugMode::Off,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self { timeout_secs: 30 }
    }
}
