use common_utils::{ext_traits::ConfigExt, fp_utils::when};

use crate::errors::ConfigurationError;

impl super::settings::GatewayConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        // a disabled gateway may be left unconfigured
        if !self.enabled {
            return Ok(());
        }

        when(self.merchant_id.is_default_or_empty(), || {
            Err(ConfigurationError::InvalidConfigurationValueError(
                "merchant id must not be empty".into(),
            ))
        })?;

        when(self.active_transaction_key().is_default_or_empty(), || {
            Err(ConfigurationError::InvalidConfigurationValueError(format!(
                "transaction key for the {} environment must not be empty",
                self.environment
            )))
        })?;

        when(self.card_types.is_empty(), || {
            Err(ConfigurationError::InvalidConfigurationValueError(
                "at least one card type must be accepted".into(),
            ))
        })
    }
}

impl super::settings::ConnectionSettings {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        when(self.timeout_secs == 0, || {
            Err(ConfigurationError::InvalidConfigurationValueError(
                "connection timeout must be greater than zero".into(),
            ))
        })
    }
}
