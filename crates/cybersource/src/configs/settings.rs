use std::{path::PathBuf, time::Duration};

use common_utils::ext_traits::ConfigExt;
use error_stack::ResultExt;
use gateway_env::{env::workspace_path, logger::Log, Env};
use masking::Secret;
use serde::Deserialize;

use crate::{
    consts,
    errors::{ConfigurationError, CustomResult},
    types::{CardType, DebugMode, Environment, TransactionType},
};

#[derive(clap::Parser, Debug, Default)]
pub struct CmdLineConf {
    /// Config file.
    /// Application will look for "config/<env>.toml" if this option isn't specified.
    #[arg(short = 'f', long, value_name = "FILE")]
    pub config_path: Option<PathBuf>,
}

/// Prefix of the environment variables that override file settings,
/// e.g. `CYBERSOURCE__GATEWAY__MERCHANT_ID`.
pub const ENV_PREFIX: &str = "CYBERSOURCE";

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub gateway: GatewayConfig,
    pub connection: ConnectionSettings,
    pub log: Log,
}

/// Merchant facing configuration of the gateway.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub environment: Environment,
    pub merchant_id: String,
    pub transaction_key_test: Secret<String>,
    pub transaction_key_live: Secret<String>,
    /// Brands offered at checkout.
    pub card_types: Vec<CardType>,
    pub transaction_type: TransactionType,
    /// Require the card security code.
    pub enable_csc: bool,
    pub debug_mode: DebugMode,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Upper bound for the whole SOAP round trip.
    pub timeout_secs: u64,
}

impl ConnectionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl GatewayConfig {
    /// Transaction key for the configured environment.
    pub fn active_transaction_key(&self) -> &Secret<String> {
        match self.environment {
            Environment::Test => &self.transaction_key_test,
            Environment::Production => &self.transaction_key_live,
        }
    }

    pub fn service_url(&self) -> &'static str {
        self.environment.service_url()
    }

    pub fn is_production_environment(&self) -> bool {
        self.environment.is_production()
    }

    pub fn is_debug_mode(&self) -> bool {
        self.debug_mode.shows_on_checkout()
    }

    pub fn log_enabled(&self) -> bool {
        self.debug_mode.logs()
    }

    pub fn perform_charge(&self) -> bool {
        self.transaction_type == TransactionType::Charge
    }

    pub fn is_csc_required(&self) -> bool {
        self.enable_csc
    }

    pub fn accepts(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    /// Enabled, with a merchant id and a transaction key for the active environment.
    pub fn is_available(&self) -> bool {
        self.enabled
            && !self.merchant_id.is_empty_after_trim()
            && !self.active_transaction_key().is_empty_after_trim()
    }

    /// Checkout description, flagged while the gateway points at the test environment.
    pub fn checkout_description(&self) -> String {
        if self.is_production_environment() {
            self.description.clone()
        } else if self.description.is_empty_after_trim() {
            consts::TEST_MODE_DESCRIPTION_SUFFIX.to_string()
        } else {
            format!(
                "{} {}",
                self.description,
                consts::TEST_MODE_DESCRIPTION_SUFFIX
            )
        }
    }
}

impl Settings {
    /// Load settings from `config/<env>.toml` under the workspace, then the environment.
    pub fn new() -> CustomResult<Self, ConfigurationError> {
        Self::with_config_path(None)
    }

    pub fn with_config_path(
        explicit_config_path: Option<PathBuf>,
    ) -> CustomResult<Self, ConfigurationError> {
        let environment = gateway_env::which();
        let config_path = Self::config_path(&environment, explicit_config_path);

        let config = config::Config::builder()
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gateway.card_types"),
            )
            .build()
            .map_err(ConfigurationError::from)
            .attach_printable("Unable to assemble the configuration sources")?;

        Self::from_config(config)
    }

    /// Deserialize and validate an already assembled configuration.
    pub fn from_config(config: config::Config) -> CustomResult<Self, ConfigurationError> {
        let settings: Self = config
            .try_deserialize()
            .map_err(ConfigurationError::from)
            .attach_printable("Unable to deserialize the gateway settings")?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn config_path(environment: &Env, explicit_config_path: Option<PathBuf>) -> PathBuf {
        let mut config_path = PathBuf::new();
        if let Some(explicit_config_path_val) = explicit_config_path {
            config_path.push(explicit_config_path_val);
        } else {
            config_path.push(workspace_path());
            config_path.push("config");
            config_path.push(environment.config_file_name());
        }
        config_path
    }

    pub fn validate(&self) -> CustomResult<(), ConfigurationError> {
        self.gateway
            .validate()
            .attach_printable("Invalid [gateway] section")?;
        self.connection
            .validate()
            .attach_printable("Invalid [connection] section")?;
        Ok(())
    }
}
