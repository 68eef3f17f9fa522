pub use common_utils::errors::CustomResult;

/// A checkout form field that failed validation. The `Display` text is shown to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardValidationError {
    #[error("Please select a card type")]
    MissingCardType,
    #[error("That card type is not accepted, please use an alternate card or other form of payment.")]
    CardTypeNotAccepted,
    #[error("Card security code is missing")]
    MissingSecurityCode,
    #[error("Card security code is invalid (only digits are allowed)")]
    NonNumericSecurityCode,
    #[error("Card security code is invalid (wrong length)")]
    SecurityCodeLength,
    #[error("Card expiration date is invalid")]
    InvalidExpirationDate,
    #[error("Card number is invalid")]
    InvalidCardNumber,
}

impl From<cards::CardDataError> for CardValidationError {
    fn from(error: cards::CardDataError) -> Self {
        match error {
            cards::CardDataError::MissingSecurityCode => Self::MissingSecurityCode,
            cards::CardDataError::NonNumericSecurityCode => Self::NonNumericSecurityCode,
            cards::CardDataError::SecurityCodeLength { .. } => Self::SecurityCodeLength,
            cards::CardDataError::InvalidExpirationMonth
            | cards::CardDataError::InvalidExpirationYear => Self::InvalidExpirationDate,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The processor could not be reached or answered with a transport level failure.
    #[error("{message}")]
    ConnectionFailed { message: String },
    #[error("SOAP fault {code}: {message}")]
    SoapFault { code: String, message: String },
    #[error("Outgoing SOAP envelope is not well-formed XML")]
    MalformedEnvelope,
    #[error("WS-Security header is not well-formed XML")]
    MalformedSecurityHeader,
    #[error("Failed to deserialize the processor reply")]
    ResponseDeserializationFailed,
}

impl TransportError {
    /// Whether the failure is a programming or configuration error that must abort the attempt,
    /// as opposed to a connection problem reported to the shopper.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MalformedEnvelope | Self::MalformedSecurityHeader)
    }

    /// Message shown to the shopper for recoverable failures.
    pub fn user_message(&self) -> String {
        match self {
            Self::SoapFault { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Failed to encode the CyberSource request")]
    RequestEncodingFailed,
    #[error("Failed to attach the WS-Security header to the request")]
    SecurityHeaderInjectionFailed,
    #[error("Failed to format the transaction timestamp")]
    TimestampFormattingFailed,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Configuration value is invalid: {0}")]
    InvalidConfigurationValueError(String),
    #[error("Failed to load the configuration: {0}")]
    ConfigLoadingFailed(#[from] config::ConfigError),
    #[error("Failed to build the HTTP client")]
    HttpClientBuildFailed,
}

/// Failures of the `checkout` binary.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("Application configuration error")]
    ConfigurationError,
    #[error("Failed to read the checkout attempt")]
    InvalidCheckoutAttempt,
    #[error("Payment attempt aborted")]
    PaymentAborted,
    #[error("Failed to render the attempt result")]
    ResponseEncodingFailed,
}
