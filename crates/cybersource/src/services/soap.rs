mod ws_security;

use std::fmt;

use async_trait::async_trait;
use error_stack::{report, Report, ResultExt};
use gateway_env::logger;
use reqwest::header;

pub use self::ws_security::{inject_security_header, WsSecurity};
use crate::{
    configs::settings::ConnectionSettings,
    errors::{ConfigurationError, CustomResult, TransportError},
};

/// A SOAP 1.1 call ready to be posted.
#[derive(Clone)]
pub struct SoapRequest {
    pub url: String,
    pub action: &'static str,
    /// Serialized envelope. Carries card data and, once signed, credentials.
    pub envelope: Vec<u8>,
}

impl fmt::Debug for SoapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoapRequest")
            .field("url", &self.url)
            .field("action", &self.action)
            .field("envelope", &format_args!("{} bytes", self.envelope.len()))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct SoapResponse {
    pub status_code: u16,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn send(&self, request: SoapRequest) -> CustomResult<SoapResponse, TransportError>;
}

/// Posts envelopes over HTTPS.
#[derive(Clone, Debug)]
pub struct HttpSoapTransport {
    client: reqwest::Client,
}

impl HttpSoapTransport {
    pub fn new(connection: &ConnectionSettings) -> CustomResult<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(connection.timeout())
            .build()
            .change_context(ConfigurationError::HttpClientBuildFailed)?;

        Ok(Self { client })
    }
}

fn connection_failed(error: reqwest::Error) -> Report<TransportError> {
    let message = error.to_string();
    report!(error).change_context(TransportError::ConnectionFailed { message })
}

#[async_trait]
impl SoapTransport for HttpSoapTransport {
    async fn send(&self, request: SoapRequest) -> CustomResult<SoapResponse, TransportError> {
        logger::debug!(url = %request.url, action = request.action, "posting SOAP envelope");

        let response = self
            .client
            .post(&request.url)
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .header("SOAPAction", request.action)
            .body(request.envelope)
            .send()
            .await
            .map_err(connection_failed)?;

        let status_code = response.status().as_u16();
        let body = response.bytes().await.map_err(connection_failed)?;

        logger::debug!(status_code, "received SOAP reply");

        Ok(SoapResponse {
            status_code,
            body: body.to_vec(),
        })
    }
}
