pub mod transformers;

use common_utils::ext_traits::{ByteSliceExt, XmlEncode};
use error_stack::{report, ResultExt};
use gateway_env::logger;

use self::transformers as cybersource;
use crate::{
    configs::settings::GatewayConfig,
    consts,
    core::validation::ValidatedCard,
    errors::{CustomResult, GatewayError, TransportError},
    services::soap::{SoapRequest, SoapResponse},
    types::OrderSnapshot,
};

#[derive(Clone, Copy, Debug, Default)]
pub struct Cybersource;

impl Cybersource {
    pub fn new() -> &'static Self {
        &Self
    }

    pub fn id(&self) -> &'static str {
        consts::CONNECTOR_NAME
    }

    pub fn get_url(&self, config: &GatewayConfig) -> String {
        config.service_url().to_owned()
    }

    pub fn get_request_body(
        &self,
        config: &GatewayConfig,
        order: &OrderSnapshot,
        card: &ValidatedCard,
    ) -> CustomResult<cybersource::CybersourcePaymentsRequest, GatewayError> {
        let connector_router_data = cybersource::CybersourceRouterData::from((config, order, card));
        cybersource::CybersourcePaymentsRequest::try_from(&connector_router_data)
    }

    /// Wrap `requestMessage` in a SOAP 1.1 envelope with an empty header, ready for signing.
    pub fn build_envelope(
        &self,
        request: &cybersource::CybersourcePaymentsRequest,
    ) -> CustomResult<Vec<u8>, GatewayError> {
        let request_message = request
            .encode_to_xml_string("requestMessage")
            .change_context(GatewayError::RequestEncodingFailed)?;

        let envelope = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><soapenv:Envelope xmlns:soapenv="{}"><soapenv:Header/><soapenv:Body>{}</soapenv:Body></soapenv:Envelope>"#,
            consts::SOAP_ENVELOPE_NAMESPACE,
            request_message
        );

        Ok(envelope.into_bytes())
    }

    pub fn build_request(
        &self,
        config: &GatewayConfig,
        request: &cybersource::CybersourcePaymentsRequest,
    ) -> CustomResult<SoapRequest, GatewayError> {
        Ok(SoapRequest {
            url: self.get_url(config),
            action: consts::SOAP_ACTION,
            envelope: self.build_envelope(request)?,
        })
    }

    /// Read the reply out of the response envelope. A SOAP fault becomes
    /// [`TransportError::SoapFault`]; an unreadable body on a non-2xx status is reported as a
    /// connection failure carrying the status.
    pub fn handle_response(
        &self,
        response: SoapResponse,
    ) -> CustomResult<cybersource::CybersourceReply, TransportError> {
        let envelope = response
            .body
            .parse_xml::<cybersource::CybersourceEnvelope>("CybersourceEnvelope");

        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(error) if !(200..300).contains(&response.status_code) => {
                logger::warn!(
                    status_code = response.status_code,
                    "unreadable reply on unsuccessful HTTP status"
                );
                return Err(error.change_context(TransportError::ConnectionFailed {
                    message: format!("HTTP status {}", response.status_code),
                }));
            }
            Err(error) => {
                return Err(error.change_context(TransportError::ResponseDeserializationFailed))
            }
        };

        match envelope.body {
            cybersource::CybersourceBody {
                fault: Some(fault), ..
            } => Err(report!(TransportError::SoapFault {
                code: fault.fault_code,
                message: fault.fault_string,
            })),
            cybersource::CybersourceBody {
                reply_message: Some(reply),
                ..
            } => Ok(reply),
            cybersource::CybersourceBody { .. } => {
                Err(report!(TransportError::ResponseDeserializationFailed))
                    .attach_printable("reply envelope carries neither a replyMessage nor a Fault")
            }
        }
    }
}
