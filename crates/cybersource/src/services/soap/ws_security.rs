//! WS-Security UsernameToken signing of outgoing SOAP envelopes.

use async_trait::async_trait;
use error_stack::{report, Report, ResultExt};
use masking::{PeekInterface, Secret};
use quick_xml::{
    escape::escape,
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use super::{SoapRequest, SoapResponse, SoapTransport};
use crate::{
    consts,
    errors::{CustomResult, TransportError},
};

/// Prefix bound to the envelope namespace when the envelope itself uses a default namespace.
const SOAP_ENV_PREFIX: &str = "SOAP-ENV";

/// Adds a `wsse:Security` header to every envelope before handing it to `inner`.
#[derive(Clone, Debug)]
pub struct WsSecurity<T> {
    inner: T,
    username: String,
    password: Secret<String>,
}

impl<T> WsSecurity<T> {
    pub fn new(inner: T, username: impl Into<String>, password: Secret<String>) -> Self {
        Self {
            inner,
            username: username.into(),
            password,
        }
    }
}

#[async_trait]
impl<T> SoapTransport for WsSecurity<T>
where
    T: SoapTransport,
{
    async fn send(&self, mut request: SoapRequest) -> CustomResult<SoapResponse, TransportError> {
        request.envelope =
            inject_security_header(&request.envelope, &self.username, self.password.peek())?;
        self.inner.send(request).await
    }
}

/// Insert a UsernameToken `Security` block as the first child of the envelope's `Header`,
/// creating the `Header` as the first child of the `Envelope` when there is none.
pub fn inject_security_header(
    envelope: &[u8],
    username: &str,
    password: &str,
) -> CustomResult<Vec<u8>, TransportError> {
    insert_into_header(envelope, |envelope_prefix| {
        security_fragment(envelope_prefix, username, password)
    })
}

fn security_fragment(envelope_prefix: Option<&str>, username: &str, password: &str) -> String {
    let must_understand = match envelope_prefix {
        Some(prefix) => format!(r#"{prefix}:mustUnderstand="1""#),
        None => format!(
            r#"xmlns:{SOAP_ENV_PREFIX}="{}" {SOAP_ENV_PREFIX}:mustUnderstand="1""#,
            consts::SOAP_ENVELOPE_NAMESPACE
        ),
    };

    format!(
        concat!(
            r#"<wsse:Security xmlns:wsse="{namespace}" {must_understand}>"#,
            "<wsse:UsernameToken>",
            "<wsse:Username>{username}</wsse:Username>",
            r#"<wsse:Password Type="{password_type}">{password}</wsse:Password>"#,
            "</wsse:UsernameToken>",
            "</wsse:Security>"
        ),
        namespace = consts::WSSE_NAMESPACE,
        must_understand = must_understand,
        username = escape(username),
        password_type = consts::WSSE_PASSWORD_TEXT,
        password = escape(password),
    )
}

fn malformed_envelope() -> Report<TransportError> {
    report!(TransportError::MalformedEnvelope)
}

fn malformed_header() -> Report<TransportError> {
    report!(TransportError::MalformedSecurityHeader)
}

/// Events of a header fragment; elements must balance.
fn parse_fragment(fragment: &str) -> CustomResult<Vec<Event<'static>>, TransportError> {
    let mut reader = Reader::from_str(fragment);
    let mut events = Vec::new();
    let mut depth = 0usize;

    loop {
        let event = reader
            .read_event()
            .change_context(TransportError::MalformedSecurityHeader)?;
        match &event {
            Event::Eof => break,
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.checked_sub(1).ok_or_else(malformed_header)?,
            _ => {}
        }
        events.push(event.into_owned());
    }

    if depth != 0 || events.is_empty() {
        return Err(malformed_header())
            .attach_printable_lazy(|| format!("{depth} element(s) left open in header fragment"));
    }
    Ok(events)
}

/// Attributes must be unique and their values must only use known entities.
fn check_attributes(start: &BytesStart<'_>) -> CustomResult<(), TransportError> {
    for attribute in start.attributes().with_checks(true) {
        attribute
            .change_context(TransportError::MalformedEnvelope)?
            .unescape_value()
            .change_context(TransportError::MalformedEnvelope)?;
    }
    Ok(())
}

/// Only whitespace may sit outside the root element.
fn check_text(text: &BytesText<'_>, depth: usize) -> CustomResult<(), TransportError> {
    let unescaped = text
        .unescape()
        .change_context(TransportError::MalformedEnvelope)?;
    if depth == 0 && !unescaped.trim().is_empty() {
        return Err(malformed_envelope()).attach_printable("text outside the root element");
    }
    Ok(())
}

fn is_header(start: &BytesStart<'_>) -> bool {
    start.local_name().as_ref() == b"Header"
}

/// Prefix of the root `Envelope`, `None` when it relies on a default namespace.
fn envelope_prefix(start: &BytesStart<'_>) -> CustomResult<Option<String>, TransportError> {
    if start.local_name().as_ref() != b"Envelope" {
        return Err(malformed_envelope()).attach_printable("root element is not a SOAP Envelope");
    }

    start
        .name()
        .prefix()
        .map(|prefix| std::str::from_utf8(prefix.as_ref()).map(str::to_owned))
        .transpose()
        .change_context(TransportError::MalformedEnvelope)
}

struct HeaderWriter<F> {
    writer: Writer<Vec<u8>>,
    envelope_prefix: Option<String>,
    fragment: Option<F>,
}

impl<F> HeaderWriter<F>
where
    F: FnOnce(Option<&str>) -> String,
{
    fn write(&mut self, event: Event<'_>) -> CustomResult<(), TransportError> {
        self.writer
            .write_event(event)
            .change_context(TransportError::MalformedEnvelope)
    }

    fn is_pending(&self) -> bool {
        self.fragment.is_some()
    }

    fn write_security(&mut self) -> CustomResult<(), TransportError> {
        let Some(build) = self.fragment.take() else {
            return Ok(());
        };
        let fragment = build(self.envelope_prefix.as_deref());
        for event in parse_fragment(&fragment)? {
            self.write(event)?;
        }
        Ok(())
    }

    fn write_new_header(&mut self) -> CustomResult<(), TransportError> {
        let name = match &self.envelope_prefix {
            Some(prefix) => format!("{prefix}:Header"),
            None => "Header".to_string(),
        };
        self.write(Event::Start(BytesStart::new(name.as_str())))?;
        self.write_security()?;
        self.write(Event::End(BytesEnd::new(name.as_str())))
    }
}

fn insert_into_header<F>(envelope: &[u8], fragment: F) -> CustomResult<Vec<u8>, TransportError>
where
    F: FnOnce(Option<&str>) -> String,
{
    let mut reader = Reader::from_reader(envelope);
    let mut output = HeaderWriter {
        writer: Writer::new(Vec::with_capacity(envelope.len().saturating_add(512))),
        envelope_prefix: None,
        fragment: Some(fragment),
    };
    let mut depth = 0usize;
    let mut root_closed = false;

    loop {
        let event = reader
            .read_event()
            .change_context(TransportError::MalformedEnvelope)
            .attach_printable_lazy(|| {
                format!("at byte {} of the envelope", reader.buffer_position())
            })?;

        match event {
            Event::Eof => break,
            Event::Start(start) => {
                if root_closed {
                    return Err(malformed_envelope()).attach_printable("more than one root element");
                }
                check_attributes(&start)?;
                depth += 1;
                match depth {
                    1 => {
                        output.envelope_prefix = envelope_prefix(&start)?;
                        output.write(Event::Start(start))?;
                    }
                    2 if output.is_pending() => {
                        if is_header(&start) {
                            output.write(Event::Start(start))?;
                            output.write_security()?;
                        } else {
                            output.write_new_header()?;
                            output.write(Event::Start(start))?;
                        }
                    }
                    _ => output.write(Event::Start(start))?,
                }
            }
            Event::Empty(start) => {
                if root_closed || depth == 0 {
                    return Err(malformed_envelope()).attach_printable("envelope has no body");
                }
                check_attributes(&start)?;
                if depth == 1 && output.is_pending() {
                    if is_header(&start) {
                        output.write(Event::Start(start.borrow()))?;
                        output.write_security()?;
                        output.write(Event::End(start.to_end()))?;
                    } else {
                        output.write_new_header()?;
                        output.write(Event::Empty(start))?;
                    }
                } else {
                    output.write(Event::Empty(start))?;
                }
            }
            Event::End(end) => {
                if depth == 1 && output.is_pending() {
                    output.write_new_header()?;
                }
                depth = depth.checked_sub(1).ok_or_else(malformed_envelope)?;
                root_closed = depth == 0;
                output.write(Event::End(end))?;
            }
            Event::Text(text) => {
                check_text(&text, depth)?;
                output.write(Event::Text(text))?;
            }
            Event::CData(_) if depth == 0 => {
                return Err(malformed_envelope()).attach_printable("CDATA outside the root element");
            }
            other => output.write(other)?,
        }
    }

    if !root_closed || output.is_pending() {
        return Err(malformed_envelope()).attach_printable("envelope is incomplete");
    }

    Ok(output.writer.into_inner())
}
