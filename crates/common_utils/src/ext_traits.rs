//!
//! This module holds traits for extending functionalities for existing datatypes
//! & inbuilt datatypes.
//!

use error_stack::ResultExt;
use masking::{PeekInterface, Secret, Strategy};
use serde::{Deserialize, Serialize};

use crate::errors::{self, CustomResult};

///
/// Encode interface for XML payloads
///
pub trait XmlEncode {
    ///
    /// Serialize `Self` into an XML `String` rooted at `root_tag`
    /// using the `Serialize` trait from `serde`
    ///
    fn encode_to_xml_string(&self, root_tag: &'static str)
        -> CustomResult<String, errors::ParsingError>;
}

impl<T> XmlEncode for T
where
    T: Serialize,
{
    fn encode_to_xml_string(
        &self,
        root_tag: &'static str,
    ) -> CustomResult<String, errors::ParsingError> {
        quick_xml::se::to_string_with_root(root_tag, self)
            .change_context(errors::ParsingError::EncodeError(root_tag, "xml"))
            .attach_printable_lazy(|| format!("Unable to encode {root_tag} as XML"))
    }
}

///
/// Extending functionalities of `[u8]` for performing parsing
///
pub trait ByteSliceExt {
    ///
    /// Convert `[u8]` into type `<T>` by using `serde::Deserialize` over an XML document
    ///
    fn parse_xml<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, errors::ParsingError>
    where
        T: Deserialize<'de>;
}

impl ByteSliceExt for [u8] {
    fn parse_xml<'de, T>(&'de self, type_name: &'static str) -> CustomResult<T, errors::ParsingError>
    where
        T: Deserialize<'de>,
    {
        let document =
            std::str::from_utf8(self).change_context(errors::ParsingError::Utf8DecodingFailed)?;

        quick_xml::de::from_str::<T>(document)
            .change_context(errors::ParsingError::StructParseFailure(type_name))
            .attach_printable_lazy(|| format!("Unable to parse {type_name} from XML"))
    }
}

///
/// Extending functionalities of configuration values
///
pub trait ConfigExt {
    /// Returns whether the value of `self` is empty after trimming whitespace on both left and
    /// right ends.
    fn is_empty_after_trim(&self) -> bool;

    /// Returns whether the value of `self` is the default value for `Self` or empty after trimming
    /// whitespace on both left and right ends.
    fn is_default_or_empty(&self) -> bool
    where
        Self: Default + PartialEq<Self>,
    {
        *self == Self::default() || self.is_empty_after_trim()
    }
}

impl ConfigExt for String {
    fn is_empty_after_trim(&self) -> bool {
        self.trim().is_empty()
    }
}

impl<T, U> ConfigExt for Secret<T, U>
where
    T: ConfigExt + Default + PartialEq<T>,
    U: Strategy<T>,
{
    fn is_empty_after_trim(&self) -> bool {
        self.peek().is_empty_after_trim()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Reply {
        #[serde(rename = "@id")]
        id: u8,
        decision: String,
    }

    #[test]
    fn xml_round_trip_through_extension_traits() {
        let reply = Reply {
            id: 7,
            decision: "ACCEPT".to_string(),
        };
        let xml = reply.encode_to_xml_string("reply").unwrap();
        assert_eq!(xml, r#"<reply id="7"><decision>ACCEPT</decision></reply>"#);

        let parsed: Reply = xml.as_bytes().parse_xml("Reply").unwrap();
        assert_eq!(parsed, reply);
    }

    #[test]
    fn invalid_xml_reports_the_target_type() {
        let error = b"<reply>".parse_xml::<Reply>("Reply").unwrap_err();
        assert_eq!(
            error.current_context().to_string(),
            "Failed to parse struct: Reply"
        );
    }

    #[test]
    fn blank_secrets_count_as_empty() {
        let secret: Secret<String> = Secret::new("   ".to_string());
        assert!(secret.is_default_or_empty());
        assert!(!Secret::<String>::new("key".to_string()).is_default_or_empty());
    }
}
