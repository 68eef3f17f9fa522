//! Errors and error specific types for universal use

/// Custom Result
/// A custom datatype that wraps the error variant <E> into a report, allowing
/// error_stack::Report<E> specific extendability
///
/// Effectively, equivalent to `Result<T, error_stack::Report<E>>`
///
pub type CustomResult<T, E> = error_stack::Result<T, E>;

/// Parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ParsingError {
    /// Failed to serialize a value into the given format.
    #[error("Failed to encode {0} as {1}")]
    EncodeError(&'static str, &'static str),

    /// Failed to deserialize bytes into the named struct.
    #[error("Failed to parse struct: {0}")]
    StructParseFailure(&'static str),

    /// The value is not a three-letter ISO 4217 currency code.
    #[error("Invalid currency code")]
    CurrencyCodeParseFailure,

    /// The bytes were not valid UTF-8.
    #[error("Failed to decode bytes as UTF-8")]
    Utf8DecodingFailed,
}
