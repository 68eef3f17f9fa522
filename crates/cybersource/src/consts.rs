//! Constants of the CyberSource SOAP toolkit API and of the checkout messages.

/// Name of this gateway as recorded in logs.
pub const CONNECTOR_NAME: &str = "cybersource";

pub const TEST_SERVICE_URL: &str =
    "https://ics2wstesta.ic3.com/commerce/1.x/transactionProcessor/";
pub const PRODUCTION_SERVICE_URL: &str =
    "https://ics2wsa.ic3.com/commerce/1.x/transactionProcessor/";

pub const TRANSACTION_DATA_NAMESPACE: &str = "urn:schemas-cybersource-com:transaction-data-1.26";

pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const WSSE_NAMESPACE: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";
pub const WSSE_PASSWORD_TEXT: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordText";

pub const SOAP_ACTION: &str = "runTransaction";

pub const TEST_TRANSACTION_URL: &str =
    "https://ebctest.cybersource.com/ebctest/transactionsearch/TransactionSearchDetailsLoad.do?requestId=";
pub const PRODUCTION_TRANSACTION_URL: &str =
    "https://ebc.cybersource.com/ebc/transactionsearch/TransactionSearchDetailsLoad.do?requestId=";

/// Client library identification sent with every request.
pub const CLIENT_LIBRARY: &str = "Rust";
pub const CLIENT_LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reason code CyberSource returns when the issuer approved but the CVN check failed.
pub const REASON_CODE_CVN_REVIEW: i64 = 230;

pub const TEST_MODE_PREFIX: &str = "TEST MODE ";
pub const TEST_MODE_DESCRIPTION_SUFFIX: &str = "TEST MODE ENABLED";

pub const GENERIC_ERROR_MESSAGE: &str =
    "An error occurred, please try again or try an alternate form of payment";
pub const GENERIC_REJECT_MESSAGE: &str = "We cannot process your order with the payment information that you provided.  Please use a different payment account or an alternate payment method.";

pub const REVIEW_CVN_MESSAGE: &str = "This order is being placed on hold for review due to an incorrect card verification number.  You may contact the store to complete the transaction.";
pub const REVIEW_GENERIC_MESSAGE: &str = "This order is being placed on hold for review.  You may contact the store to complete the transaction.";
pub const REVIEW_CVN_ADMIN_NOTE: &str = " - The authorization request was approved by the issuing bank but declined by CyberSource because it did not pass the CVN check.  You must log into your CyberSource account and decline or settle the transaction.";

pub const DEBUG_RESPONSE_HEADING: &str = "CyberSource Response:";
