pub mod mock_db;
pub mod order;
pub mod soap;

pub use self::{
    order::{CartInterface, OrderInterface},
    soap::{HttpSoapTransport, SoapRequest, SoapResponse, SoapTransport, WsSecurity},
};
