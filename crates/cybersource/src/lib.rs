#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR" ), "/", "README.md"))]

pub mod configs;
pub mod connector;
pub mod consts;
pub mod core;
pub mod errors;
pub mod services;
pub mod types;

pub use gateway_env::logger;

pub use self::{
    configs::settings::{GatewayConfig, Settings},
    core::payments::{process_payment, Gateway},
};
