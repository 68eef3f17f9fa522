use std::path::PathBuf;

use cybersource::{
    configs::settings::CmdLineConf,
    core::payments::transaction_url,
    errors::{ApplicationError, CustomResult},
    logger, process_payment,
    services::{
        mock_db::{MockCart, MockOrder},
        OrderInterface,
    },
    types::{OrderMetaKey, OrderSnapshot, OrderStatus, PaymentForm},
    Gateway, Settings,
};
use error_stack::ResultExt;
use serde::Deserialize;
use strum::IntoEnumIterator;

#[derive(Debug, clap::Parser)]
#[command(name = "checkout", about = "Submit one card payment attempt to CyberSource")]
struct Cli {
    #[command(flatten)]
    conf: CmdLineConf,
    /// JSON file holding the order snapshot and the checkout form fields.
    #[arg(value_name = "ATTEMPT")]
    attempt: PathBuf,
}

/// Order and form fields of one attempt, as the storefront hands them over.
#[derive(Debug, Deserialize)]
struct CheckoutAttempt {
    #[serde(default)]
    status: OrderStatus,
    order: OrderSnapshot,
    form: PaymentForm,
    #[serde(default)]
    cart_items: usize,
}

#[tokio::main]
async fn main() -> CustomResult<(), ApplicationError> {
    let cli = <Cli as clap::Parser>::parse();

    let conf = Settings::with_config_path(cli.conf.config_path)
        .change_context(ApplicationError::ConfigurationError)?;

    let _guard = logger::setup(
        &conf.log,
        env!("CARGO_BIN_NAME"),
        [env!("CARGO_CRATE_NAME"), "cybersource"],
    )
    .change_context(ApplicationError::ConfigurationError)?;

    let gateway =
        Gateway::from_settings(&conf).change_context(ApplicationError::ConfigurationError)?;
    if !gateway.is_available() {
        logger::warn!("gateway is disabled or missing credentials for its environment");
    }
    logger::info!(
        gateway = gateway.title(),
        environment = %gateway.config().environment,
        "checkout started"
    );

    let contents = tokio::fs::read(&cli.attempt)
        .await
        .change_context(ApplicationError::InvalidCheckoutAttempt)
        .attach_printable_lazy(|| format!("Unable to read {}", cli.attempt.display()))?;
    let attempt: CheckoutAttempt = serde_json::from_slice(&contents)
        .change_context(ApplicationError::InvalidCheckoutAttempt)?;

    let mut order = MockOrder::with_status(attempt.status);
    let mut cart = MockCart::with_items(attempt.cart_items);

    let outcome = process_payment(&gateway, &mut order, &attempt.order, &mut cart, &attempt.form)
        .await
        .change_context(ApplicationError::PaymentAborted)?;

    let meta = OrderMetaKey::iter()
        .filter_map(|key| {
            order
                .meta(key)
                .map(|value| (key.to_string(), serde_json::Value::from(value)))
        })
        .collect::<serde_json::Map<_, _>>();

    let summary = serde_json::json!({
        "outcome": outcome,
        "order": {
            "status": order.status(),
            "notes": order.notes(),
            "meta": meta,
            "transaction_url": transaction_url(&order),
        },
        "cart_emptied": cart.times_emptied > 0,
    });
    let rendered = serde_json::to_string_pretty(&summary)
        .change_context(ApplicationError::ResponseEncodingFailed)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{rendered}");
    }

    Ok(())
}
