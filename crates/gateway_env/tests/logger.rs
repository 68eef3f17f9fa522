#![allow(clippy::unwrap_used)]

use std::sync::OnceLock;

use gateway_env::{logger, Log, LogFormat, TelemetryGuard};

fn init_logger() -> &'static TelemetryGuard {
    static INSTANCE: OnceLock<TelemetryGuard> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let mut config = Log::default();
        config.console.log_format = LogFormat::Default;

        gateway_env::setup(&config, "gateway_env_test", ["logger"]).unwrap()
    })
}

#[test]
fn basic() {
    init_logger();

    logger::info!(reason_code = 100, "decision received");
    logger::debug!("not shown on the console with the default level");
}

#[test]
fn second_setup_is_rejected() {
    init_logger();

    let again = gateway_env::setup(&Log::default(), "gateway_env_test", ["logger"]);
    assert!(again.is_err());
}
