//! Process entry point: configuration, telemetry, AWS clients, event loop.

use anyhow::Result;
use lambda_runtime::{service_fn, LambdaEvent};

use crate::analyse::TextractAnalyser;
use crate::bridge::{handle, BatchReport};
use crate::config::BridgeConfig;
use crate::contract::SystemClock;
use crate::event::S3Event;
use crate::store::S3ObjectStore;
use crate::telemetry;

/// Loads and validates the configuration, then serves notification batches
/// until the runtime stops.
///
/// An invalid configuration is returned as an error before any AWS client is
/// built or any event is accepted.
pub async fn run() -> Result<()> {
    let config = match BridgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init("info");
            tracing::error!(error = %e, "Invalid configuration, refusing to serve events");
            return Err(e.into());
        }
    };
    telemetry::init(config.log_filter());
    config.trace_loaded();

    let sdk_config = aws_config::load_from_env().await;
    let analyser = TextractAnalyser::from_sdk_config(&sdk_config, config.features());
    let store = S3ObjectStore::from_sdk_config(&sdk_config, config.output_bucket());
    tracing::info!(output_bucket = %store.bucket(), "Clients constructed, serving events");

    let (config, analyser, store) = (&config, &analyser, &store);
    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| async move {
        let report = handle(config, analyser, store, &SystemClock, &event.payload).await;
        Ok::<BatchReport, lambda_runtime::Error>(report)
    }))
    .await
    .map_err(|e| anyhow::anyhow!("lambda runtime exited: {e}"))
}
