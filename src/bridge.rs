//! Event adapter: analyse every newly created object in a notification batch
//! and store each result as JSON.
//!
//! For each record, in order:
//!   - resolve the source object (`s3://bucket/key`) from the record
//!   - call the [`Analyser`] once, synchronously
//!   - pretty-print the result (4-space indent, UTF-8) and write it through the
//!     [`ObjectStore`] at `{prefix}/{timestamp}/{base filename}.json`
//!
//! # Error Handling
//! A failing record never stops the batch. The error is logged and recorded as
//! a [`RecordOutcome::Failed`]; the caller gets a [`BatchReport`] with one
//! outcome per record. Malformed records (no bucket or key) are reported the
//! same way and never reach the analyser. Configuration problems cannot occur
//! here: a [`BridgeConfig`] is validated when it is built.
//!
//! # Navigation
//! - Main entrypoint: [`handle`]
//! - Supporting types: [`BatchReport`], [`RecordOutcome`], [`RecordError`]

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::BridgeConfig;
use crate::contract::{Analyser, CapabilityError, Clock, ObjectStore};
use crate::event::{ObjectRef, RecordExt, S3Event};
use crate::keys;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("analysis failed: {0}")]
    Analysis(CapabilityError),
    #[error("could not serialise analysis result: {0}")]
    Serialisation(#[from] serde_json::Error),
    #[error("could not store analysis result: {0}")]
    Store(CapabilityError),
}

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Stored {
        locator: String,
        output_key: String,
        bytes_written: usize,
    },
    Failed {
        /// `None` when the record was too malformed to name its object.
        locator: Option<String>,
        reason: String,
    },
}

impl RecordOutcome {
    pub fn is_stored(&self) -> bool {
        matches!(self, RecordOutcome::Stored { .. })
    }
}

/// Per-record outcomes for one invocation, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<RecordOutcome>,
}

impl BatchReport {
    pub fn stored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_stored()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.stored()
    }
}

/// Serialises `value` as UTF-8 JSON indented with four spaces.
pub fn to_pretty_json(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut body = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut body, formatter);
    value.serialize(&mut serializer)?;
    Ok(body)
}

fn block_count(result: &Value) -> usize {
    result
        .get("Blocks")
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

pub async fn handle<A, S, C>(
    config: &BridgeConfig,
    analyser: &A,
    store: &S,
    clock: &C,
    event: &S3Event,
) -> BatchReport
where
    A: Analyser + ?Sized,
    S: ObjectStore + ?Sized,
    C: Clock + ?Sized,
{
    info!(
        records = event.records.len(),
        event = %serde_json::to_string(event).unwrap_or_default(),
        "[BRIDGE] Received notification batch"
    );

    let mut outcomes = Vec::with_capacity(event.records.len());

    for (index, record) in event.records.iter().enumerate() {
        let object = match record.object_ref() {
            Ok(object) => object,
            Err(reason) => {
                let err = RecordError::Malformed(reason);
                error!(record = index, error = %err, "[BRIDGE][ERROR] Skipping record");
                outcomes.push(RecordOutcome::Failed {
                    locator: None,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let locator = object.locator();
        match process_record(config, analyser, store, clock, &object, &locator).await {
            Ok((output_key, bytes_written)) => {
                info!(
                    record = index,
                    locator = %locator,
                    output_key = %output_key,
                    bytes_written,
                    "[BRIDGE] Stored analysis result"
                );
                outcomes.push(RecordOutcome::Stored {
                    locator,
                    output_key,
                    bytes_written,
                });
            }
            Err(err) => {
                error!(record = index, locator = %locator, error = %err, "[BRIDGE][ERROR] Record failed");
                outcomes.push(RecordOutcome::Failed {
                    locator: Some(locator),
                    reason: err.to_string(),
                });
            }
        }
    }

    let report = BatchReport { outcomes };
    info!(
        stored = report.stored(),
        failed = report.failed(),
        "[BRIDGE] Batch complete"
    );
    report
}

async fn process_record<A, S, C>(
    config: &BridgeConfig,
    analyser: &A,
    store: &S,
    clock: &C,
    object: &ObjectRef,
    locator: &str,
) -> Result<(String, usize), RecordError>
where
    A: Analyser + ?Sized,
    S: ObjectStore + ?Sized,
    C: Clock + ?Sized,
{
    debug!(locator, "[BRIDGE] Analysing document");
    let result = analyser
        .analyze(locator)
        .await
        .map_err(RecordError::Analysis)?;
    let completed_at = clock.now();
    let blocks = block_count(&result);
    info!(locator, blocks, "[BRIDGE] Analysis complete");

    let output_key = keys::output_key(config.output_prefix(), completed_at, object.base_filename());
    let body = to_pretty_json(&result)?;
    let bytes_written = body.len();
    store
        .put(&output_key, body)
        .await
        .map_err(RecordError::Store)?;
    Ok((output_key, bytes_written))
}
