#![doc = "textract-bridge: analyse newly created S3 objects with Textract and store the results."]

//! This crate holds the event adapter and everything around it: the
//! capability traits it depends on, the validated configuration, the inbound
//! notification model and the AWS-backed implementations used in production.
//!
//! # Usage
//! Build a [`config::BridgeConfig`], pick an [`contract::Analyser`] and an
//! [`contract::ObjectStore`] (real or mocked), then call [`bridge::handle`]
//! once per notification batch. [`runtime::run`] wires the production
//! implementations into the Lambda event loop.

pub mod analyse;
pub mod bridge;
pub mod config;
pub mod contract;
pub mod event;
pub mod keys;
pub mod runtime;
pub mod store;
pub mod telemetry;

pub use bridge::{handle, BatchReport, RecordError, RecordOutcome};
pub use config::{BridgeConfig, ConfigError};
pub use event::S3Event;
