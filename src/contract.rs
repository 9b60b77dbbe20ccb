//! # contract: capability interfaces for the bridge
//!
//! This module defines the three seams through which the bridge touches the
//! outside world:
//!
//! - [`Analyser`]: the remote document-analysis service (Textract in production).
//! - [`ObjectStore`]: the output store the analysis results are written to (S3).
//! - [`Clock`]: the source of the UTC timestamp embedded in every output key.
//!
//! ## Mocking & Testing
//! - Every trait is annotated for `mockall`, so consumers get `MockAnalyser`,
//!   `MockObjectStore` and `MockClock` for deterministic tests.
//! - Mocks are exported outside the crate behind the `test-export-mocks`
//!   feature (on by default) so the integration tests under `tests/` can use them.
//!
//! ## Errors
//! - Implementors convert every upstream failure into a boxed error; the
//!   bridge only logs and reports it, it never inspects the concrete type.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// Error type shared by the capability traits (simple boxed error).
pub type CapabilityError = Box<dyn std::error::Error + Send + Sync>;

/// Synchronous document analysis of a stored object.
///
/// Implementations must block until the document is fully processed remotely
/// and return the complete result, never a job handle to poll later.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Analyser: Send + Sync {
    /// Analyse the object identified by `locator` (`s3://bucket/key`).
    async fn analyze(&self, locator: &str) -> Result<serde_json::Value, CapabilityError>;
}

/// Write-only view of the output store.
///
/// The destination bucket is fixed when the implementor is constructed; only
/// the key varies per call.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`, replacing nothing (keys are fresh per record).
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), CapabilityError>;
}

/// Wall clock used to stamp output keys.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The production clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
