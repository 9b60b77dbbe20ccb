use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info};

pub const OUTPUT_BUCKET_VAR: &str = "S3_OUTPUT_BUCKET";
pub const OUTPUT_PREFIX_VAR: &str = "S3_OUTPUT_PREFIX";
pub const LOG_LEVEL_VAR: &str = "LOG_LEVEL";
pub const FEATURES_VAR: &str = "TEXTRACT_FEATURES";

const DEFAULT_LOG_LEVEL: &str = "INFO";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("output bucket is not configured (S3_OUTPUT_BUCKET missing or empty)")]
    MissingOutputBucket,
    #[error("output prefix is not configured (S3_OUTPUT_PREFIX missing or empty)")]
    MissingOutputPrefix,
    #[error("unknown analysis feature {0:?} in TEXTRACT_FEATURES")]
    UnknownFeature(String),
    #[error("unknown log level {0:?} in LOG_LEVEL")]
    UnknownLogLevel(String),
}

/// Optional Textract analysis features. With none selected the bridge uses
/// plain text detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisFeature {
    Tables,
    Forms,
    Signatures,
    Layout,
}

impl FromStr for AnalysisFeature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TABLES" => Ok(AnalysisFeature::Tables),
            "FORMS" => Ok(AnalysisFeature::Forms),
            "SIGNATURES" => Ok(AnalysisFeature::Signatures),
            "LAYOUT" => Ok(AnalysisFeature::Layout),
            other => Err(ConfigError::UnknownFeature(other.to_string())),
        }
    }
}

/// Validated bridge configuration. Construction fails fast, so a value of this
/// type always carries a non-empty output bucket and prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    output_bucket: String,
    output_prefix: String,
    log_level: String,
    features: Vec<AnalysisFeature>,
}

impl BridgeConfig {
    pub fn new(
        output_bucket: impl Into<String>,
        output_prefix: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let output_bucket = output_bucket.into().trim().to_string();
        if output_bucket.is_empty() {
            return Err(ConfigError::MissingOutputBucket);
        }
        let output_prefix = output_prefix.into().trim().trim_end_matches('/').to_string();
        if output_prefix.is_empty() {
            return Err(ConfigError::MissingOutputPrefix);
        }
        Ok(Self {
            output_bucket,
            output_prefix,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            features: Vec::new(),
        })
    }

    /// Sets the log level; names outside the accepted set are rejected.
    pub fn with_log_level(mut self, level: impl Into<String>) -> Result<Self, ConfigError> {
        let level = level.into();
        if level_filter(&level).is_none() {
            return Err(ConfigError::UnknownLogLevel(level));
        }
        self.log_level = level;
        Ok(self)
    }

    pub fn with_features(mut self, features: Vec<AnalysisFeature>) -> Self {
        self.features = features;
        self
    }

    /// Reads the configuration from the process environment.
    ///
    /// `S3_OUTPUT_BUCKET` and `S3_OUTPUT_PREFIX` have no defaults; `LOG_LEVEL`
    /// defaults to `INFO` and `TEXTRACT_FEATURES` to none.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bucket = env::var(OUTPUT_BUCKET_VAR).unwrap_or_default();
        let prefix = env::var(OUTPUT_PREFIX_VAR).unwrap_or_default();
        let log_level = env::var(LOG_LEVEL_VAR)
            .ok()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        let features = match env::var(FEATURES_VAR) {
            Ok(raw) => parse_features(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self::new(bucket, prefix)?
            .with_log_level(log_level)?
            .with_features(features))
    }

    pub fn output_bucket(&self) -> &str {
        &self.output_bucket
    }

    pub fn output_prefix(&self) -> &str {
        &self.output_prefix
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn features(&self) -> &[AnalysisFeature] {
        &self.features
    }

    /// The `tracing` filter directive for the configured level.
    pub fn log_filter(&self) -> &'static str {
        level_filter(&self.log_level).unwrap_or("info")
    }

    pub fn trace_loaded(&self) {
        info!(
            output_bucket = %self.output_bucket,
            output_prefix = %self.output_prefix,
            features = self.features.len(),
            "Loaded BridgeConfig"
        );
        debug!(?self, "BridgeConfig loaded (full debug)");
    }
}

/// Translates a level name (`WARNING` and `CRITICAL` are accepted) into a
/// `tracing` filter directive.
pub fn level_filter(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_uppercase().as_str() {
        "TRACE" | "NOTSET" => Some("trace"),
        "DEBUG" => Some("debug"),
        "INFO" => Some("info"),
        "WARN" | "WARNING" => Some("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Some("error"),
        _ => None,
    }
}

/// Parses a comma-separated feature list; blank entries are ignored and
/// duplicates collapse.
pub fn parse_features(raw: &str) -> Result<Vec<AnalysisFeature>, ConfigError> {
    let mut features = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let feature: AnalysisFeature = part.parse()?;
        if !features.contains(&feature) {
            features.push(feature);
        }
    }
    Ok(features)
}
