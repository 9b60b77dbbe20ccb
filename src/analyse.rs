#![doc = "Textract-backed implementation of the `Analyser` capability."]
//
//! # Analysis (Textract)
//!
//! [`TextractAnalyser`] bridges the [`Analyser`] trait to the synchronous
//! Textract APIs:
//!
//! - no features configured: `DetectDocumentText`
//! - one or more features (tables, forms, ...): `AnalyzeDocument`
//!
//! Both calls block until the document is processed; the asynchronous job
//! APIs are never used. The client is built with retries disabled, so a
//! throttled or failed call surfaces immediately as an error.
//!
//! The SDK response is rendered back into the service's JSON shape, every
//! field the output types carry included, so downstream consumers see what
//! the raw API returned. Absent fields are omitted, empty lists are kept.

use async_trait::async_trait;
use aws_sdk_textract::config::retry::RetryConfig;
use aws_sdk_textract::error::DisplayErrorContext;
use aws_sdk_textract::operation::analyze_document::AnalyzeDocumentOutput;
use aws_sdk_textract::operation::detect_document_text::DetectDocumentTextOutput;
use aws_sdk_textract::operation::RequestId;
use aws_sdk_textract::types::{
    Block, Document, DocumentMetadata, FeatureType, Geometry, HumanLoopActivationOutput, Query,
    Relationship, S3Object,
};
use aws_sdk_textract::Client;
use serde_json::{json, Map, Value};

use crate::config::AnalysisFeature;
use crate::contract::{Analyser, CapabilityError};

pub struct TextractAnalyser {
    client: Client,
    features: Vec<FeatureType>,
}

impl TextractAnalyser {
    /// Builds the client from shared SDK config, overriding the retry policy
    /// to a single attempt.
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, features: &[AnalysisFeature]) -> Self {
        let conf = aws_sdk_textract::config::Builder::from(sdk_config)
            .retry_config(RetryConfig::disabled())
            .build();
        let client = Client::from_conf(conf);
        tracing::info!(
            features = features.len(),
            "Initialised TextractAnalyser with retries disabled"
        );
        Self::new(client, features)
    }

    pub fn new(client: Client, features: &[AnalysisFeature]) -> Self {
        Self {
            client,
            features: features.iter().copied().map(feature_type).collect(),
        }
    }

    async fn detect_text(&self, document: Document) -> Result<Value, CapabilityError> {
        let output = self
            .client
            .detect_document_text()
            .document(document)
            .send()
            .await
            .map_err(|e| -> CapabilityError {
                format!("DetectDocumentText failed: {}", DisplayErrorContext(&e)).into()
            })?;
        Ok(render_detect_output(&output))
    }

    async fn analyze_document(&self, document: Document) -> Result<Value, CapabilityError> {
        let output = self
            .client
            .analyze_document()
            .document(document)
            .set_feature_types(Some(self.features.clone()))
            .send()
            .await
            .map_err(|e| -> CapabilityError {
                format!("AnalyzeDocument failed: {}", DisplayErrorContext(&e)).into()
            })?;
        Ok(render_analyze_output(&output))
    }
}

#[async_trait]
impl Analyser for TextractAnalyser {
    async fn analyze(&self, locator: &str) -> Result<Value, CapabilityError> {
        let (bucket, key) = parse_locator(locator)?;
        tracing::debug!(bucket, key, "Calling Textract in synchronous mode");
        let document = Document::builder()
            .s3_object(S3Object::builder().bucket(bucket).name(key).build())
            .build();
        if self.features.is_empty() {
            self.detect_text(document).await
        } else {
            self.analyze_document(document).await
        }
    }
}

/// Splits `s3://bucket/key` into its bucket and key.
pub fn parse_locator(locator: &str) -> Result<(&str, &str), CapabilityError> {
    let rest = locator
        .strip_prefix("s3://")
        .ok_or_else(|| format!("not an s3:// locator: {locator}"))?;
    match rest.split_once('/') {
        Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok((bucket, key)),
        _ => Err(format!("locator has no bucket or key: {locator}").into()),
    }
}

fn feature_type(feature: AnalysisFeature) -> FeatureType {
    match feature {
        AnalysisFeature::Tables => FeatureType::Tables,
        AnalysisFeature::Forms => FeatureType::Forms,
        AnalysisFeature::Signatures => FeatureType::Signatures,
        AnalysisFeature::Layout => FeatureType::Layout,
    }
}

pub fn render_detect_output(output: &DetectDocumentTextOutput) -> Value {
    let mut out = Map::new();
    insert_document(&mut out, output.document_metadata.as_ref(), output.blocks.as_deref());
    insert_some(
        &mut out,
        "DetectDocumentTextModelVersion",
        output.detect_document_text_model_version(),
    );
    insert_response_metadata(&mut out, output.request_id());
    Value::Object(out)
}

pub fn render_analyze_output(output: &AnalyzeDocumentOutput) -> Value {
    let mut out = Map::new();
    insert_document(&mut out, output.document_metadata.as_ref(), output.blocks.as_deref());
    if let Some(human_loop) = output.human_loop_activation_output() {
        out.insert(
            "HumanLoopActivationOutput".to_string(),
            render_human_loop(human_loop),
        );
    }
    insert_some(
        &mut out,
        "AnalyzeDocumentModelVersion",
        output.analyze_document_model_version(),
    );
    insert_response_metadata(&mut out, output.request_id());
    Value::Object(out)
}

fn insert_document(
    out: &mut Map<String, Value>,
    metadata: Option<&DocumentMetadata>,
    blocks: Option<&[Block]>,
) {
    if let Some(metadata) = metadata {
        let mut meta = Map::new();
        insert_some(&mut meta, "Pages", metadata.pages());
        out.insert("DocumentMetadata".to_string(), Value::Object(meta));
    }
    if let Some(blocks) = blocks {
        out.insert(
            "Blocks".to_string(),
            Value::Array(blocks.iter().map(block_to_json).collect()),
        );
    }
}

fn insert_response_metadata(out: &mut Map<String, Value>, request_id: Option<&str>) {
    if let Some(request_id) = request_id {
        out.insert(
            "ResponseMetadata".to_string(),
            json!({ "RequestId": request_id }),
        );
    }
}

fn insert_some<T: Into<Value>>(map: &mut Map<String, Value>, field: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(field.to_string(), value.into());
    }
}

fn insert_list<T, F>(map: &mut Map<String, Value>, field: &str, items: Option<&[T]>, render: F)
where
    F: Fn(&T) -> Value,
{
    if let Some(items) = items {
        map.insert(
            field.to_string(),
            Value::Array(items.iter().map(render).collect()),
        );
    }
}

/// Renders one block with Textract's field names.
pub fn block_to_json(block: &Block) -> Value {
    let mut out = Map::new();
    insert_some(&mut out, "BlockType", block.block_type().map(|t| t.as_str()));
    insert_some(&mut out, "Confidence", block.confidence());
    insert_some(&mut out, "Text", block.text());
    insert_some(&mut out, "TextType", block.text_type().map(|t| t.as_str()));
    insert_some(&mut out, "RowIndex", block.row_index());
    insert_some(&mut out, "ColumnIndex", block.column_index());
    insert_some(&mut out, "RowSpan", block.row_span());
    insert_some(&mut out, "ColumnSpan", block.column_span());
    if let Some(geometry) = block.geometry() {
        out.insert("Geometry".to_string(), render_geometry(geometry));
    }
    insert_some(&mut out, "Id", block.id());
    insert_list(
        &mut out,
        "Relationships",
        block.relationships.as_deref(),
        render_relationship,
    );
    insert_list(&mut out, "EntityTypes", block.entity_types.as_deref(), |e| {
        json!(e.as_str())
    });
    insert_some(
        &mut out,
        "SelectionStatus",
        block.selection_status().map(|s| s.as_str()),
    );
    insert_some(&mut out, "Page", block.page());
    if let Some(query) = block.query() {
        out.insert("Query".to_string(), render_query(query));
    }
    Value::Object(out)
}

fn render_geometry(geometry: &Geometry) -> Value {
    let mut geo = Map::new();
    if let Some(bbox) = geometry.bounding_box() {
        geo.insert(
            "BoundingBox".to_string(),
            json!({
                "Width": bbox.width(),
                "Height": bbox.height(),
                "Left": bbox.left(),
                "Top": bbox.top(),
            }),
        );
    }
    insert_list(&mut geo, "Polygon", geometry.polygon.as_deref(), |p| {
        json!({ "X": p.x(), "Y": p.y() })
    });
    insert_some(&mut geo, "RotationAngle", geometry.rotation_angle());
    Value::Object(geo)
}

fn render_relationship(relationship: &Relationship) -> Value {
    let mut out = Map::new();
    insert_some(&mut out, "Type", relationship.r#type().map(|t| t.as_str()));
    insert_list(&mut out, "Ids", relationship.ids.as_deref(), |id| json!(id));
    Value::Object(out)
}

fn render_query(query: &Query) -> Value {
    let mut out = Map::new();
    out.insert("Text".to_string(), json!(query.text()));
    insert_some(&mut out, "Alias", query.alias());
    insert_list(&mut out, "Pages", query.pages.as_deref(), |p| json!(p));
    Value::Object(out)
}

fn render_human_loop(human_loop: &HumanLoopActivationOutput) -> Value {
    let mut out = Map::new();
    insert_some(&mut out, "HumanLoopArn", human_loop.human_loop_arn());
    insert_list(
        &mut out,
        "HumanLoopActivationReasons",
        human_loop.human_loop_activation_reasons.as_deref(),
        |r| json!(r),
    );
    insert_some(
        &mut out,
        "HumanLoopActivationConditionsEvaluationResults",
        human_loop.human_loop_activation_conditions_evaluation_results(),
    );
    Value::Object(out)
}
