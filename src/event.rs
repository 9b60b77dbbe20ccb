//! Inbound S3 notification batch.
//!
//! The notification model itself comes from `aws_lambda_events`; this module
//! only adds the per-record lookup of the created object. A record without a
//! bucket name or object key is rejected on its own, the rest of the batch is
//! unaffected.

pub use aws_lambda_events::event::s3::{S3Bucket, S3Entity, S3Event, S3EventRecord, S3Object};

use crate::keys;

/// A bucket/key pair taken from a well-formed record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRef {
    pub bucket: String,
    pub key: String,
}

impl ObjectRef {
    pub fn locator(&self) -> String {
        keys::locator(&self.bucket, &self.key)
    }

    pub fn base_filename(&self) -> &str {
        keys::base_filename(&self.key)
    }
}

/// Object lookup on a notification record.
pub trait RecordExt {
    /// Returns the referenced object, or a description of what is missing.
    fn object_ref(&self) -> Result<ObjectRef, String>;
}

impl RecordExt for S3EventRecord {
    fn object_ref(&self) -> Result<ObjectRef, String> {
        let bucket = self
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or("record has no source bucket name")?;
        let key = self
            .s3
            .object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or("record has no source object key")?;
        Ok(ObjectRef {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }
}

/// Builds a record for an object-created event, mostly for tests and tooling.
pub fn object_created(bucket: &str, key: &str) -> S3EventRecord {
    S3EventRecord {
        event_name: Some("ObjectCreated:Put".to_string()),
        s3: S3Entity {
            bucket: S3Bucket {
                name: Some(bucket.to_string()),
                ..Default::default()
            },
            object: S3Object {
                key: Some(key.to_string()),
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Wraps records into a batch.
pub fn batch(records: Vec<S3EventRecord>) -> S3Event {
    S3Event { records }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTIFICATION: &str = r#"{
        "Records": [
            {
                "eventVersion": "2.1",
                "eventSource": "aws:s3",
                "awsRegion": "eu-west-1",
                "eventTime": "2024-05-17T08:15:30.000Z",
                "eventName": "ObjectCreated:Put",
                "userIdentity": { "principalId": "AWS:AIDAEXAMPLE" },
                "requestParameters": { "sourceIPAddress": "10.0.0.1" },
                "responseElements": {
                    "x-amz-request-id": "C3D13FE58DE4C810",
                    "x-amz-id-2": "FMyUVURIY8/IgAtTv8xRjskZQpcIZ9KG4V5Wp6S7S/JRWeUWerMUE5JgHvANOjpD"
                },
                "s3": {
                    "s3SchemaVersion": "1.0",
                    "configurationId": "uploads-created",
                    "bucket": {
                        "name": "uploads-bucket",
                        "ownerIdentity": { "principalId": "A3NL1KOZZKExample" },
                        "arn": "arn:aws:s3:::uploads-bucket"
                    },
                    "object": {
                        "key": "uploads/invoice.pdf",
                        "size": 1024,
                        "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                        "sequencer": "0055AED6DCD90281E5"
                    }
                }
            }
        ]
    }"#;

    #[test]
    fn deserialises_notification_payload() {
        let event: S3Event = serde_json::from_str(NOTIFICATION).unwrap();
        assert_eq!(event.records.len(), 1);
        let object = event.records[0].object_ref().unwrap();
        assert_eq!(object.bucket, "uploads-bucket");
        assert_eq!(object.key, "uploads/invoice.pdf");
        assert_eq!(object.locator(), "s3://uploads-bucket/uploads/invoice.pdf");
        assert_eq!(object.base_filename(), "invoice");
    }

    #[test]
    fn reserialised_batch_keeps_notification_details() {
        let event: S3Event = serde_json::from_str(NOTIFICATION).unwrap();
        let logged = serde_json::to_value(&event).unwrap();
        let record = &logged["Records"][0];
        assert_eq!(record["eventVersion"], "2.1");
        assert_eq!(record["awsRegion"], "eu-west-1");
        assert!(record["eventTime"].as_str().unwrap().starts_with("2024-05-17T08:15:30"));
        assert_eq!(record["s3"]["bucket"]["arn"], "arn:aws:s3:::uploads-bucket");
        assert_eq!(record["s3"]["object"]["eTag"], "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(record["s3"]["object"]["sequencer"], "0055AED6DCD90281E5");
    }

    #[test]
    fn records_without_bucket_or_key_are_rejected_individually() {
        let mut no_key = object_created("b", "k.pdf");
        no_key.s3.object.key = None;
        let mut empty_bucket = object_created("b", "k.pdf");
        empty_bucket.s3.bucket.name = Some(String::new());
        let mut no_bucket = object_created("b", "k.pdf");
        no_bucket.s3.bucket.name = None;

        assert!(no_key.object_ref().unwrap_err().contains("key"));
        assert!(empty_bucket.object_ref().unwrap_err().contains("bucket"));
        assert!(no_bucket.object_ref().unwrap_err().contains("bucket"));
        assert!(object_created("b", "k.pdf").object_ref().is_ok());
    }
}
