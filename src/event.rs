//! Trigger input model: S3-style object-created event batches.
//!
//! The wire shape mirrors the AWS S3 notification JSON (`Records` array).
//! Only the fields the pipeline needs are deserialized.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct S3EventRecord {
    pub s3: S3Entity,
    #[serde(rename = "eventName", default)]
    pub event_name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct S3Object {
    pub key: String,
}

/// One unit of pipeline work: a raw email object in a source bucket.
///
/// Batch order carries no semantic weight; records are independent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub source_bucket: String,
    pub object_key: String,
}

impl S3Event {
    /// Flatten the wire event into pipeline records.
    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
            .into_iter()
            .map(|record| EventRecord {
                source_bucket: record.s3.bucket.name,
                object_key: record.s3.object.key,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_s3_event() {
        let json = r#"{
            "Records": [
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "incoming-mail" },
                        "object": { "key": "inbox/msg-001.eml" }
                    }
                },
                {
                    "eventName": "ObjectCreated:Put",
                    "s3": {
                        "bucket": { "name": "incoming-mail" },
                        "object": { "key": "root/msg-002.eml" }
                    }
                }
            ]
        }"#;

        let event: S3Event = serde_json::from_str(json).unwrap();
        let records = event.into_records();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_bucket, "incoming-mail");
        assert_eq!(records[0].object_key, "inbox/msg-001.eml");
        assert_eq!(records[1].object_key, "root/msg-002.eml");
    }

    #[test]
    fn test_deserialize_empty_event() {
        let event: S3Event = serde_json::from_str("{}").unwrap();
        assert!(event.into_records().is_empty());
    }
}
