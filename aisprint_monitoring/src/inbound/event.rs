//! Decodes the raw notification the process is triggered with into a [StorageEvent].
//! Both MinIO and Amazon S3 send the S3 notification layout, only the `eventSource` differs.

use crate::domain::models::{ProviderType, StorageEvent};
use serde::Deserialize;
use thiserror::Error;

// see: https://docs.aws.amazon.com/AmazonS3/latest/userguide/notification-content-structure.html
#[derive(Debug, Deserialize)]
struct Notification {
    #[serde(rename = "Records", default)]
    records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Record {
    event_source: Option<String>,
    event_time: Option<String>,
    s3: Option<S3Entity>,
}

#[derive(Debug, Deserialize)]
struct S3Entity {
    bucket: Option<Bucket>,
    object: Option<Object>,
}

#[derive(Debug, Deserialize)]
struct Bucket {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Object {
    key: Option<String>,
}

#[derive(Debug, Error)]
pub enum EventErr {
    #[error("event payload is empty")]
    Empty,
    #[error("unable to parse event payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("event payload has no records")]
    NoRecords,
    #[error("unsupported event source {0:?}")]
    UnsupportedSource(Option<String>),
    #[error("event record is missing {0}")]
    MissingField(&'static str),
    #[error("object key is not valid utf-8: {0}")]
    InvalidKey(#[from] std::string::FromUtf8Error),
}

/// Parses the first record of an object notification
#[tracing::instrument(err, skip(raw))]
pub fn parse_event(raw: &str) -> Result<StorageEvent, EventErr> {
    if raw.trim().is_empty() {
        return Err(EventErr::Empty);
    }

    let notification: Notification = serde_json::from_str(raw)?;
    let record = notification
        .records
        .into_iter()
        .next()
        .ok_or(EventErr::NoRecords)?;

    let source = match record.event_source.as_deref() {
        Some("minio:s3") => Some(ProviderType::Minio),
        Some("aws:s3") => Some(ProviderType::S3),
        _ => None,
    };
    let Some(source) = source else {
        return Err(EventErr::UnsupportedSource(record.event_source));
    };

    let s3 = record.s3.ok_or(EventErr::MissingField("s3"))?;
    let bucket_name = s3
        .bucket
        .and_then(|bucket| bucket.name)
        .ok_or(EventErr::MissingField("s3.bucket.name"))?;
    let key = s3
        .object
        .and_then(|object| object.key)
        .ok_or(EventErr::MissingField("s3.object.key"))?;
    let event_time = record
        .event_time
        .ok_or(EventErr::MissingField("eventTime"))?;

    Ok(StorageEvent {
        bucket_name,
        object_key: decode_key(&key)?,
        event_time,
        source,
    })
}

/// Notification keys are form encoded, `+` stands for a space
fn decode_key(key: &str) -> Result<String, EventErr> {
    Ok(urlencoding::decode(&key.replace('+', " "))?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIO_EVENT: &str = r#"{
        "EventName": "s3:ObjectCreated:Put",
        "Key": "mybucket/incoming/my+photo%281%29.jpg",
        "Records": [{
            "eventVersion": "2.0",
            "eventSource": "minio:s3",
            "awsRegion": "",
            "eventTime": "2023-11-14T22:13:20.250Z",
            "eventName": "s3:ObjectCreated:Put",
            "userIdentity": {"principalId": "minio"},
            "s3": {
                "s3SchemaVersion": "1.0",
                "configurationId": "Config",
                "bucket": {"name": "mybucket", "arn": "arn:aws:s3:::mybucket"},
                "object": {"key": "incoming%2Fmy+photo%281%29.jpg", "size": 1024}
            }
        }]
    }"#;

    #[test]
    fn it_parses_minio_events() {
        let event = parse_event(MINIO_EVENT).unwrap();

        assert_eq!(
            event,
            StorageEvent {
                bucket_name: "mybucket".to_string(),
                object_key: "incoming/my photo(1).jpg".to_string(),
                event_time: "2023-11-14T22:13:20.250Z".to_string(),
                source: ProviderType::Minio,
            }
        );
        assert_eq!(event.timestamp().unwrap(), 1700000000.25);
    }

    #[test]
    fn it_parses_s3_events() {
        let raw = r#"{"Records": [{
            "eventSource": "aws:s3",
            "eventTime": "2023-11-14T22:13:20.000000Z",
            "s3": {"bucket": {"name": "in"}, "object": {"key": "aisprint-abc123.csv"}}
        }]}"#;

        let event = parse_event(raw).unwrap();

        assert_eq!(event.source, ProviderType::S3);
        assert_eq!(event.bucket_name, "in");
        assert_eq!(event.object_key, "aisprint-abc123.csv");
    }

    #[test]
    fn it_rejects_empty_payloads() {
        assert!(matches!(parse_event(""), Err(EventErr::Empty)));
        assert!(matches!(parse_event("  \n"), Err(EventErr::Empty)));
    }

    #[test]
    fn it_rejects_malformed_payloads() {
        assert!(matches!(parse_event("{not json"), Err(EventErr::Json(_))));
        assert!(matches!(parse_event("{}"), Err(EventErr::NoRecords)));
    }

    #[test]
    fn it_rejects_unknown_sources() {
        let raw = r#"{"Records": [{"eventSource": "OneTrigger", "eventTime": "t"}]}"#;
        assert!(matches!(
            parse_event(raw),
            Err(EventErr::UnsupportedSource(Some(source))) if source == "OneTrigger"
        ));
    }

    #[test]
    fn it_requires_the_object_key() {
        let raw = r#"{"Records": [{
            "eventSource": "minio:s3",
            "eventTime": "2023-11-14T22:13:20.000000Z",
            "s3": {"bucket": {"name": "in"}, "object": {}}
        }]}"#;
        assert!(matches!(
            parse_event(raw),
            Err(EventErr::MissingField("s3.object.key"))
        ));
    }
}
