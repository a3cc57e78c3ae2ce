use chrono::NaiveDateTime;
use serde::Deserialize;
use std::{collections::HashMap, fmt::Display, str::FromStr};
use thiserror::Error;

/// The measurement every [TimesPoint] is written to
pub const TIMES_MEASUREMENT: &str = "aisprint_times";

/// The format of [StorageEvent::event_time]
const EVENT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Characters trimmed around storage paths and object keys
pub(crate) const PATH_TRIM: &[char] = &[' ', '/'];

/// Which side of a pipeline stage this process is monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitoringMode {
    /// The object just entered the pipeline, untracked objects get a tracking name
    Input,
    /// The object is leaving the pipeline and was tracked upstream
    Output,
}

impl MonitoringMode {
    /// the field this mode records its time into
    pub fn field(self) -> TimesField {
        match self {
            MonitoringMode::Input => TimesField::StartTime,
            MonitoringMode::Output => TimesField::EndTime,
        }
    }
}

/// Represents a value which cannot be converted into a [MonitoringMode]
#[derive(Debug, Error)]
#[error("\"{0}\" is not a monitoring mode, expected \"input\" or \"output\"")]
pub struct UnknownMode(pub String);

impl FromStr for MonitoringMode {
    type Err = UnknownMode;

    fn from_str(mode: &str) -> Result<Self, UnknownMode> {
        match mode.to_lowercase().as_str() {
            "input" => Ok(MonitoringMode::Input),
            "output" => Ok(MonitoringMode::Output),
            _ => Err(UnknownMode(mode.to_string())),
        }
    }
}

/// The field of [TIMES_MEASUREMENT] a time is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimesField {
    StartTime,
    EndTime,
}

impl TimesField {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesField::StartTime => "start_time",
            TimesField::EndTime => "end_time",
        }
    }
}

impl Display for TimesField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of object store a storage provider talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderType {
    Minio,
    S3,
}

impl ProviderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderType::Minio => "minio",
            ProviderType::S3 => "s3",
        }
    }
}

impl Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown storage provider type \"{0}\"")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderType {
    type Err = UnknownProvider;

    fn from_str(provider: &str) -> Result<Self, UnknownProvider> {
        match provider.to_lowercase().as_str() {
            "minio" => Ok(ProviderType::Minio),
            "s3" => Ok(ProviderType::S3),
            _ => Err(UnknownProvider(provider.to_string())),
        }
    }
}

/// The normalized object created notification a run is triggered by
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub bucket_name: String,
    /// the decoded key of the object inside [StorageEvent::bucket_name]
    pub object_key: String,
    /// `YYYY-MM-DDTHH:MM:SS.ffffffZ`, always UTC
    pub event_time: String,
    /// the provider which emitted the event
    pub source: ProviderType,
}

impl StorageEvent {
    /// [StorageEvent::event_time] as fractional unix epoch seconds
    pub fn timestamp(&self) -> Result<f64, chrono::ParseError> {
        let time = NaiveDateTime::parse_from_str(&self.event_time, EVENT_TIME_FORMAT)?.and_utc();
        Ok(time.timestamp_micros() as f64 / 1_000_000.0)
    }
}

/// One `input` or `output` entry of the storage configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageRule {
    /// `bucket[/prefix]`
    pub path: String,
    /// `<provider type>[.<provider id>]`, e.g. `minio.default`
    pub storage_provider: String,
}

impl StorageRule {
    /// the provider type token of [StorageRule::storage_provider]
    pub fn provider_type(&self) -> Option<ProviderType> {
        let (token, _) = self.split_provider();
        token.parse().ok()
    }

    /// the provider id of [StorageRule::storage_provider], `default` when omitted
    pub fn provider_id(&self) -> &str {
        self.split_provider().1
    }

    /// Only the bare provider type or its `.default` provider match.
    pub fn matches_provider(&self, provider: ProviderType) -> bool {
        let declared = self.storage_provider.to_lowercase();
        declared == provider.as_str() || declared == format!("{}.default", provider.as_str())
    }

    pub fn bucket_path(&self) -> BucketPath<'_> {
        BucketPath::parse(&self.path)
    }

    fn split_provider(&self) -> (&str, &str) {
        self.storage_provider
            .split_once('.')
            .unwrap_or((self.storage_provider.as_str(), "default"))
    }
}

/// A storage path split into its bucket and the optional prefix inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketPath<'a> {
    pub bucket: &'a str,
    pub prefix: Option<&'a str>,
}

impl<'a> BucketPath<'a> {
    pub fn parse(path: &'a str) -> Self {
        match path.split_once('/') {
            Some((bucket, prefix)) => {
                let prefix = prefix.trim_matches(PATH_TRIM);
                BucketPath {
                    bucket,
                    prefix: (!prefix.is_empty()).then_some(prefix),
                }
            }
            None => BucketPath {
                bucket: path,
                prefix: None,
            },
        }
    }

    /// the key `name` is stored under inside this path
    pub fn key_for(&self, name: &str) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}/{name}"),
            None => name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MinioCredentials {
    pub endpoint: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub access_key: String,
    pub secret_key: String,
}

/// Missing values fall back to the ambient aws configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct S3Credentials {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub region: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

/// The credentials of every configured provider keyed by provider id
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StorageProviders {
    #[serde(default)]
    pub minio: HashMap<String, MinioCredentials>,
    #[serde(default)]
    pub s3: HashMap<String, S3Credentials>,
}

#[derive(Debug, Error)]
pub enum StorageConfigErr {
    #[error("unable to parse storage config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage config requires at least one input")]
    NoInput,
}

/// The storage rules of the function the process runs in
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    pub input: Vec<StorageRule>,
    #[serde(default)]
    pub output: Vec<StorageRule>,
    #[serde(default)]
    pub storage_providers: StorageProviders,
}

impl StorageConfig {
    /// Parses the config, guaranteeing at least one input rule
    pub fn from_json(raw: &str) -> Result<Self, StorageConfigErr> {
        let config: StorageConfig = serde_json::from_str(raw)?;
        if config.input.is_empty() {
            return Err(StorageConfigErr::NoInput);
        }
        Ok(config)
    }
}

/// The single observation written per run
#[derive(Debug, Clone, PartialEq)]
pub struct TimesPoint {
    pub file_name: String,
    pub service_name: String,
    pub field: TimesField,
    /// unix epoch seconds
    pub value: f64,
}

/// A location an object was copied to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyTarget {
    pub bucket: String,
    pub key: String,
}

/// The outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoringReport {
    pub tracking_name: String,
    pub copies: Vec<CopyTarget>,
    pub field: TimesField,
    pub timestamp: f64,
}

/// The error produced by a run, named after the step that failed.
/// Steps are not rolled back: a [MonitoringErr::Record] means the copies already happened.
#[derive(Debug, Error)]
pub enum MonitoringErr {
    #[error("storage config has no input rule")]
    NoInput,
    #[error("unable to connect to the {provider} storage provider: {err:#}")]
    Connect {
        provider: ProviderType,
        err: anyhow::Error,
    },
    #[error("unable to replicate {source_key} to {bucket}/{key}: {err:#}")]
    Replication {
        source_key: String,
        bucket: String,
        key: String,
        err: anyhow::Error,
    },
    #[error("invalid event time \"{event_time}\": {err}")]
    EventTime {
        event_time: String,
        err: chrono::ParseError,
    },
    #[error("unable to record {field} for {file_name}: {err:#}")]
    Record {
        field: TimesField,
        file_name: String,
        err: anyhow::Error,
    },
}
