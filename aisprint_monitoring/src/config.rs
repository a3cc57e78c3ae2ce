use crate::domain::models::{MonitoringMode, StorageConfig, StorageConfigErr, UnknownMode};
use thiserror::Error;

/// The configuration parameters for a monitoring run.
///
/// Everything is pulled from environment variables once, at process start,
/// and handed to the components that need it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Which side of the pipeline stage is monitored
    pub mode: MonitoringMode,

    /// The raw notification that triggered this run
    pub event: String,

    /// The storage rules and provider credentials of the function
    pub storage: StorageConfig,

    /// Where times are written to
    pub influx: InfluxConfig,

    /// Tag value identifying this pipeline stage
    pub service_name: String,
}

/// Connection parameters of the InfluxDB times are written to.
/// Unset values are empty strings, the client reports them when writing.
#[derive(Debug, Clone)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
    pub verify_ssl: bool,
}

#[derive(Debug, Error)]
pub enum ConfigErr {
    #[error("The \"MONITORING_MODE\" environment variable must be set as \"input\" or \"output\": {0}")]
    Mode(#[from] UnknownMode),
    #[error("FUNCTION_CONFIG must be provided")]
    MissingStorageConfig,
    #[error("FUNCTION_CONFIG is invalid: {0}")]
    Storage(#[from] StorageConfigErr),
    #[error("INFLUXDB_SSL_VERIFY must be a boolean value, got \"{0}\"")]
    InvalidSslVerify(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigErr> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from `lookup`, which returns the value of a variable if it is set.
    /// The mode is checked before anything else is read.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigErr>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode: MonitoringMode = lookup("MONITORING_MODE").unwrap_or_default().parse()?;

        let event = lookup("EVENT").unwrap_or_default();

        let storage = lookup("FUNCTION_CONFIG").ok_or(ConfigErr::MissingStorageConfig)?;
        let storage = StorageConfig::from_json(&storage)?;

        let verify_ssl = match lookup("INFLUXDB_SSL_VERIFY") {
            Some(value) => parse_bool(&value).ok_or(ConfigErr::InvalidSslVerify(value))?,
            None => true,
        };

        let influx = InfluxConfig {
            url: lookup("INFLUXDB_URL").unwrap_or_default(),
            token: lookup("INFLUXDB_TOKEN").unwrap_or_default(),
            org: lookup("INFLUXDB_ORG").unwrap_or_default(),
            bucket: lookup("INFLUXDB_BUCKET").unwrap_or_default(),
            verify_ssl,
        };

        Ok(Config {
            mode,
            event,
            storage,
            influx,
            service_name: lookup("SERVICE_NAME").unwrap_or_default(),
        })
    }
}

/// Textual truthy and falsy values
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, collections::HashMap};

    const STORAGE: &str = r#"{
        "input": [{"storage_provider": "minio.default", "path": "mybucket/incoming"}],
        "output": [{"storage_provider": "minio.default", "path": "results"}]
    }"#;

    fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
        vars.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn it_reads_every_variable() {
        let vars = env(&[
            ("MONITORING_MODE", "Input"),
            ("EVENT", "{}"),
            ("FUNCTION_CONFIG", STORAGE),
            ("INFLUXDB_URL", "https://influx.example.com"),
            ("INFLUXDB_TOKEN", "token"),
            ("INFLUXDB_ORG", "aisprint"),
            ("INFLUXDB_BUCKET", "times"),
            ("INFLUXDB_SSL_VERIFY", "False"),
            ("SERVICE_NAME", "resize"),
        ]);

        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.mode, MonitoringMode::Input);
        assert_eq!(config.event, "{}");
        assert_eq!(config.storage.input.len(), 1);
        assert_eq!(config.storage.output.len(), 1);
        assert_eq!(config.influx.url, "https://influx.example.com");
        assert_eq!(config.influx.token, "token");
        assert_eq!(config.influx.org, "aisprint");
        assert_eq!(config.influx.bucket, "times");
        assert!(!config.influx.verify_ssl);
        assert_eq!(config.service_name, "resize");
    }

    #[test]
    fn influx_values_default_to_empty() {
        let vars = env(&[("MONITORING_MODE", "output"), ("FUNCTION_CONFIG", STORAGE)]);

        let config = Config::from_lookup(|name| vars.get(name).cloned()).unwrap();

        assert_eq!(config.mode, MonitoringMode::Output);
        assert_eq!(config.event, "");
        assert_eq!(config.influx.url, "");
        assert!(config.influx.verify_ssl);
        assert_eq!(config.service_name, "");
    }

    #[test]
    fn an_invalid_mode_stops_before_reading_anything_else() {
        for mode in [Some("transform"), Some(""), None] {
            let read = RefCell::new(Vec::new());

            let err = Config::from_lookup(|name| {
                read.borrow_mut().push(name.to_string());
                match name {
                    "MONITORING_MODE" => mode.map(str::to_string),
                    _ => panic!("read {name} with an invalid mode"),
                }
            })
            .unwrap_err();

            assert!(matches!(err, ConfigErr::Mode(_)));
            assert_eq!(*read.borrow(), vec!["MONITORING_MODE".to_string()]);
        }
    }

    #[test]
    fn it_requires_the_storage_config() {
        let vars = env(&[("MONITORING_MODE", "input")]);
        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, ConfigErr::MissingStorageConfig));

        let vars = env(&[
            ("MONITORING_MODE", "input"),
            ("FUNCTION_CONFIG", r#"{"input": []}"#),
        ]);
        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();
        assert!(matches!(err, ConfigErr::Storage(StorageConfigErr::NoInput)));
    }

    #[test]
    fn it_rejects_unknown_ssl_flags() {
        let vars = env(&[
            ("MONITORING_MODE", "input"),
            ("FUNCTION_CONFIG", STORAGE),
            ("INFLUXDB_SSL_VERIFY", "maybe"),
        ]);

        let err = Config::from_lookup(|name| vars.get(name).cloned()).unwrap_err();

        assert!(matches!(err, ConfigErr::InvalidSslVerify(v) if v == "maybe"));
    }

    #[test]
    fn it_parses_truthy_and_falsy_text() {
        for value in ["y", "YES", "t", "True", "on", "1"] {
            assert_eq!(parse_bool(value), Some(true), "{value}");
        }
        for value in ["n", "No", "f", "FALSE", "off", "0"] {
            assert_eq!(parse_bool(value), Some(false), "{value}");
        }
        assert_eq!(parse_bool(""), None);
        assert_eq!(parse_bool("2"), None);
    }
}
