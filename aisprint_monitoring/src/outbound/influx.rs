use crate::{
    config::InfluxConfig,
    domain::{
        models::{TIMES_MEASUREMENT, TimesPoint},
        ports::TimesRecorder,
    },
};
use anyhow::Context;
use influxdb_client::Point;

/// Writes times into an InfluxDB v2 bucket
#[derive(Debug, Clone)]
pub struct InfluxTimesRecorder {
    client: influxdb_client::Client,
    url: String,
    bucket: String,
}

impl InfluxTimesRecorder {
    /// Connection parameters are not validated, bad values surface when writing
    pub fn new(config: &InfluxConfig) -> Result<Self, influxdb_client::Error> {
        let client = influxdb_client::Client::new(
            &config.url,
            &config.token,
            &config.org,
            config.verify_ssl,
        )?;

        Ok(Self {
            client,
            url: config.url.clone(),
            bucket: config.bucket.clone(),
        })
    }
}

impl TimesRecorder for InfluxTimesRecorder {
    async fn record(&self, point: TimesPoint) -> anyhow::Result<()> {
        tracing::info!(
            "Writing times to InfluxDB ({}) bucket \"{}\"...",
            self.url,
            self.bucket
        );

        self.client
            .write(&self.bucket, &Point::from(&point))
            .await
            .with_context(|| format!("unable to write {} for {}", point.field, point.file_name))
    }
}

impl From<&TimesPoint> for Point {
    fn from(point: &TimesPoint) -> Self {
        Point::new(TIMES_MEASUREMENT)
            .tag("file_name", point.file_name.as_str())
            .tag("service_name", point.service_name.as_str())
            .field(point.field.as_str(), point.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::TimesField;

    #[test]
    fn it_tags_the_point_with_the_file_and_service() {
        let point = TimesPoint {
            file_name: "aisprint-abc123.csv".to_string(),
            service_name: "resize".to_string(),
            field: TimesField::StartTime,
            value: 1700000000.25,
        };

        assert_eq!(
            Point::from(&point).to_line_protocol(),
            "aisprint_times,file_name=aisprint-abc123.csv,service_name=resize start_time=1700000000.25"
        );
    }

    #[test]
    fn end_times_go_to_their_own_field() {
        let point = TimesPoint {
            file_name: "aisprint-abc123.csv".to_string(),
            service_name: String::new(),
            field: TimesField::EndTime,
            value: 1700000100.0,
        };

        assert_eq!(
            Point::from(&point).to_line_protocol(),
            "aisprint_times,file_name=aisprint-abc123.csv end_time=1700000100"
        );
    }

    #[test]
    fn it_accepts_missing_connection_parameters() {
        let recorder = InfluxTimesRecorder::new(&InfluxConfig {
            url: String::new(),
            token: String::new(),
            org: String::new(),
            bucket: String::new(),
            verify_ssl: true,
        });

        assert!(recorder.is_ok());
    }
}
