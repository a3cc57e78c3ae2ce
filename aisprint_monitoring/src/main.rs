#![recursion_limit = "256"]

use aisprint_monitoring::{
    config::{Config, ConfigErr},
    domain::{ports::MonitoringService, service::MonitoringImpl},
    inbound::event::parse_event,
    outbound::{influx::InfluxTimesRecorder, storage::S3StorageConnector},
};
use anyhow::Context;
use monitoring_entrypoint::MonitoringEntrypoint;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    MonitoringEntrypoint::default().init();
    tracing::trace!("initiating monitoring");

    let config = match Config::from_env() {
        Ok(config) => config,
        // an unknown mode skips the run
        Err(ConfigErr::Mode(err)) => {
            tracing::error!(error=%err, "The \"MONITORING_MODE\" environment variable must be set as \"input\" or \"output\"");
            return Ok(());
        }
        Err(err) => return Err(err).context("all necessary env vars should be available"),
    };

    tracing::trace!(mode=?config.mode, "initialized config");

    tracing::info!("Parsing event:\n{}", config.event);
    let event = parse_event(&config.event).context("unable to parse event")?;

    let recorder =
        InfluxTimesRecorder::new(&config.influx).context("could not create influxdb client")?;
    let connector = S3StorageConnector::new(config.storage.clone());

    let service = MonitoringImpl::new(connector, recorder, config.storage, config.service_name);

    // boxed, the aws config loader future is too deep to lay out inline
    let report = Box::pin(service.run(config.mode, &event)).await?;

    tracing::info!(
        tracking_name=%report.tracking_name,
        copies=report.copies.len(),
        field=%report.field,
        timestamp=report.timestamp,
        "monitoring complete"
    );

    Ok(())
}
