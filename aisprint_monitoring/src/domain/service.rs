//! This module defines the service which sequences a monitoring run

use crate::domain::{
    models::{
        CopyTarget, MonitoringErr, MonitoringMode, MonitoringReport, StorageConfig, StorageEvent,
        TimesPoint,
    },
    ports::{MonitoringService, StorageConnector, StorageProvider, TimesRecorder},
    tracking,
};


/// concrete struct which implements [MonitoringService]
pub struct MonitoringImpl<C, R> {
    /// the interface for reaching the storage provider of the event
    connector: C,
    /// the interface for writing times
    recorder: R,
    storage: StorageConfig,
    /// tag value identifying this pipeline stage
    service_name: String,
}

impl<C, R> MonitoringImpl<C, R>
where
    C: StorageConnector,
    R: TimesRecorder,
{
    pub fn new(connector: C, recorder: R, storage: StorageConfig, service_name: String) -> Self {
        MonitoringImpl {
            connector,
            recorder,
            storage,
            service_name,
        }
    }

    /// the name the object is replicated and recorded under
    fn tracking_name(
        &self,
        mode: MonitoringMode,
        event: &StorageEvent,
    ) -> Result<String, MonitoringErr> {
        let name = tracking::resolve_input_name(&self.storage, event)?;
        tracing::info!(name=%name, "processing file");

        if mode == MonitoringMode::Input && !tracking::is_tracked(&name) {
            let name = tracking::mint_tracking_name(&name);
            tracing::info!(name=%name, "generated tracking name");
            return Ok(name);
        }

        Ok(name)
    }

    /// copies the event's object to every output served by the same provider
    #[tracing::instrument(err, skip(self, event), fields(bucket=%event.bucket_name, key=%event.object_key))]
    async fn replicate(
        &self,
        event: &StorageEvent,
        name: &str,
    ) -> Result<Vec<CopyTarget>, MonitoringErr> {
        if self.storage.output.is_empty() {
            tracing::debug!("no output configured");
            return Ok(Vec::new());
        }

        let provider =
            self.connector
                .connect(event)
                .await
                .map_err(|err| MonitoringErr::Connect {
                    provider: event.source,
                    err,
                })?;
        let provider_type = provider.provider_type();

        let mut copies = Vec::new();
        for output in &self.storage.output {
            if !output.matches_provider(provider_type) {
                tracing::debug!(
                    storage_provider=%output.storage_provider,
                    provider_type=%provider_type,
                    "skipping output of another provider"
                );
                continue;
            }

            let destination = output.bucket_path();
            let key = destination.key_for(name);
            provider
                .copy(
                    &event.bucket_name,
                    &event.object_key,
                    destination.bucket,
                    &key,
                )
                .await
                .map_err(|err| MonitoringErr::Replication {
                    source_key: event.object_key.clone(),
                    bucket: destination.bucket.to_string(),
                    key: key.clone(),
                    err,
                })?;

            tracing::info!(
                "File \"{}\" from bucket \"{}\" copied to bucket \"{}\" with key \"{}\"",
                event.object_key,
                event.bucket_name,
                destination.bucket,
                key
            );
            copies.push(CopyTarget {
                bucket: destination.bucket.to_string(),
                key,
            });
        }

        Ok(copies)
    }

    /// writes the single time observation of this run
    #[tracing::instrument(err, skip(self, event))]
    async fn record(
        &self,
        mode: MonitoringMode,
        event: &StorageEvent,
        name: &str,
    ) -> Result<f64, MonitoringErr> {
        let field = mode.field();
        let timestamp = event
            .timestamp()
            .map_err(|err| MonitoringErr::EventTime {
                event_time: event.event_time.clone(),
                err,
            })?;

        self.recorder
            .record(TimesPoint {
                file_name: name.to_string(),
                service_name: self.service_name.clone(),
                field,
                value: timestamp,
            })
            .await
            .map_err(|err| MonitoringErr::Record {
                field,
                file_name: name.to_string(),
                err,
            })?;

        tracing::info!("Value \"{}\" successfully written in field \"{}\"", timestamp, field);
        Ok(timestamp)
    }
}

impl<C, R> MonitoringService for MonitoringImpl<C, R>
where
    C: StorageConnector,
    R: TimesRecorder,
{
    #[tracing::instrument(err, skip(self))]
    async fn run(
        &self,
        mode: MonitoringMode,
        event: &StorageEvent,
    ) -> Result<MonitoringReport, MonitoringErr> {
        let tracking_name = self.tracking_name(mode, event)?;
        let copies = self.replicate(event, &tracking_name).await?;
        let timestamp = self.record(mode, event, &tracking_name).await?;

        Ok(MonitoringReport {
            tracking_name,
            copies,
            field: mode.field(),
            timestamp,
        })
    }
}
