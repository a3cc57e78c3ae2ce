//! This module defines all of the ports that the monitoring domain requires

use crate::domain::models::{
    MonitoringErr, MonitoringMode, MonitoringReport, ProviderType, StorageEvent, TimesPoint,
};

/// An authenticated object store client
#[cfg_attr(test, mockall::automock)]
pub trait StorageProvider: Send + Sync + 'static {
    /// the type of store this provider talks to
    fn provider_type(&self) -> ProviderType;

    /// server side copy of an object, one request per call
    fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Hands out the [StorageProvider] that served a [StorageEvent]
#[cfg_attr(test, mockall::automock(type Provider = MockStorageProvider;))]
pub trait StorageConnector: Send + Sync + 'static {
    type Provider: StorageProvider;

    fn connect(
        &self,
        event: &StorageEvent,
    ) -> impl Future<Output = anyhow::Result<Self::Provider>> + Send;
}

/// Writes [TimesPoint]s into the time-series store
#[cfg_attr(test, mockall::automock)]
pub trait TimesRecorder: Send + Sync + 'static {
    /// resolves once the store acknowledged the write
    fn record(&self, point: TimesPoint) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// The service level interface of a monitoring run
pub trait MonitoringService: Send + Sync + 'static {
    /// track, replicate and record the object of a single event
    fn run(
        &self,
        mode: MonitoringMode,
        event: &StorageEvent,
    ) -> impl Future<Output = Result<MonitoringReport, MonitoringErr>> + Send;
}
