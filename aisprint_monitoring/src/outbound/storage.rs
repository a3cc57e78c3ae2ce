//! S3 compatible implementations of the storage ports.
//! MinIO and Amazon S3 share the same client, they only differ in how it is configured.

use crate::domain::{
    models::{MinioCredentials, ProviderType, S3Credentials, StorageConfig, StorageEvent},
    ports::{StorageConnector, StorageProvider},
};
use anyhow::Context;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

/// The name reported by credentials read from the storage config
const CREDENTIALS_PROVIDER_NAME: &str = "function-config";

/// Connects to the provider of an event using the credentials of the storage config
#[derive(Debug, Clone)]
pub struct S3StorageConnector {
    storage: StorageConfig,
}

impl S3StorageConnector {
    pub fn new(storage: StorageConfig) -> Self {
        Self { storage }
    }
}

impl StorageConnector for S3StorageConnector {
    type Provider = S3StorageProvider;

    /// The first input rule of the event's provider type decides which credentials are used
    #[tracing::instrument(err, skip(self))]
    async fn connect(&self, event: &StorageEvent) -> anyhow::Result<S3StorageProvider> {
        let input = self
            .storage
            .input
            .iter()
            .find(|rule| rule.provider_type() == Some(event.source))
            .with_context(|| format!("no input is served by the {} provider", event.source))?;
        let provider_id = input.provider_id();

        let client = match event.source {
            ProviderType::Minio => {
                let credentials = self
                    .storage
                    .storage_providers
                    .minio
                    .get(provider_id)
                    .with_context(|| format!("no credentials for minio.{provider_id}"))?;
                minio_client(credentials)
            }
            ProviderType::S3 => {
                let credentials = self
                    .storage
                    .storage_providers
                    .s3
                    .get(provider_id)
                    .cloned()
                    .unwrap_or_default();
                aws_client(&credentials).await
            }
        };

        tracing::trace!(provider_id=%provider_id, "initialized storage client");

        Ok(S3StorageProvider {
            client: s3_client::S3::new(client),
            provider_type: event.source,
        })
    }
}

fn minio_client(credentials: &MinioCredentials) -> aws_sdk_s3::Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .endpoint_url(&credentials.endpoint)
        .region(Region::new(credentials.region.clone()))
        .credentials_provider(Credentials::new(
            &credentials.access_key,
            &credentials.secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ))
        .force_path_style(true)
        .build();
    aws_sdk_s3::Client::from_conf(config)
}

async fn aws_client(credentials: &S3Credentials) -> aws_sdk_s3::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &credentials.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let (Some(access_key), Some(secret_key)) = (&credentials.access_key, &credentials.secret_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    }

    aws_sdk_s3::Client::new(&loader.load().await)
}

/// An authenticated S3 compatible client for one provider
#[derive(Debug, Clone)]
pub struct S3StorageProvider {
    client: s3_client::S3,
    provider_type: ProviderType,
}

impl StorageProvider for S3StorageProvider {
    fn provider_type(&self) -> ProviderType {
        self.provider_type
    }

    async fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> anyhow::Result<()> {
        self.client
            .copy(
                source_bucket,
                source_key,
                destination_bucket,
                destination_key,
            )
            .await
    }
}
