mod copy;

#[derive(Clone, Debug)]
pub struct S3 {
    inner: aws_sdk_s3::Client,
}

impl S3 {
    pub fn new(inner: aws_sdk_s3::Client) -> Self {
        Self { inner }
    }

    /// Copies an object to another bucket and key.
    /// The copy happens server side, the object body never passes through this process.
    #[tracing::instrument(skip(self))]
    pub async fn copy(
        &self,
        source_bucket: &str,
        source_key: &str,
        destination_bucket: &str,
        destination_key: &str,
    ) -> anyhow::Result<()> {
        copy::copy(
            &self.inner,
            source_bucket,
            source_key,
            destination_bucket,
            destination_key,
        )
        .await
    }
}
