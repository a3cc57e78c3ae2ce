use anyhow::Context;
use tracing::instrument;

#[instrument(skip(client))]
pub async fn copy(
    client: &aws_sdk_s3::Client,
    source_bucket: &str,
    source_key: &str,
    destination_bucket: &str,
    destination_key: &str,
) -> anyhow::Result<()> {
    client
        .copy_object()
        .bucket(destination_bucket)
        .copy_source(copy_source(source_bucket, source_key))
        .key(destination_key)
        .send()
        .await
        .with_context(|| {
            format!(
                "unable to copy {source_bucket}/{source_key} to {destination_bucket}/{destination_key}"
            )
        })?;

    Ok(())
}

/// The `x-amz-copy-source` value for an object.
/// Each key segment is url encoded, the separators are kept.
fn copy_source(bucket: &str, key: &str) -> String {
    let key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("{bucket}/{key}")
}
