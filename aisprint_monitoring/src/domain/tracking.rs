//! Tracking names correlate one object across pipeline stages.
//! The name itself carries the identifier, so it survives a plain copy between stores.

use crate::domain::models::{MonitoringErr, PATH_TRIM, StorageConfig, StorageEvent};
use uuid::Uuid;

/// Every tracked object name starts with this prefix
pub const TRACKING_PREFIX: &str = "aisprint-";

/// The name of the event's object relative to the first configured input path.
#[tracing::instrument(err, skip(config), level = "debug")]
pub fn resolve_input_name(
    config: &StorageConfig,
    event: &StorageEvent,
) -> Result<String, MonitoringErr> {
    let input = config.input.first().ok_or(MonitoringErr::NoInput)?;
    let path = input.path.trim_matches(PATH_TRIM);
    // the bucket is not part of the object key
    let prefix = path.split_once('/').map(|(_, prefix)| prefix).unwrap_or("");

    let key = event.object_key.trim_matches(PATH_TRIM);
    if !key.starts_with(prefix) {
        tracing::warn!(key=%key, prefix=%prefix, "object key is outside of the input path");
    }

    Ok(strip_input_prefix(key, prefix))
}

/// Removes one leading `prefix` from `key` when present, then trims slashes and spaces.
pub fn strip_input_prefix(key: &str, prefix: &str) -> String {
    let key = key.trim_matches(PATH_TRIM);
    key.strip_prefix(prefix)
        .unwrap_or(key)
        .trim_matches(PATH_TRIM)
        .to_string()
}

pub fn is_tracked(name: &str) -> bool {
    name.starts_with(TRACKING_PREFIX)
}

/// A fresh tracking name keeping the extension of `name`.
/// Uniqueness relies on uuid v4, no collision check is done.
pub fn mint_tracking_name(name: &str) -> String {
    let extension = name
        .rsplit_once('.')
        .map(|(_, extension)| format!(".{extension}"))
        .unwrap_or_default();
    format!("{TRACKING_PREFIX}{}{extension}", Uuid::new_v4())
}
