//! Settings for the media routes.
//!
//! A [`Config`] is built once at startup, from the environment with
//! [`Config::from_env`] or deserialized from a file, and passed to
//! [`MediaService::new`](crate::MediaService::new).
use crate::error::{ErrorRepr, Result};
use crate::uri::Bucket;
use crate::{
    AWS_MAX_PART_COUNT, AWS_MAX_PART_SIZE, AWS_MAX_PRESIGN_EXPIRY, AWS_MIN_PART_SIZE,
    DEFAULT_DOWNLOAD_CHUNK_SIZE, DEFAULT_MAX_ACTIVE_TASKS, DEFAULT_MAX_DOWNLOAD_PARTS,
    DEFAULT_MAX_PARTS, DEFAULT_PRESIGN_EXPIRY,
};

use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Settings for transfers against one media bucket.
///
/// ```rust
/// use media_transfer::Config;
///
/// let config: Config = serde_json::from_str(r#"{"bucket": "media", "maxParts": 50}"#).unwrap();
/// assert_eq!(config.max_parts, 50);
/// assert_eq!(config.min_part_size, 5 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Bucket holding all media.
    pub bucket: Bucket,
    /// Smallest size of a part other than the last, at least 5 MiB.
    pub min_part_size: u64,
    /// Most parts an upload is split into.
    pub max_parts: usize,
    /// Most part uploads in flight at once for one upload.
    pub max_active_tasks: usize,
    /// Lifetime of pre-signed URLs in seconds.
    pub presign_expiry_secs: u64,
    /// Size of a range in a download plan when the caller gives none.
    pub download_chunk_size: u64,
    /// Most ranges a download plan may have.
    pub max_download_parts: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket: Bucket::default(),
            min_part_size: AWS_MIN_PART_SIZE.as_u64(),
            max_parts: DEFAULT_MAX_PARTS,
            max_active_tasks: DEFAULT_MAX_ACTIVE_TASKS,
            presign_expiry_secs: DEFAULT_PRESIGN_EXPIRY.as_secs(),
            download_chunk_size: DEFAULT_DOWNLOAD_CHUNK_SIZE,
            max_download_parts: DEFAULT_MAX_DOWNLOAD_PARTS,
        }
    }
}

impl Config {
    /// Create a configuration for `bucket` with every other setting at its
    /// default.
    pub fn new<B: Into<Bucket>>(bucket: B) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `MEDIA_BUCKET` | required |
    /// | `MEDIA_MIN_PART_BYTES` | `5242880` |
    /// | `MEDIA_MAX_PARTS` | `100` |
    /// | `MEDIA_MAX_ACTIVE_TASKS` | `10` |
    /// | `MEDIA_PRESIGN_EXPIRY_SECS` | `3600` |
    /// | `MEDIA_DOWNLOAD_CHUNK_BYTES` | `10000000` |
    /// | `MEDIA_MAX_DOWNLOAD_PARTS` | `10000` |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from any source of variables named as in
    /// [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bucket = lookup("MEDIA_BUCKET")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ErrorRepr::Config("MEDIA_BUCKET is not set".into()))?;

        let mut config = Self::new(bucket.trim().to_string());
        if let Some(v) = parse(&lookup, "MEDIA_MIN_PART_BYTES")? {
            config.min_part_size = v;
        }
        if let Some(v) = parse(&lookup, "MEDIA_MAX_PARTS")? {
            config.max_parts = v;
        }
        if let Some(v) = parse(&lookup, "MEDIA_MAX_ACTIVE_TASKS")? {
            config.max_active_tasks = v;
        }
        if let Some(v) = parse(&lookup, "MEDIA_PRESIGN_EXPIRY_SECS")? {
            config.presign_expiry_secs = v;
        }
        if let Some(v) = parse(&lookup, "MEDIA_DOWNLOAD_CHUNK_BYTES")? {
            config.download_chunk_size = v;
        }
        if let Some(v) = parse(&lookup, "MEDIA_MAX_DOWNLOAD_PARTS")? {
            config.max_download_parts = v;
        }

        Ok(config.normalized())
    }

    /// Bring every setting inside what the store accepts.
    ///
    /// [`MediaService::new`](crate::MediaService::new) applies this to the
    /// configuration it is given.
    pub fn normalized(self) -> Self {
        Self {
            min_part_size: self
                .min_part_size
                .clamp(AWS_MIN_PART_SIZE.as_u64(), AWS_MAX_PART_SIZE.as_u64()),
            max_parts: self.max_parts.clamp(1, AWS_MAX_PART_COUNT),
            presign_expiry_secs: self
                .presign_expiry_secs
                .clamp(1, AWS_MAX_PRESIGN_EXPIRY.as_secs()),
            download_chunk_size: self.download_chunk_size.max(1),
            max_download_parts: self.max_download_parts.max(1),
            ..self
        }
    }

    /// Lifetime of pre-signed URLs.
    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }
}

fn parse<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|e| ErrorRepr::Config(format!("{name}={raw:?}: {e}")).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn bucket_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_lookup(lookup(&[("MEDIA_BUCKET", "media")])).unwrap();
        assert_eq!(config, Config::new("media"));
        assert_eq!(config.presign_expiry(), Duration::from_secs(3600));
    }

    #[test]
    fn min_part_size_is_clamped() {
        let config = Config::from_lookup(lookup(&[
            ("MEDIA_BUCKET", "media"),
            ("MEDIA_MIN_PART_BYTES", "1024"),
            ("MEDIA_PRESIGN_EXPIRY_SECS", "99999999"),
        ]))
        .unwrap();
        assert_eq!(config.min_part_size, 5 * 1024 * 1024);
        assert_eq!(config.presign_expiry_secs, 604_800);
    }

    #[test]
    fn deserialized_config_is_normalized() {
        let config: Config =
            serde_json::from_str(r#"{"bucket": "media", "minPartSize": 1, "maxParts": 0}"#)
                .unwrap();
        assert_eq!(config.min_part_size, 1);

        let config = config.normalized();
        assert_eq!(config.min_part_size, 5 * 1024 * 1024);
        assert_eq!(config.max_parts, 1);
        assert_eq!(config.max_download_parts, 10_000);
    }

    #[test]
    fn unparseable_value() {
        let err = Config::from_lookup(lookup(&[
            ("MEDIA_BUCKET", "media"),
            ("MEDIA_MAX_PARTS", "lots"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("MEDIA_MAX_PARTS"));
    }
}
