//! Issuing pre-signed URLs.
//!
//! A [`UrlSigner`] assembles the parameters of a signed read or write and
//! hands them to the client, which signs locally with its credentials. Expiry
//! is clamped to what the store accepts rather than rejected.
use crate::client::request::{PresignRequest, PresignedUrl};
use crate::client::{ObjectClient, SendRequest as _};
use crate::error::Result;
use crate::plan::ByteRange;
use crate::uri::{Bucket, Key, ObjectUri};
use crate::{AWS_MAX_PRESIGN_EXPIRY, DEFAULT_PRESIGN_EXPIRY};

use std::time::Duration;

pub use crate::client::request::{Operation, ResponseOverrides};

/// Produces pre-signed URLs for objects in one bucket.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    client: ObjectClient,
    bucket: Bucket,
    default_expiry: Duration,
}

impl UrlSigner {
    /// Create a signer for `bucket` with the default expiry of one hour.
    pub fn new<B: Into<Bucket>>(client: ObjectClient, bucket: B) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            default_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }

    /// Set the expiry used when a call does not give one.
    pub fn default_expiry(self, expiry: Duration) -> Self {
        Self {
            default_expiry: clamp_expiry(expiry),
            ..self
        }
    }

    /// The bucket this signer signs for.
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// The expiry used when a call does not give one.
    pub fn get_default_expiry(&self) -> Duration {
        self.default_expiry
    }

    /// Sign `operation` on `key`.
    ///
    /// `content_type` constrains what a write may upload; `overrides` set the
    /// response headers of a read. `expires_in` defaults to the signer's
    /// default and is clamped to at most seven days.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::Signing`] if the key is malformed or the client
    /// cannot sign.
    ///
    /// [`ErrorKind::Signing`]: crate::error::ErrorKind::Signing
    pub async fn sign<K: Into<Key>>(
        &self,
        key: K,
        operation: Operation,
        content_type: Option<&str>,
        expires_in: Option<Duration>,
        overrides: Option<ResponseOverrides>,
    ) -> Result<PresignedUrl> {
        let req = self
            .request(key.into(), operation, expires_in)?
            .content_type(content_type)
            .overrides(overrides.unwrap_or_default());
        self.client.send_presign_request(req).await
    }

    /// Sign a read of `range` of the object at `key`.
    pub async fn sign_range<K: Into<Key>>(
        &self,
        key: K,
        range: &ByteRange,
        expires_in: Option<Duration>,
        overrides: Option<ResponseOverrides>,
    ) -> Result<PresignedUrl> {
        let req = self
            .request(key.into(), Operation::Read, expires_in)?
            .range(Some(range.to_range_header()))
            .overrides(overrides.unwrap_or_default());
        self.client.send_presign_request(req).await
    }

    fn request(
        &self,
        key: Key,
        operation: Operation,
        expires_in: Option<Duration>,
    ) -> Result<PresignRequest> {
        key.validate()?;
        let expiry = expires_in.map_or(self.default_expiry, clamp_expiry);
        let uri = ObjectUri::new(self.bucket.clone(), key);
        trace!(%uri, %operation, expires_in = expiry.as_secs(), "signing url");
        Ok(PresignRequest::new(uri, operation, expiry))
    }
}

fn clamp_expiry(expiry: Duration) -> Duration {
    expiry.clamp(Duration::from_secs(1), AWS_MAX_PRESIGN_EXPIRY)
}
