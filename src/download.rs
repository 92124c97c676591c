//! Planning ranged, parallel downloads.
//!
//! The planner does not move any bytes. It cuts the object into fixed-size
//! ranges and signs one read per range; the caller fetches the ranges
//! itself, in whatever order and with whatever parallelism it likes.
use crate::client::request::{HeadRequest, ObjectHead};
use crate::client::{ObjectClient, SendRequest as _};
use crate::error::{Error, Result};
use crate::plan::PartPlan;
use crate::presign::{ResponseOverrides, UrlSigner};
use crate::uri::{Key, ObjectUri};

use futures::future::try_join_all;
use serde::Serialize;

/// One range of a [`DownloadPlan`], with `end_byte` inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPart {
    /// Position of the range, starting at 1.
    pub part_number: i32,
    /// First byte of the range.
    pub start_byte: u64,
    /// Last byte of the range.
    pub end_byte: u64,
    /// Read-signed URL scoped to the range.
    pub url: String,
}

/// Signed ranges covering an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadPlan {
    /// Key of the object.
    pub key: Key,
    /// Object size in bytes.
    pub total_size: u64,
    /// Size of every range but the last.
    pub chunk_size: u64,
    /// Stored content type, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Ranges in ascending order.
    pub parts: Vec<DownloadPart>,
}

impl DownloadPlan {
    /// Number of ranges in the plan.
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }
}

/// Builds [`DownloadPlan`]s for objects in the signer's bucket.
#[derive(Debug, Clone)]
pub struct DownloadPlanner {
    client: ObjectClient,
    signer: UrlSigner,
    max_parts: Option<usize>,
}

impl DownloadPlanner {
    /// Create a planner signing with `signer`.
    ///
    /// The number of ranges in a plan is not limited.
    pub fn new(client: ObjectClient, signer: UrlSigner) -> Self {
        Self {
            client,
            signer,
            max_parts: None,
        }
    }

    /// Refuse plans that would have more than `limit` ranges.
    ///
    /// Such a plan fails with a `Validation` error before anything is signed.
    pub fn max_parts(self, limit: usize) -> Self {
        Self {
            max_parts: Some(limit.max(1)),
            ..self
        }
    }

    /// Plan a download of `total_size` bytes of `key` in `chunk_size` ranges.
    ///
    /// Every range gets its own read-signed URL carrying the `Range` header and
    /// `overrides`.
    pub async fn plan<K: Into<Key>>(
        &self,
        key: K,
        total_size: u64,
        chunk_size: u64,
        overrides: Option<ResponseOverrides>,
    ) -> Result<DownloadPlan> {
        if chunk_size == 0 {
            return Err(Error::invalid("chunk_size", "must be positive"));
        }
        let key = key.into();
        let ranges = PartPlan::fixed(total_size, chunk_size);
        if let Some(max) = self.max_parts.filter(|max| ranges.num_parts() > *max) {
            return Err(Error::invalid(
                "chunk_size",
                format!(
                    "{chunk_size} bytes gives {} ranges, more than {max}",
                    ranges.num_parts()
                ),
            ));
        }
        debug!(%key, total_size, chunk_size, parts = ranges.num_parts(), "planning download");

        let signed = ranges.iter().map(|range| {
            let key = key.clone();
            let overrides = overrides.clone();
            async move {
                let url = self.signer.sign_range(key, range, None, overrides).await?;
                Ok::<_, Error>(DownloadPart {
                    part_number: *range.part_number,
                    start_byte: range.start,
                    end_byte: range.last_byte(),
                    url: url.url,
                })
            }
        });
        let parts = try_join_all(signed).await?;

        Ok(DownloadPlan {
            key,
            total_size,
            chunk_size,
            content_type: overrides.and_then(|o| o.content_type),
            parts,
        })
    }

    /// Plan a download of the whole object at `key`, reading its size and
    /// content type from the store first.
    ///
    /// The URLs serve the object as an attachment named `file_name`, or the
    /// last segment of the key.
    ///
    /// # Errors
    ///
    /// Fails with [`ErrorKind::NotFound`] if there is no object at `key`.
    ///
    /// [`ErrorKind::NotFound`]: crate::error::ErrorKind::NotFound
    pub async fn plan_object<K: Into<Key>>(
        &self,
        key: K,
        chunk_size: u64,
        file_name: Option<&str>,
    ) -> Result<DownloadPlan> {
        let key = key.into();
        let head = self.head(&key).await?;
        let name = file_name.unwrap_or_else(|| key.file_name());
        let overrides = ResponseOverrides::attachment(name, head.content_type.clone());
        self.plan(key.clone(), head.size, chunk_size, Some(overrides))
            .await
    }

    async fn head(&self, key: &Key) -> Result<ObjectHead> {
        let uri = ObjectUri::new(self.signer.bucket().clone(), key.clone());
        self.client.send_head_object_request(HeadRequest::new(uri)).await
    }
}
