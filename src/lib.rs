#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

//! # Description
//!
//! Object storage transfers for the media routes of a social media backend,
//! built on the official AWS [SDK] for Rust.
//!
//! The crate covers moving media in and out of S3:
//!
//! * [`Uploader`] splits a buffer into parts, uploads them concurrently as one
//!   multipart upload, and completes it, aborting on any failure.
//! * [`UrlSigner`] issues pre-signed read and write URLs so clients can move
//!   bytes without going through the service.
//! * [`DownloadPlanner`] cuts an object into byte ranges and signs a read for
//!   each, for parallel ranged downloads.
//! * [`MediaService`] wraps the above as JSON-in, JSON-out route handlers that
//!   always answer with an [`ApiResponse`].
//!
//! # Examples
//!
//! ```rust,no_run
//! # async fn f() -> media_transfer::error::Result<()> {
//! use media_transfer::{ByteSize, SdkClient, UploadBuilder};
//! use bytes::Bytes;
//!
//! let client = SdkClient::from_env().await;
//!
//! /// Parts are at least 5 MiB and there are at most 100 of them.
//! let uploader = UploadBuilder::new(client)
//!     .min_part_size(ByteSize::mib(5))
//!     .max_active_tasks(8)
//!     .build();
//!
//! let body = Bytes::from(vec![0u8; 12 * 1024 * 1024]);
//! let res = uploader
//!     .upload(("a-bucket-us-east-1", "video/clip.mp4"), body, Some("video/mp4"))
//!     .await?;
//! println!("created {} with entity tag {}", res.uri, res.etag);
//! #     Ok(())
//! # }
//! ```
//!
//! [SDK]: https://awslabs.github.io/aws-sdk-rust/
use std::time::Duration;

#[doc(hidden)]
pub extern crate aws_config;
#[doc(hidden)]
pub extern crate aws_sdk_s3 as aws_sdk;

pub use bytesize::ByteSize;

#[macro_use]
mod trace;

mod client;
pub use client::{ObjectClient, SdkClient, SendRequest};

pub mod config;
#[doc(inline)]
pub use config::Config;

pub mod download;
#[doc(inline)]
pub use download::{DownloadPlan, DownloadPlanner};

pub mod error;

pub mod media;
#[doc(inline)]
pub use media::{MediaKind, MediaService};

pub mod plan;
#[doc(inline)]
pub use plan::PartPlan;

pub mod presign;
#[doc(inline)]
pub use presign::UrlSigner;

pub mod response;
#[doc(inline)]
pub use response::ApiResponse;

pub mod upload;
#[doc(inline)]
pub use upload::Uploader;

pub mod request {
    //! Request interface of the object store.
    //!
    //! This module contains the trait [`RequestBuilder`] for customizing the
    //! request object sent for an operation, futures that represent sending
    //! the request, and types appearing in request or response objects.
    pub use super::client::part::*;
    pub use super::client::request::*;
    pub use super::client::request::{DefaultRequestBuilder, RequestBuilder};
    pub use super::client::{UploadData, UploadId};
}

pub mod uri;
#[doc(inline)]
pub use uri::ObjectUri;

// https://docs.aws.amazon.com/AmazonS3/latest/userguide/qfacts.html
const AWS_MIN_PART_SIZE: ByteSize = ByteSize::mib(5);
const AWS_MAX_PART_SIZE: ByteSize = ByteSize::gib(5);
const AWS_MAX_PART_COUNT: usize = 10_000;
// https://docs.aws.amazon.com/AmazonS3/latest/userguide/using-presigned-url.html
const AWS_MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Default cap on the number of parts in an upload.
pub const DEFAULT_MAX_PARTS: usize = 100;
/// Default lifetime of a pre-signed URL.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(3600);
/// Default size of a range in a download plan.
pub const DEFAULT_DOWNLOAD_CHUNK_SIZE: u64 = 10_000_000;
/// Default cap on the number of ranges in a download plan served by
/// [`MediaService`].
pub const DEFAULT_MAX_DOWNLOAD_PARTS: usize = 10_000;

const DEFAULT_MAX_ACTIVE_TASKS: usize = 10;

/// Configures and builds an [`Uploader`].
#[derive(Debug)]
#[non_exhaustive]
pub struct UploadBuilder {
    client: ObjectClient,
    min_part_size: ByteSize,
    max_parts: usize,
    max_tasks: Option<usize>,
    overwrite: bool,
}

impl UploadBuilder {
    /// Create a `UploadBuilder` from a [`SendRequest`] client.
    pub fn new<C>(client: C) -> Self
    where
        C: SendRequest + 'static,
    {
        Self::from_object_client(ObjectClient::new(client))
    }

    /// Create a `UploadBuilder` sharing an existing [`ObjectClient`].
    pub fn from_object_client(client: ObjectClient) -> Self {
        Self {
            client,
            min_part_size: AWS_MIN_PART_SIZE,
            max_parts: DEFAULT_MAX_PARTS,
            max_tasks: Some(DEFAULT_MAX_ACTIVE_TASKS),
            overwrite: true,
        }
    }

    /// Set the smallest size a part other than the last may have.
    ///
    /// Capped at the S3 maximum part size of 5 GiB. S3 rejects parts other
    /// than the last that are under 5 MiB, but smaller values are accepted
    /// here for stores that allow them.
    pub fn min_part_size(self, limit: ByteSize) -> Self {
        Self {
            min_part_size: limit.min(AWS_MAX_PART_SIZE),
            ..self
        }
    }

    /// Set the most parts an upload is split into.
    pub fn max_parts(self, limit: usize) -> Self {
        Self {
            max_parts: limit.clamp(1, AWS_MAX_PART_COUNT),
            ..self
        }
    }

    /// Set the maximum number of active request futures allowed at one time.
    ///
    /// A limit of 0 removes the bound.
    pub fn max_active_tasks(self, limit: usize) -> Self {
        Self {
            max_tasks: Some(limit).filter(|n| *n > 0),
            ..self
        }
    }

    /// Set whether an upload may replace an object already at its key.
    ///
    /// When it may not, the write is conditional on the key being free and an
    /// upload that finds it taken fails with a `Conflict` error. Defaults to
    /// `true`.
    pub fn overwrite(self, overwrite: bool) -> Self {
        Self { overwrite, ..self }
    }

    /// Build an [`Uploader`] from this configuration.
    pub fn build(self) -> Uploader {
        Uploader {
            client: self.client,
            min_part_size: self.min_part_size.as_u64(),
            max_parts: self.max_parts,
            max_tasks: self.max_tasks,
            overwrite: self.overwrite,
        }
    }
}
