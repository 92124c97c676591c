use super::part::{CompletedPart, EntityTag};
use super::request::*;
use super::{SendRequest, UploadData, UploadId};
use crate::error::{Error, ErrorKind, ErrorRepr, Result};

use aws_config::{ConfigLoader, SdkConfig};
use aws_sdk_s3 as s3;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::presigning::PresigningConfig;

// S3 answers a failed `If-None-Match` with 412.
const PRECONDITION_FAILED: u16 = 412;

fn precondition_failed<E>(e: &SdkError<E, HttpResponse>) -> bool {
    e.raw_response()
        .is_some_and(|r| r.status().as_u16() == PRECONDITION_FAILED)
}

/// S3 [`Client`] type from the AWS SDK.
///
/// [`Client`]: aws_sdk_s3::Client
#[derive(Debug, Clone)]
pub struct SdkClient<B = DefaultRequestBuilder>(s3::Client, B);

impl SdkClient {
    /// Create a new `SdkClient` from an existing SDK `Client`.
    pub fn new(client: s3::Client) -> Self {
        SdkClient(client, DefaultRequestBuilder)
    }

    /// Create a new `SdkClient` from an [`SdkConfig`].
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        let client = s3::Client::new(config);
        Self::new(client)
    }

    /// Load the SDK configuration with `loader` and create a client from it.
    pub async fn from_config(loader: ConfigLoader) -> Self {
        let config = loader.load().await;
        Self::from_sdk_config(&config)
    }

    /// Create a client from the environment's credentials, region, and
    /// endpoint settings.
    pub async fn from_env() -> Self {
        Self::from_config(aws_config::from_env()).await
    }

    /// Set a request builder for this S3 client.
    pub fn request_builder<B: RequestBuilder>(self, builder: B) -> SdkClient<B> {
        SdkClient(self.0, builder)
    }
}

impl<B: RequestBuilder> SendRequest for SdkClient<B> {
    async fn send_create_upload_request(&self, req: CreateRequest) -> Result<UploadData> {
        req.validate()?;
        let builder = req.with_builder(self.0.create_multipart_upload());
        let request = self.1.with_create_builder(builder);

        let uri = req.uri();
        let id = request
            .send()
            .await
            .map_err(ErrorRepr::from_create_err(uri))
            .and_then(|resp| UploadId::try_from_opt(resp.upload_id()))?;

        Ok(UploadData::new(id, uri.clone()))
    }

    async fn send_new_part_upload_request(&self, req: UploadPartRequest) -> Result<CompletedPart> {
        req.validate()?;
        let part_size = req.body().size();
        let builder = req.with_builder(self.0.upload_part());
        let request = self.1.with_upload_part_builder(builder);

        let id = req.id();
        let part = req.part_number();
        let etag = request
            .send()
            .await
            .map_err(ErrorRepr::from_upload_err(id, req.uri(), part))
            .and_then(|resp| EntityTag::try_from_opt(resp.e_tag(), "UploadPartResponse"))?;

        Ok(CompletedPart::new(id.clone(), etag, part, part_size))
    }

    async fn send_complete_upload_request(&self, req: CompleteRequest) -> Result<CompletedUpload> {
        req.validate()?;
        let builder = req.with_builder(self.0.complete_multipart_upload());
        let request = self.1.with_complete_builder(builder);

        let uri = req.uri();
        let resp = request.send().await.map_err(|e| {
            if req.is_conditional() && precondition_failed(&e) {
                ErrorRepr::Exists(uri.clone())
            } else {
                ErrorRepr::from_complete_err(req.id(), uri, req.completed_parts())(e)
            }
        })?;
        let etag = EntityTag::try_from_opt(resp.e_tag(), "CompleteResponse")?;

        Ok(CompletedUpload::new(uri.clone(), etag).with_location(resp.location()))
    }

    async fn send_abort_upload_request(&self, req: AbortRequest) -> Result<()> {
        req.validate()?;
        let builder = req.with_builder(self.0.abort_multipart_upload());
        let request = self.1.with_abort_builder(builder);

        request
            .send()
            .await
            .map_err(ErrorRepr::from_abort_err(req.id(), req.uri()))?;

        Ok(())
    }

    async fn send_put_object_request(&self, req: PutRequest) -> Result<CompletedUpload> {
        req.validate()?;
        let builder = req.with_builder(self.0.put_object());
        let request = self.1.with_put_builder(builder);

        let uri = req.uri();
        let resp = request.send().await.map_err(|e| {
            if req.is_conditional() && precondition_failed(&e) {
                ErrorRepr::Exists(uri.clone())
            } else {
                ErrorRepr::Put {
                    uri: uri.clone(),
                    source: Box::new(e),
                }
            }
        })?;
        let etag = EntityTag::try_from_opt(resp.e_tag(), "PutResponse")?;

        Ok(CompletedUpload::new(uri.clone(), etag))
    }

    async fn send_delete_objects_request(&self, req: DeleteRequest) -> Result<()> {
        req.validate()?;
        let builder = req.with_builder(self.0.delete_objects())?;
        let request = self.1.with_delete_builder(builder);

        let resp = request.send().await.map_err(|e| ErrorRepr::Delete {
            bucket: req.bucket().to_string(),
            count: req.keys().len(),
            source: Box::new(e),
        })?;

        // Per-key failures come back in a successful response.
        if let Some(err) = resp.errors().first() {
            let msg = format!(
                "{} of {} keys not deleted, first: {} ({})",
                resp.errors().len(),
                req.keys().len(),
                err.key().unwrap_or_default(),
                err.message().unwrap_or_default(),
            );
            return Err(Error::from_kind(ErrorKind::Upstream, msg));
        }

        Ok(())
    }

    async fn send_head_object_request(&self, req: HeadRequest) -> Result<ObjectHead> {
        req.validate()?;
        let builder = req.with_builder(self.0.head_object());
        let request = self.1.with_head_builder(builder);

        let uri = req.uri();
        let resp = request.send().await.map_err(|e| {
            if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                ErrorRepr::NotFound(uri.clone())
            } else {
                ErrorRepr::Head {
                    uri: uri.clone(),
                    source: Box::new(e),
                }
            }
        })?;

        Ok(ObjectHead {
            uri: uri.clone(),
            size: resp.content_length().unwrap_or_default().max(0) as u64,
            content_type: resp.content_type().map(String::from),
            etag: resp.e_tag().map(EntityTag::from),
        })
    }

    async fn send_presign_request(&self, req: PresignRequest) -> Result<PresignedUrl> {
        req.validate()?;
        let uri = req.uri();
        let config = PresigningConfig::expires_in(req.expires_in())
            .map_err(ErrorRepr::from_presign_err(uri))?;

        let presigned = match req.operation() {
            Operation::Read => {
                let builder = req.with_get_builder(self.0.get_object());
                self.1
                    .with_get_builder(builder)
                    .presigned(config)
                    .await
                    .map_err(ErrorRepr::from_presign_err(uri))?
            }
            Operation::Write => {
                let builder = req.with_put_builder(self.0.put_object());
                self.1
                    .with_put_builder(builder)
                    .presigned(config)
                    .await
                    .map_err(ErrorRepr::from_presign_err(uri))?
            }
        };

        Ok(PresignedUrl::new(
            presigned.uri(),
            req.operation(),
            req.expires_in(),
        ))
    }
}
