use super::UploadPartRequestBuilder;
use crate::client::part::{CompletedPart, PartBody, PartNumber};
use crate::client::{ObjectClient, UploadData, UploadId};
use crate::AWS_MAX_PART_COUNT;
use crate::error::{Error, ErrorRepr, Result};
use crate::uri::ObjectUri;

use futures::future::BoxFuture;
use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Sending one part of a buffer to an open multipart upload.
pub struct SendUploadPart(pub(crate) BoxFuture<'static, Result<CompletedPart>>);

impl SendUploadPart {
    /// Create a new `SendUploadPart`.
    pub fn new(client: &ObjectClient, req: UploadPartRequest) -> Self {
        let cli = client.clone();
        Self(Box::pin(async move { cli.inner.send_upload_part(req).await }))
    }
}

impl Future for SendUploadPart {
    type Output = Result<CompletedPart>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl Debug for SendUploadPart {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendUploadPart")
            .field(&"Future<Output = Result<CompletedPart>>")
            .finish()
    }
}

/// Request object for uploading a new part.
#[derive(Debug, Clone)]
pub struct UploadPartRequest {
    pub(crate) id: UploadId,
    pub(crate) uri: ObjectUri,
    pub(crate) body: PartBody,
    pub(crate) part_number: PartNumber,
}

impl UploadPartRequest {
    /// Create a new `UploadPartRequest` from the minimum required.
    pub fn new(data: &UploadData, body: PartBody, part_number: PartNumber) -> Self {
        Self {
            id: data.get_id(),
            uri: data.get_uri(),
            body,
            part_number,
        }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: UploadPartRequestBuilder) -> UploadPartRequestBuilder {
        builder
            .upload_id(&*self.id)
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .part_number(*self.part_number)
            .content_length(self.body.size() as i64)
            .body(self.body.as_sdk_body())
    }

    /// Returns a reference to the assigned `UploadId` for this request.
    pub fn id(&self) -> &UploadId {
        &self.id
    }

    /// Returns a reference to the `ObjectUri` for this request.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    /// Returns a reference to the `PartBody` for this request.
    pub fn body(&self) -> &PartBody {
        &self.body
    }

    /// Returns the `PartNumber` for this request.
    pub fn part_number(&self) -> PartNumber {
        self.part_number
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() || self.uri.is_empty() {
            return Err(
                ErrorRepr::Missing("UploadPartRequest", "empty upload id and/or uri").into(),
            );
        }
        let n = *self.part_number;
        if !(1..=AWS_MAX_PART_COUNT as i32).contains(&n) {
            return Err(Error::invalid(
                "part_number",
                format!("{n} is outside 1..={AWS_MAX_PART_COUNT}"),
            ));
        }
        if self.body.size() == 0 {
            return Err(ErrorRepr::Missing("UploadPartRequest", "empty part body").into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn part(n: i32, body: &'static [u8]) -> UploadPartRequest {
        let data = UploadData::new("upload-1", ObjectUri::from(("media", "video/a/clip.mp4")));
        UploadPartRequest::new(&data, PartBody::from(body), PartNumber::new(n))
    }

    #[test]
    fn part_number_range() {
        assert!(part(1, b"abc").validate().is_ok());
        assert!(part(10_000, b"abc").validate().is_ok());

        let err = part(0, b"abc").validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(part(10_001, b"abc").validate().is_err());
    }

    #[test]
    fn empty_part_is_refused() {
        assert!(part(1, b"").validate().is_err());
    }
}
