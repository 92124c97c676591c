use super::AbortRequestBuilder;
use crate::client::{ObjectClient, UploadData, UploadId};
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

use futures::future::BoxFuture;
use std::fmt::{self, Debug, Formatter};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Sending a request to abort an in-progress upload.
pub struct SendAbortUpload(pub(crate) BoxFuture<'static, Result<()>>);

impl SendAbortUpload {
    /// Create a new `SendAbortUpload`.
    pub fn new(client: &ObjectClient, req: AbortRequest) -> Self {
        let cli = client.clone();
        Self(Box::pin(
            async move { cli.inner.send_abort_upload(req).await },
        ))
    }
}

impl Future for SendAbortUpload {
    type Output = Result<()>;
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.0.as_mut().poll(cx)
    }
}

impl Debug for SendAbortUpload {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SendAbortUpload")
            .field(&"Future<Output = Result<()>>")
            .finish()
    }
}

/// Request object for aborting a multipart upload.
#[derive(Debug, Clone)]
pub struct AbortRequest {
    pub(crate) id: UploadId,
    pub(crate) uri: ObjectUri,
}

impl AbortRequest {
    /// Create a new `AbortRequest` from the minimum required.
    pub fn new(data: &UploadData) -> Self {
        Self {
            id: data.get_id(),
            uri: data.get_uri(),
        }
    }

    /// Set the required properties on the SDK request builder for the operation.
    pub fn with_builder(&self, builder: AbortRequestBuilder) -> AbortRequestBuilder {
        builder
            .bucket(&*self.uri.bucket)
            .key(&*self.uri.key)
            .upload_id(&*self.id)
    }

    /// Returns a reference to the `UploadId` being aborted.
    pub fn id(&self) -> &UploadId {
        &self.id
    }

    /// Returns a reference to the `ObjectUri` for this request.
    pub fn uri(&self) -> &ObjectUri {
        &self.uri
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.id.is_empty() || self.uri.is_empty() {
            return Err(ErrorRepr::Missing("AbortRequest", "empty upload id and/or uri").into());
        }
        Ok(())
    }
}
