use super::SendRequest;
use super::part::CompletedPart;
use super::request::*;
use super::UploadData;
use crate::error::Result;

use futures::future::BoxFuture;

/// Object-safe `SendRequest`.
pub(crate) trait BoxedSendRequest: Send + Sync + 'static {
    fn send_create_upload(&self, req: CreateRequest) -> BoxFuture<'_, Result<UploadData>>;

    fn send_upload_part(&self, req: UploadPartRequest) -> BoxFuture<'_, Result<CompletedPart>>;

    fn send_complete_upload(&self, req: CompleteRequest)
    -> BoxFuture<'_, Result<CompletedUpload>>;

    fn send_abort_upload(&self, req: AbortRequest) -> BoxFuture<'_, Result<()>>;

    fn send_put_object(&self, req: PutRequest) -> BoxFuture<'_, Result<CompletedUpload>>;

    fn send_delete_objects(&self, req: DeleteRequest) -> BoxFuture<'_, Result<()>>;

    fn send_head_object(&self, req: HeadRequest) -> BoxFuture<'_, Result<ObjectHead>>;

    fn send_presign(&self, req: PresignRequest) -> BoxFuture<'_, Result<PresignedUrl>>;
}

/// Implements `BoxedSendRequest` for the public `SendRequest`.
pub(super) struct SendRequestInner<T>(T);

impl<T: SendRequest> SendRequestInner<T> {
    pub(super) fn new(inner: T) -> Self {
        Self(inner)
    }
}

impl<T: SendRequest + 'static> BoxedSendRequest for SendRequestInner<T> {
    fn send_create_upload(&self, req: CreateRequest) -> BoxFuture<'_, Result<UploadData>> {
        Box::pin(self.0.send_create_upload_request(req))
    }

    fn send_upload_part(&self, req: UploadPartRequest) -> BoxFuture<'_, Result<CompletedPart>> {
        Box::pin(self.0.send_new_part_upload_request(req))
    }

    fn send_complete_upload(
        &self,
        req: CompleteRequest,
    ) -> BoxFuture<'_, Result<CompletedUpload>> {
        Box::pin(self.0.send_complete_upload_request(req))
    }

    fn send_abort_upload(&self, req: AbortRequest) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.0.send_abort_upload_request(req))
    }

    fn send_put_object(&self, req: PutRequest) -> BoxFuture<'_, Result<CompletedUpload>> {
        Box::pin(self.0.send_put_object_request(req))
    }

    fn send_delete_objects(&self, req: DeleteRequest) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.0.send_delete_objects_request(req))
    }

    fn send_head_object(&self, req: HeadRequest) -> BoxFuture<'_, Result<ObjectHead>> {
        Box::pin(self.0.send_head_object_request(req))
    }

    fn send_presign(&self, req: PresignRequest) -> BoxFuture<'_, Result<PresignedUrl>> {
        Box::pin(self.0.send_presign_request(req))
    }
}
