//! This module contains `SendRequest`, which defines the object store
//! operations everything else in the crate is built on.
use self::inner::{BoxedSendRequest, SendRequestInner};
use self::part::CompletedPart;
use self::request::*;
use crate::error::{ErrorRepr, Result};
use crate::uri::ObjectUri;

use std::borrow::Cow;
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

mod inner;
pub mod part;
pub mod request;

mod sdk;
pub use sdk::SdkClient;

/// `SendRequest` represents the atomic operations against the object store.
pub trait SendRequest: Send + Sync {
    /// Send a request to create a new multipart upload, returning an
    /// [`UploadData`] having the upload ID assignment.
    fn send_create_upload_request(
        &self,
        req: CreateRequest,
    ) -> impl Future<Output = Result<UploadData>> + Send;

    /// Send a request to upload a part to a multipart upload, returning the
    /// [`CompletedPart`] containing entity tag and part number, which are
    /// required in the subsequent complete upload request.
    fn send_new_part_upload_request(
        &self,
        req: UploadPartRequest,
    ) -> impl Future<Output = Result<CompletedPart>> + Send;

    /// Send a request to complete a multipart upload, returning a
    /// [`CompletedUpload`], which has the entity tag of the object as well as
    /// the object URI.
    fn send_complete_upload_request(
        &self,
        req: CompleteRequest,
    ) -> impl Future<Output = Result<CompletedUpload>> + Send;

    /// Send a request to abort a multipart upload, discarding any parts that
    /// were uploaded to it.
    fn send_abort_upload_request(
        &self,
        req: AbortRequest,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Send a request to write a whole object in one shot.
    fn send_put_object_request(
        &self,
        req: PutRequest,
    ) -> impl Future<Output = Result<CompletedUpload>> + Send;

    /// Send a request to delete a batch of objects.
    fn send_delete_objects_request(
        &self,
        req: DeleteRequest,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Send a request for the metadata of an object.
    fn send_head_object_request(
        &self,
        req: HeadRequest,
    ) -> impl Future<Output = Result<ObjectHead>> + Send;

    /// Produce a pre-signed URL for the request.
    ///
    /// Signing is a local computation against the client's credentials.
    fn send_presign_request(
        &self,
        req: PresignRequest,
    ) -> impl Future<Output = Result<PresignedUrl>> + Send;
}

impl<D, T> SendRequest for T
where
    D: SendRequest,
    T: Deref<Target = D> + Send + Sync,
{
    async fn send_create_upload_request(&self, req: CreateRequest) -> Result<UploadData> {
        self.deref().send_create_upload_request(req).await
    }

    async fn send_new_part_upload_request(&self, req: UploadPartRequest) -> Result<CompletedPart> {
        self.deref().send_new_part_upload_request(req).await
    }

    async fn send_complete_upload_request(&self, req: CompleteRequest) -> Result<CompletedUpload> {
        self.deref().send_complete_upload_request(req).await
    }

    async fn send_abort_upload_request(&self, req: AbortRequest) -> Result<()> {
        self.deref().send_abort_upload_request(req).await
    }

    async fn send_put_object_request(&self, req: PutRequest) -> Result<CompletedUpload> {
        self.deref().send_put_object_request(req).await
    }

    async fn send_delete_objects_request(&self, req: DeleteRequest) -> Result<()> {
        self.deref().send_delete_objects_request(req).await
    }

    async fn send_head_object_request(&self, req: HeadRequest) -> Result<ObjectHead> {
        self.deref().send_head_object_request(req).await
    }

    async fn send_presign_request(&self, req: PresignRequest) -> Result<PresignedUrl> {
        self.deref().send_presign_request(req).await
    }
}

/// `ObjectClient` holds a type that can implement the interface of
/// [`SendRequest`].
///
/// It is cheap to clone and is what the uploader, signer, and download
/// planner hold on to.
#[derive(Clone)]
pub struct ObjectClient {
    pub(crate) inner: Arc<dyn BoxedSendRequest + Send + Sync>,
}

impl ObjectClient {
    /// Create a new `ObjectClient` from any [`SendRequest`].
    pub fn new<C>(client: C) -> Self
    where
        C: SendRequest + 'static,
    {
        let inner = SendRequestInner::new(client);
        Self {
            inner: Arc::new(inner),
        }
    }
}

impl SendRequest for ObjectClient {
    async fn send_create_upload_request(&self, req: CreateRequest) -> Result<UploadData> {
        self.inner.send_create_upload(req).await
    }

    async fn send_new_part_upload_request(&self, req: UploadPartRequest) -> Result<CompletedPart> {
        self.inner.send_upload_part(req).await
    }

    async fn send_complete_upload_request(&self, req: CompleteRequest) -> Result<CompletedUpload> {
        self.inner.send_complete_upload(req).await
    }

    async fn send_abort_upload_request(&self, req: AbortRequest) -> Result<()> {
        self.inner.send_abort_upload(req).await
    }

    async fn send_put_object_request(&self, req: PutRequest) -> Result<CompletedUpload> {
        self.inner.send_put_object(req).await
    }

    async fn send_delete_objects_request(&self, req: DeleteRequest) -> Result<()> {
        self.inner.send_delete_objects(req).await
    }

    async fn send_head_object_request(&self, req: HeadRequest) -> Result<ObjectHead> {
        self.inner.send_head_object(req).await
    }

    async fn send_presign_request(&self, req: PresignRequest) -> Result<PresignedUrl> {
        self.inner.send_presign(req).await
    }
}

impl Debug for ObjectClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectClient")
            .field("inner", &"SendRequest")
            .finish()
    }
}

/// ID assigned by the object store to a multipart upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct UploadId(Cow<'static, str>);

impl UploadId {
    /// Create a new `UploadId`.
    pub fn new<T: Into<Cow<'static, str>>>(id: T) -> Self {
        Self(id.into())
    }

    pub(crate) fn try_from_opt(value: Option<&str>) -> Result<Self, ErrorRepr> {
        value
            .map(Self::from)
            .ok_or(ErrorRepr::Missing("CreateResponse", "upload_id"))
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for UploadId {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Display for UploadId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for UploadId {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for UploadId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// `UploadData` is an active `UploadId` with the object URI it was created
/// with.
#[derive(Debug, Clone, Default)]
pub struct UploadData {
    /// The ID for the upload assigned by the store.
    pub id: UploadId,
    /// The URI of the object being uploaded.
    pub uri: ObjectUri,
}

impl UploadData {
    /// Create a new value from an upload ID and object URI.
    pub fn new<T: Into<UploadId>>(id: T, uri: ObjectUri) -> Self {
        Self { id: id.into(), uri }
    }

    /// Get an owned upload ID.
    pub fn get_id(&self) -> UploadId {
        self.id.clone()
    }

    /// Get an owned object URI.
    pub fn get_uri(&self) -> ObjectUri {
        self.uri.clone()
    }
}
