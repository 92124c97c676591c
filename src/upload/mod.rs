//! Uploading a whole in-memory buffer as one object.
//!
//! [`Uploader::upload`] plans the buffer into parts, opens a multipart upload,
//! sends every part concurrently through a [`PartBuffer`], and completes the
//! upload with the manifest sorted by part number. If any part or the complete
//! request fails, the upload is aborted before the original error is returned,
//! so no object appears at the destination and no parts are left behind.
use crate::client::part::{CompletedParts, PartBody};
use crate::client::request::*;
use crate::client::{ObjectClient, SendRequest as _, UploadData};
use crate::error::Result;
use crate::plan::PartPlan;
use crate::uri::ObjectUri;

use bytes::Bytes;
use futures::future::poll_fn;
use multipart_write::MultipartWrite;
use std::pin::Pin;

mod part_buffer;
pub use part_buffer::PartBuffer;

mod session;
pub use session::{SessionState, UploadSession};

/// Uploads buffers to the object store, as multipart uploads when non-empty.
///
/// Built with [`UploadBuilder`](crate::UploadBuilder).
#[derive(Debug, Clone)]
pub struct Uploader {
    pub(crate) client: ObjectClient,
    pub(crate) min_part_size: u64,
    pub(crate) max_parts: usize,
    pub(crate) max_tasks: Option<usize>,
    pub(crate) overwrite: bool,
}

impl Uploader {
    /// The plan [`upload`](Self::upload) would use for `total_bytes`.
    pub fn plan(&self, total_bytes: u64) -> PartPlan {
        PartPlan::with_max_parts(total_bytes, self.min_part_size, self.max_parts)
    }

    /// Upload `body` to `uri`.
    ///
    /// An empty body is written with a single put. Otherwise a multipart
    /// upload is created, and any failure after that point aborts it. Without
    /// overwrite, an object already at `uri` fails the upload with a
    /// `Conflict` error.
    pub async fn upload<U>(
        &self,
        uri: U,
        body: Bytes,
        content_type: Option<&str>,
    ) -> Result<CompletedUpload>
    where
        U: Into<ObjectUri>,
    {
        let uri = uri.into();
        let plan = self.plan(body.len() as u64);

        if plan.is_empty() {
            debug!(%uri, "empty body, sending single put");
            let req = PutRequest::new(uri, PartBody::from(body)).content_type(content_type);
            let req = if self.overwrite { req } else { req.if_absent() };
            return self.client.send_put_object_request(req).await;
        }

        let req = CreateRequest::new(uri).content_type(content_type);
        let data = SendCreateUpload::new(&self.client, req).await?;
        debug!(
            id = %data.id,
            uri = %data.uri,
            parts = plan.num_parts(),
            part_size = plan.part_size(),
            "started upload",
        );

        let mut session = UploadSession::new(data, plan);
        match self.drive(&mut session, &body).await {
            Ok(completed) => {
                debug!(id = %session.id(), etag = %completed.etag, "completed upload");
                Ok(completed)
            }
            Err(e) => {
                trace!(id = %session.id(), state = %session.state(), error = %e, "upload failed");
                self.abort(&mut session).await;
                Err(e)
            }
        }
    }

    async fn drive(&self, session: &mut UploadSession, body: &Bytes) -> Result<CompletedUpload> {
        let parts = self.send_parts(session.data(), session.plan(), body).await?;
        session.record(parts)?;

        trace!(
            id = %session.id(),
            parts = ?session.manifest().part_numbers(),
            "completing upload",
        );
        let req = CompleteRequest::new(session.data(), session.manifest().clone());
        let req = if self.overwrite { req } else { req.if_absent() };
        let completed = SendCompleteUpload::new(&self.client, req).await?;
        session.set_completed();

        Ok(completed)
    }

    /// Send one part per range, all in flight at once up to `max_tasks`.
    ///
    /// Returning early drops the buffer and with it any request still pending.
    async fn send_parts(
        &self,
        data: &UploadData,
        plan: &PartPlan,
        body: &Bytes,
    ) -> Result<CompletedParts> {
        let mut buf = PartBuffer::new(self.max_tasks);

        for range in plan {
            poll_fn(|cx| Pin::new(&mut buf).poll_ready(cx)).await?;

            let part = PartBody::from(body.slice(range.as_usize()));
            let req = UploadPartRequest::new(data, part, range.part_number);
            trace!(id = %data.id, %range, "part upload initiated");
            Pin::new(&mut buf).start_send(SendUploadPart::new(&self.client, req))?;
        }

        poll_fn(|cx| Pin::new(&mut buf).poll_complete(cx)).await
    }

    /// Best-effort abort. A failure here is logged and otherwise ignored so
    /// that the caller sees the error that caused the abort.
    async fn abort(&self, session: &mut UploadSession) {
        let req = AbortRequest::new(session.data());
        match SendAbortUpload::new(&self.client, req).await {
            Ok(()) => debug!(id = %session.id(), uri = %session.uri(), "aborted upload"),
            Err(e) => warn!(
                id = %session.id(),
                uri = %session.uri(),
                error = %e,
                "failed to abort upload",
            ),
        }
        session.set_aborted();
    }
}
