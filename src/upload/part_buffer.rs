use crate::client::part::{CompletedPart, CompletedParts};
use crate::client::request::SendUploadPart;
use crate::error::{Error as UploadError, Result};

use futures::stream::FuturesUnordered;
use futures::{Stream, ready};
use multipart_write::MultipartWrite;
use std::fmt::{self, Debug, Formatter};
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::task::{Context, Poll};

/// `MultipartWrite` holding the part uploads of one buffer while they run.
///
/// Requests written to it are polled concurrently. With a capacity, a new
/// request is only accepted once fewer than `capacity` are in flight. The
/// first failed part is the error of the poll that sees it; parts still
/// running are cancelled when the buffer is dropped.
#[must_use = "futures do nothing unless polled"]
#[pin_project::pin_project]
pub struct PartBuffer {
    #[pin]
    in_flight: FuturesUnordered<SendUploadPart>,
    done: CompletedParts,
    capacity: Option<NonZeroUsize>,
}

impl PartBuffer {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            in_flight: FuturesUnordered::new(),
            done: CompletedParts::default(),
            capacity: capacity.and_then(NonZeroUsize::new),
        }
    }

    fn has_room(&self) -> bool {
        self.capacity
            .is_none_or(|n| self.in_flight.len() < n.get())
    }
}

fn finished(done: &mut CompletedParts, part: CompletedPart) {
    trace!(
        id = %part.id,
        part = %part.part_number,
        etag = %part.etag,
        bytes = part.part_size,
        "part uploaded",
    );
    done.push(part);
}

impl MultipartWrite<SendUploadPart> for PartBuffer {
    type Ret = ();
    type Output = CompletedParts;
    type Error = UploadError;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let mut this = self.as_mut().project();
        // Collect whatever has finished without waiting on the rest.
        while let Poll::Ready(Some(res)) = this.in_flight.as_mut().poll_next(cx) {
            finished(this.done, res?);
        }
        if self.has_room() {
            Poll::Ready(Ok(()))
        } else {
            Poll::Pending
        }
    }

    fn start_send(self: Pin<&mut Self>, part: SendUploadPart) -> Result<Self::Ret> {
        self.project().in_flight.push(part);
        Ok(())
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<()>> {
        let mut this = self.project();
        while let Some(res) = ready!(this.in_flight.as_mut().poll_next(cx)) {
            finished(this.done, res?);
        }
        Poll::Ready(Ok(()))
    }

    fn poll_complete(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<Self::Output>> {
        ready!(self.as_mut().poll_flush(cx))?;
        let this = self.project();
        Poll::Ready(Ok(std::mem::take(this.done)))
    }
}

impl Debug for PartBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartBuffer")
            .field("in_flight", &self.in_flight.len())
            .field("done", &self.done.count())
            .field("capacity", &self.capacity)
            .finish()
    }
}
