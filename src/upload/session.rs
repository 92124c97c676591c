use crate::client::part::{CompletedParts, PartNumber};
use crate::client::{UploadData, UploadId};
use crate::error::{ErrorRepr, Result};
use crate::plan::PartPlan;
use crate::uri::ObjectUri;

use std::fmt::{self, Display, Formatter};

/// Where an [`UploadSession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The upload was created and parts are being sent.
    Open,
    /// Every planned part was uploaded exactly once.
    PartsUploaded,
    /// The complete request succeeded; the object is readable.
    Completed,
    /// The upload was aborted, or an abort was attempted.
    Aborted,
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::PartsUploaded => write!(f, "parts_uploaded"),
            Self::Completed => write!(f, "completed"),
            Self::Aborted => write!(f, "aborted"),
        }
    }
}

/// One in-progress multipart upload.
///
/// Owned by a single call to [`Uploader::upload`] and never shared.
///
/// [`Uploader::upload`]: super::Uploader::upload
#[derive(Debug)]
pub struct UploadSession {
    data: UploadData,
    plan: PartPlan,
    completed: CompletedParts,
    state: SessionState,
}

impl UploadSession {
    pub(crate) fn new(data: UploadData, plan: PartPlan) -> Self {
        Self {
            data,
            plan,
            completed: CompletedParts::default(),
            state: SessionState::Open,
        }
    }

    /// The upload ID the store assigned.
    pub fn id(&self) -> &UploadId {
        &self.data.id
    }

    /// Destination of the upload.
    pub fn uri(&self) -> &ObjectUri {
        &self.data.uri
    }

    /// The upload ID and destination together.
    pub fn data(&self) -> &UploadData {
        &self.data
    }

    /// The plan the parts are cut from.
    pub fn plan(&self) -> &PartPlan {
        &self.plan
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The parts recorded so far, sorted by part number once all are in.
    pub fn manifest(&self) -> &CompletedParts {
        &self.completed
    }

    /// Record the parts returned by the part uploads.
    ///
    /// The parts must cover the plan exactly: one entry per planned part
    /// number, each the size of its range. On success the manifest is sorted
    /// and the session moves to `PartsUploaded`.
    pub(crate) fn record(&mut self, mut parts: CompletedParts) -> Result<()> {
        parts.sort_ascending();
        self.check_manifest(&parts)?;
        self.completed = parts;
        self.state = SessionState::PartsUploaded;
        Ok(())
    }

    pub(crate) fn set_completed(&mut self) {
        self.state = SessionState::Completed;
    }

    pub(crate) fn set_aborted(&mut self) {
        self.state = SessionState::Aborted;
    }

    fn check_manifest(&self, parts: &CompletedParts) -> Result<()> {
        if parts.count() != self.plan.num_parts() {
            return Err(self.manifest_err(format!(
                "expected {} parts, got {}",
                self.plan.num_parts(),
                parts.count()
            )));
        }
        for (i, part) in parts.iter().enumerate() {
            let expected = PartNumber::from_index(i);
            if part.part_number != expected {
                return Err(self.manifest_err(format!(
                    "expected {expected} at position {i}, got {}",
                    part.part_number
                )));
            }
            if part.id != self.data.id {
                return Err(self.manifest_err(format!(
                    "{} belongs to upload {}",
                    part.part_number, part.id
                )));
            }
            let range = &self.plan.ranges()[i];
            if part.part_size as u64 != range.len() {
                return Err(self.manifest_err(format!(
                    "{} has {} bytes, planned {}",
                    part.part_number,
                    part.part_size,
                    range.len()
                )));
            }
        }
        Ok(())
    }

    fn manifest_err(&self, msg: String) -> crate::error::Error {
        ErrorRepr::Manifest {
            id: self.data.get_id(),
            msg,
        }
        .into()
    }
}
