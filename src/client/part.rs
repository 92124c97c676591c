use super::UploadId;
use crate::error::{ErrorRepr, Result};

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use std::borrow::Cow;
use std::fmt::{self, Display, Formatter};
use std::ops::Deref;

/// Body of a part upload or single-shot put request.
///
/// The body is a cheaply cloneable view into the caller's buffer, so slicing
/// an upload into parts does not copy.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PartBody(Bytes);

impl PartBody {
    /// Construct a body from [`Bytes`].
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// Size in bytes of the `PartBody`.
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Convert this type into a [`ByteStream`], which is the type required by
    /// the SDK in the request to send a part.
    ///
    /// This only increments the ref-count of the inner buffer.
    pub fn as_sdk_body(&self) -> ByteStream {
        self.0.clone().into()
    }

    /// Returns the inner bytes.
    pub fn into_inner(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for PartBody {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for PartBody {
    fn from(value: Vec<u8>) -> Self {
        Self(value.into())
    }
}

impl From<&'static [u8]> for PartBody {
    fn from(value: &'static [u8]) -> Self {
        Self(Bytes::from_static(value))
    }
}

impl Deref for PartBody {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for PartBody {
    fn as_ref(&self) -> &[u8] {
        self.deref()
    }
}

/// Number assigned to a part when uploading.
///
/// This, along with the entity tag found in the response, is required in the
/// request to complete a multipart upload because it identifies where the part
/// goes when assembling the full object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartNumber(i32);

impl Default for PartNumber {
    fn default() -> Self {
        Self(1)
    }
}

impl PartNumber {
    /// Create a new `PartNumber` from a plain integer.
    ///
    /// Note that uploads are required to start with a part number of 1, which
    /// is how `PartNumber: Default`.
    pub fn new(n: i32) -> Self {
        Self(n)
    }

    /// The part number for the zero-based `index` of a part in a plan.
    pub fn from_index(index: usize) -> Self {
        Self(index as i32 + 1)
    }
}

impl Deref for PartNumber {
    type Target = i32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for PartNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "part_{}", self.0)
    }
}

/// Entity tag.
///
/// This value is an opaque integrity tag of an object. It is assigned to an
/// uploaded part and returned in the response from a part upload request.
///
/// It is also assigned to a completed upload and found in a successful
/// complete upload or put response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EntityTag(Cow<'static, str>);

impl EntityTag {
    /// Create a new `EntityTag`.
    pub fn new<T: Into<Cow<'static, str>>>(etag: T) -> Self {
        Self(etag.into())
    }

    pub(crate) fn try_from_opt(
        value: Option<&str>,
        source: &'static str,
    ) -> Result<Self, ErrorRepr> {
        value
            .map(Self::from)
            .ok_or(ErrorRepr::Missing(source, "e_tag"))
    }
}

impl Deref for EntityTag {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EntityTag {
    fn as_ref(&self) -> &str {
        self.deref()
    }
}

impl Display for EntityTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for EntityTag {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl From<String> for EntityTag {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// The value for a successful part upload request.
///
/// All `CompletedPart`s need to be retained in order to construct a valid
/// complete upload request.
#[derive(Debug, Clone)]
pub struct CompletedPart {
    /// The ID of the upload this part was added to.
    pub id: UploadId,
    /// The entity tag the store assigned to the uploaded part.
    pub etag: EntityTag,
    /// The integer starting with 1 that identifies this part in the upload.
    pub part_number: PartNumber,
    /// The size of this part in bytes.
    pub part_size: usize,
}

impl CompletedPart {
    /// Create a new value from entity tag and part number used in the upload.
    pub fn new(id: UploadId, etag: EntityTag, part_number: PartNumber, part_size: usize) -> Self {
        Self {
            id,
            etag,
            part_number,
            part_size,
        }
    }
}

/// All completed part uploads for a multipart upload.
#[derive(Debug, Clone, Default)]
pub struct CompletedParts(Vec<CompletedPart>);

impl CompletedParts {
    /// Add a new [`CompletedPart`] to this collection.
    pub fn push(&mut self, part: CompletedPart) {
        self.0.push(part);
    }

    /// Returns the number of parts that have been successfully uploaded.
    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// Sort the `CompletedPart`s in increasing order by part number.
    ///
    /// It is an error to make a complete request where the parts are not in
    /// order.
    pub fn sort_ascending(&mut self) {
        self.0.sort_by_key(|part| part.part_number);
    }

    /// Part numbers in their current order.
    pub fn part_numbers(&self) -> Vec<PartNumber> {
        self.0.iter().map(|p| p.part_number).collect()
    }
}

impl Deref for CompletedParts {
    type Target = [CompletedPart];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<CompletedPart> for CompletedParts {
    fn from_iter<T: IntoIterator<Item = CompletedPart>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&CompletedParts> for aws_sdk_s3::types::CompletedMultipartUpload {
    fn from(value: &CompletedParts) -> Self {
        let completed_parts = value
            .0
            .iter()
            .map(|v| {
                aws_sdk_s3::types::CompletedPart::builder()
                    .e_tag(v.etag.to_string())
                    .part_number(*v.part_number)
                    .build()
            })
            .collect();

        aws_sdk_s3::types::CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build()
    }
}
