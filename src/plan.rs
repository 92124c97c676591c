//! Splitting a byte length into contiguous part ranges.
//!
//! [`PartPlan::new`] is the upload-side policy: at most [`DEFAULT_MAX_PARTS`]
//! parts, none smaller than a minimum part size except the last.
//! [`PartPlan::fixed`] is the download-side variant with a fixed chunk size and
//! no cap on the number of chunks.
//!
//! ```rust
//! use media_transfer::plan::PartPlan;
//!
//! let plan = PartPlan::new(250, 100);
//! let ranges: Vec<_> = plan.iter().map(|r| (r.start, r.end)).collect();
//!
//! assert_eq!(ranges, vec![(0, 100), (100, 200), (200, 250)]);
//! ```
//!
//! [`DEFAULT_MAX_PARTS`]: crate::DEFAULT_MAX_PARTS
use crate::client::part::PartNumber;
use crate::{AWS_MAX_PART_COUNT, DEFAULT_MAX_PARTS};

use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// One part of a plan: the half-open byte range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    /// Number of the part, starting at 1.
    pub part_number: PartNumber,
    /// First byte of the part.
    pub start: u64,
    /// One past the last byte of the part.
    pub end: u64,
}

impl ByteRange {
    /// Size of the range in bytes.
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    /// Whether the range covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The last byte in the range, inclusive.
    pub fn last_byte(&self) -> u64 {
        self.end.saturating_sub(1)
    }

    /// The value of an HTTP `Range` header selecting exactly this range.
    pub fn to_range_header(&self) -> String {
        format!("bytes={}-{}", self.start, self.last_byte())
    }

    /// The range as indices into an in-memory buffer.
    pub fn as_usize(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }
}

impl Display for ByteRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {})", self.part_number, self.start, self.end)
    }
}

/// An ordered sequence of [`ByteRange`]s covering `[0, total_bytes)` with no
/// gaps or overlaps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartPlan {
    total_bytes: u64,
    part_size: u64,
    ranges: Vec<ByteRange>,
}

impl PartPlan {
    /// Plan an upload of `total_bytes` with the default cap of 100 parts.
    ///
    /// The part size is the larger of `ceil(total_bytes / 100)` and
    /// `min_part_size`. An empty input has no parts.
    pub fn new(total_bytes: u64, min_part_size: u64) -> Self {
        Self::with_max_parts(total_bytes, min_part_size, DEFAULT_MAX_PARTS)
    }

    /// Plan an upload of `total_bytes` into at most `max_parts` parts.
    ///
    /// `max_parts` is clamped to `1..=10_000`.
    pub fn with_max_parts(total_bytes: u64, min_part_size: u64, max_parts: usize) -> Self {
        let max_parts = max_parts.clamp(1, AWS_MAX_PART_COUNT) as u64;
        let part_size = total_bytes.div_ceil(max_parts).max(min_part_size).max(1);
        Self::fixed(total_bytes, part_size)
    }

    /// Split `total_bytes` into chunks of exactly `chunk_size` bytes, the last
    /// possibly shorter. There is no cap on the number of chunks.
    ///
    /// A `chunk_size` of 0 is treated as 1.
    pub fn fixed(total_bytes: u64, chunk_size: u64) -> Self {
        let part_size = chunk_size.max(1);
        let num_parts = total_bytes.div_ceil(part_size) as usize;
        let ranges = (0..num_parts)
            .map(|i| {
                let start = i as u64 * part_size;
                ByteRange {
                    part_number: PartNumber::from_index(i),
                    start,
                    end: (start + part_size).min(total_bytes),
                }
            })
            .collect();

        Self {
            total_bytes,
            part_size,
            ranges,
        }
    }

    /// Size of every part but possibly the last.
    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// Number of parts in the plan.
    pub fn num_parts(&self) -> usize {
        self.ranges.len()
    }

    /// The length the plan covers.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Whether the plan has no parts, i.e. the input was empty.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over the ranges in part number order.
    pub fn iter(&self) -> std::slice::Iter<'_, ByteRange> {
        self.ranges.iter()
    }

    /// The ranges in part number order.
    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }
}

impl<'a> IntoIterator for &'a PartPlan {
    type Item = &'a ByteRange;
    type IntoIter = std::slice::Iter<'a, ByteRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
