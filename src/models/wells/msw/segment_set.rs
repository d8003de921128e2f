//! Validated segment topology of one well.

use std::collections::HashMap;

use thiserror::Error;

use crate::support::units::ToSi;

use super::Segment;

/// Errors raised when a segment list does not describe a valid well.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentSetError {
    #[error("a multisegment well needs at least one segment")]
    Empty,

    #[error("top segment {number} must not have an outlet")]
    TopSegmentHasOutlet { number: u32 },

    #[error("top segment {number} cannot carry a flow device")]
    DeviceOnTopSegment { number: u32 },

    #[error("segment {number} has no outlet")]
    MissingOutlet { number: u32 },

    #[error("segment {number} has unknown outlet {outlet}")]
    UnknownOutlet { number: u32, outlet: u32 },

    #[error("segment number {number} is used more than once")]
    DuplicateNumber { number: u32 },

    #[error("segment {number} is not longer than its outlet")]
    NonIncreasingLength { number: u32 },
}

/// Ordered segments of a well with their derived connectivity.
///
/// Index 0 is the top segment. Depth and length differences are taken
/// against the outlet, in metres, and are zero for the top segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSet {
    segments: Vec<Segment>,
    index_of: HashMap<u32, usize>,
    outlets: Vec<Option<usize>>,
    inlets: Vec<Vec<usize>>,
    depth_diffs: Vec<f64>,
    length_diffs: Vec<f64>,
}

impl SegmentSet {
    /// Validates `segments` and derives outlets, inlets and differences.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentSetError`] if the list is empty, the first segment
    /// has an outlet or a device, a later segment lacks a known outlet, a
    /// number repeats, or a segment is not longer than its outlet.
    pub fn new(segments: Vec<Segment>) -> Result<Self, SegmentSetError> {
        let top = segments.first().ok_or(SegmentSetError::Empty)?;
        if top.outlet.is_some() {
            return Err(SegmentSetError::TopSegmentHasOutlet { number: top.number });
        }
        if top.device.is_icd() {
            return Err(SegmentSetError::DeviceOnTopSegment { number: top.number });
        }

        let mut index_of = HashMap::with_capacity(segments.len());
        for (index, segment) in segments.iter().enumerate() {
            if index_of.insert(segment.number, index).is_some() {
                return Err(SegmentSetError::DuplicateNumber {
                    number: segment.number,
                });
            }
        }

        let count = segments.len();
        let mut outlets = vec![None; count];
        let mut inlets = vec![Vec::new(); count];
        let mut depth_diffs = vec![0.0; count];
        let mut length_diffs = vec![0.0; count];
        for (index, segment) in segments.iter().enumerate().skip(1) {
            let number = segment.number;
            let outlet_number = segment
                .outlet
                .ok_or(SegmentSetError::MissingOutlet { number })?;
            let outlet = *index_of
                .get(&outlet_number)
                .ok_or(SegmentSetError::UnknownOutlet {
                    number,
                    outlet: outlet_number,
                })?;

            let length_diff = segment.length.to_si() - segments[outlet].length.to_si();
            if length_diff <= 0.0 {
                return Err(SegmentSetError::NonIncreasingLength { number });
            }

            outlets[index] = Some(outlet);
            inlets[outlet].push(index);
            depth_diffs[index] = segment.depth.to_si() - segments[outlet].depth.to_si();
            length_diffs[index] = length_diff;
        }

        Ok(Self {
            segments,
            index_of,
            outlets,
            inlets,
            depth_diffs,
            length_diffs,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; construction rejects empty wells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Maps a deck segment number to its index.
    #[must_use]
    pub fn index_of(&self, number: u32) -> Option<usize> {
        self.index_of.get(&number).copied()
    }

    /// Index of the outlet of segment `index`; `None` for the top segment.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn outlet(&self, index: usize) -> Option<usize> {
        self.outlets[index]
    }

    /// Indices of the segments draining into segment `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[must_use]
    pub fn inlets(&self, index: usize) -> &[usize] {
        &self.inlets[index]
    }

    /// Depth of segment `index` below its outlet, in metres.
    #[must_use]
    pub fn depth_difference(&self, index: usize) -> f64 {
        self.depth_diffs[index]
    }

    /// Length of segment `index` beyond its outlet, in metres.
    #[must_use]
    pub fn length_difference(&self, index: usize) -> f64 {
        self.length_diffs[index]
    }

    pub(super) fn segment(&self, index: usize) -> &Segment {
        &self.segments[index]
    }
}
