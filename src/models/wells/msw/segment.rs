use uom::si::f64::{Area, Length};

use super::Device;

/// One segment of a multisegment well, as configured in the deck.
///
/// Depth is true vertical depth and `length` the measured length from the
/// well head to the segment's end node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Deck segment number.
    pub number: u32,
    /// Deck number of the outlet segment, `None` only for the top segment.
    pub outlet: Option<u32>,
    pub depth: Length,
    pub length: Length,
    pub area: Area,
    pub diameter: Length,
    pub roughness: Length,
    pub device: Device,
}

impl Segment {
    /// Creates a plain pipe segment.
    #[must_use]
    pub fn new(
        number: u32,
        outlet: Option<u32>,
        depth: Length,
        length: Length,
        area: Area,
        diameter: Length,
        roughness: Length,
    ) -> Self {
        Self {
            number,
            outlet,
            depth,
            length,
            area,
            diameter,
            roughness,
            device: Device::Pipe,
        }
    }

    /// Returns this segment with `device` installed.
    #[must_use]
    pub fn with_device(self, device: Device) -> Self {
        Self { device, ..self }
    }
}
