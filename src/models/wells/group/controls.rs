//! The caller-owned well table that tree leaves index into.

use std::ops::Range;

use super::GroupControlError;

/// Whether a well produces or injects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellType {
    Producer,
    Injector,
}

/// Quantity a single well control acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellControlType {
    Bhp,
    Thp,
    /// Reservoir volume rate, weighted by the phase distribution.
    ReservoirRate,
    /// Surface volume rate, weighted by the phase distribution.
    SurfaceRate,
}

/// One control of a well: a kind, a target and a phase distribution.
///
/// Producer rate targets are negative, injector rate targets positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellControl {
    pub kind: WellControlType,
    pub target: f64,
    /// Weights per active-phase position for rate controls.
    pub distr: [f64; 3],
}

impl WellControl {
    #[must_use]
    pub fn bhp(target: f64) -> Self {
        Self {
            kind: WellControlType::Bhp,
            target,
            distr: [0.0; 3],
        }
    }

    #[must_use]
    pub fn surface_rate(target: f64, distr: [f64; 3]) -> Self {
        Self {
            kind: WellControlType::SurfaceRate,
            target,
            distr,
        }
    }

    #[must_use]
    pub fn reservoir_rate(target: f64, distr: [f64; 3]) -> Self {
        Self {
            kind: WellControlType::ReservoirRate,
            target,
            distr,
        }
    }
}

/// Ordered controls of a well, the active one, and whether the well is open.
#[derive(Debug, Clone, PartialEq)]
pub struct WellControls {
    controls: Vec<WellControl>,
    current: usize,
    open: bool,
}

impl WellControls {
    /// Creates an open control list with the first control active.
    #[must_use]
    pub fn new(controls: Vec<WellControl>) -> Self {
        Self {
            controls,
            current: 0,
            open: true,
        }
    }

    #[must_use]
    pub fn controls(&self) -> &[WellControl] {
        &self.controls
    }

    /// Index of the active control.
    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Returns the active control, if the list is non-empty.
    #[must_use]
    pub fn current_control(&self) -> Option<&WellControl> {
        self.controls.get(self.current)
    }

    /// Makes control `index` the active one.
    ///
    /// Out-of-range indices are ignored.
    pub fn set_current(&mut self, index: usize) {
        if index < self.controls.len() {
            self.current = index;
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Stops the well. The control list is kept.
    pub fn stop(&mut self) {
        self.open = false;
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Writes the group control into its dedicated slot.
    ///
    /// When `slot` is `None` the control is appended and the new slot is
    /// returned; otherwise the existing slot is overwritten in place.
    pub fn set_group_control(&mut self, slot: Option<usize>, control: WellControl) -> usize {
        match slot {
            Some(index) if index < self.controls.len() => {
                self.controls[index] = control;
                index
            }
            _ => {
                self.controls.push(control);
                self.controls.len() - 1
            }
        }
    }
}

/// One entry of the well table.
#[derive(Debug, Clone, PartialEq)]
pub struct Well {
    pub name: String,
    pub well_type: WellType,
    pub controls: WellControls,
}

impl Well {
    #[must_use]
    pub fn new(name: impl Into<String>, well_type: WellType, controls: Vec<WellControl>) -> Self {
        Self {
            name: name.into(),
            well_type,
            controls: WellControls::new(controls),
        }
    }
}

/// Flat table of wells.
///
/// The index of a well here is also its block index in [`WellRates`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Wells {
    wells: Vec<Well>,
}

impl Wells {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a well and returns its index.
    pub fn push(&mut self, well: Well) -> usize {
        self.wells.push(well);
        self.wells.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Well> {
        self.wells.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Well> {
        self.wells.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.wells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Well> {
        self.wells.iter()
    }
}

impl FromIterator<Well> for Wells {
    fn from_iter<I: IntoIterator<Item = Well>>(iter: I) -> Self {
        Self {
            wells: iter.into_iter().collect(),
        }
    }
}

/// Per-well state the hierarchy reads during a constraint check.
///
/// `reservoir` and `surface` hold `num_phases` adjacent entries per well,
/// ordered by active-phase position. Production rates are negative.
#[derive(Debug, Clone, Copy)]
pub struct WellRates<'a> {
    pub bhp: &'a [f64],
    pub reservoir: &'a [f64],
    pub surface: &'a [f64],
}

impl WellRates<'_> {
    /// Reservoir and surface rate blocks of well `index`.
    ///
    /// # Errors
    ///
    /// Fails if either slice is shorter than `(index + 1) * num_phases`.
    pub fn blocks(
        &self,
        index: usize,
        num_phases: usize,
    ) -> Result<(&[f64], &[f64]), GroupControlError> {
        let range = index * num_phases..(index + 1) * num_phases;
        Ok((
            slice_of(self.reservoir, "reservoir", range.clone())?,
            slice_of(self.surface, "surface", range)?,
        ))
    }

    /// Bottom-hole pressure of well `index`.
    ///
    /// # Errors
    ///
    /// Fails if the BHP slice has no entry `index`.
    pub fn bhp(&self, index: usize) -> Result<f64, GroupControlError> {
        slice_of(self.bhp, "bottom-hole pressure", index..index + 1).map(|bhp| bhp[0])
    }
}

/// `rates[range]`, or [`GroupControlError::RatesTooShort`].
pub(super) fn slice_of<'a>(
    rates: &'a [f64],
    name: &'static str,
    range: Range<usize>,
) -> Result<&'a [f64], GroupControlError> {
    let required = range.end;
    rates.get(range).ok_or(GroupControlError::RatesTooShort {
        rates: name,
        len: rates.len(),
        required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_slot_is_allocated_once_then_overwritten() {
        let mut controls = WellControls::new(vec![WellControl::bhp(1.0e7)]);

        let slot = controls.set_group_control(None, WellControl::surface_rate(-50.0, [1.0; 3]));
        assert_eq!(slot, 1);
        assert_eq!(controls.controls().len(), 2);

        let again = controls.set_group_control(Some(slot), WellControl::surface_rate(-20.0, [1.0; 3]));
        assert_eq!(again, slot);
        assert_eq!(controls.controls().len(), 2);
        assert_eq!(controls.controls()[slot].target, -20.0);
    }

    #[test]
    fn stop_and_open() {
        let mut controls = WellControls::new(vec![]);
        assert!(controls.is_open());
        controls.stop();
        assert!(!controls.is_open());
        controls.open();
        assert!(controls.is_open());
        assert!(controls.current_control().is_none());
    }

    #[test]
    fn rate_blocks() {
        let rates = WellRates {
            bhp: &[1.0, 2.0],
            reservoir: &[1.0, 2.0, 3.0, 4.0],
            surface: &[5.0, 6.0, 7.0, 8.0],
        };
        assert_eq!(rates.blocks(1, 2).unwrap(), (&[3.0, 4.0][..], &[7.0, 8.0][..]));
        assert_eq!(rates.bhp(1).unwrap(), 2.0);
    }

    #[test]
    fn short_rate_slices_are_errors() {
        let rates = WellRates {
            bhp: &[1.0],
            reservoir: &[1.0, 2.0, 3.0, 4.0],
            surface: &[5.0, 6.0, 7.0],
        };
        assert_eq!(
            rates.blocks(1, 2),
            Err(GroupControlError::RatesTooShort {
                rates: "surface",
                len: 3,
                required: 4,
            })
        );
        assert!(matches!(
            rates.bhp(1),
            Err(GroupControlError::RatesTooShort { required: 2, .. })
        ));
    }
}
