//! Active-phase bookkeeping for black-oil rate arrays.
//!
//! Per-well rate arrays are flat: each well owns `num_phases` adjacent
//! entries, one per *active* phase, ordered water, oil, gas. [`PhaseUsage`]
//! maps a [`Phase`] to its position within such a block.

use std::fmt;

/// A black-oil phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Water,
    Oil,
    Gas,
}

impl Phase {
    /// All phases in canonical (water, oil, gas) order.
    pub const ALL: [Phase; 3] = [Phase::Water, Phase::Oil, Phase::Gas];

    /// Canonical index of the phase, independent of which phases are active.
    #[must_use]
    pub const fn canonical_index(self) -> usize {
        match self {
            Phase::Water => 0,
            Phase::Oil => 1,
            Phase::Gas => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Water => "water",
            Phase::Oil => "oil",
            Phase::Gas => "gas",
        };
        f.write_str(name)
    }
}

/// Which phases are active and where each sits in a per-well rate block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseUsage {
    num_phases: usize,
    position: [Option<usize>; 3],
}

impl PhaseUsage {
    /// Builds the usage from the active flags of water, oil and gas.
    #[must_use]
    pub fn new(water: bool, oil: bool, gas: bool) -> Self {
        let mut position = [None; 3];
        let mut num_phases = 0;
        for (slot, active) in position.iter_mut().zip([water, oil, gas]) {
            if active {
                *slot = Some(num_phases);
                num_phases += 1;
            }
        }
        Self {
            num_phases,
            position,
        }
    }

    /// Water, oil and gas all active.
    #[must_use]
    pub fn three_phase() -> Self {
        Self::new(true, true, true)
    }

    /// Number of active phases.
    #[must_use]
    pub fn num_phases(&self) -> usize {
        self.num_phases
    }

    /// Returns true if `phase` is active.
    #[must_use]
    pub fn is_active(&self, phase: Phase) -> bool {
        self.position[phase.canonical_index()].is_some()
    }

    /// Position of `phase` within a per-well rate block, if active.
    #[must_use]
    pub fn position(&self, phase: Phase) -> Option<usize> {
        self.position[phase.canonical_index()]
    }

    /// Iterates over the active phases in canonical order.
    pub fn active_phases(&self) -> impl Iterator<Item = Phase> + '_ {
        Phase::ALL.into_iter().filter(|&phase| self.is_active(phase))
    }
}
