use crate::models::wells::{
    group::WellType,
    spec::{ControlMode, InjectionControlMode, ProductionControlMode},
};

/// Whether a well is flowing or has been stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WellStatus {
    #[default]
    Open,
    Stopped,
}

/// Per-segment decomposition of the pressure drop to the outlet, in pascal.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SegmentPressureDrops {
    pub hydrostatic: Vec<f64>,
    pub friction: Vec<f64>,
    pub acceleration: Vec<f64>,
}

impl SegmentPressureDrops {
    #[must_use]
    pub fn new(num_segments: usize) -> Self {
        Self {
            hydrostatic: vec![0.0; num_segments],
            friction: vec![0.0; num_segments],
            acceleration: vec![0.0; num_segments],
        }
    }
}

/// Caller-owned state of one multisegment well.
#[derive(Debug, Clone, PartialEq)]
pub struct WellState {
    pub well_type: WellType,
    pub status: WellStatus,
    pub production_mode: ProductionControlMode,
    pub injection_mode: InjectionControlMode,
    pub pressure_drops: SegmentPressureDrops,
}

impl WellState {
    /// An open producer under `mode`.
    #[must_use]
    pub fn producer(num_segments: usize, mode: ProductionControlMode) -> Self {
        Self {
            well_type: WellType::Producer,
            status: WellStatus::Open,
            production_mode: mode,
            injection_mode: InjectionControlMode::None,
            pressure_drops: SegmentPressureDrops::new(num_segments),
        }
    }

    /// An open injector under `mode`.
    #[must_use]
    pub fn injector(num_segments: usize, mode: InjectionControlMode) -> Self {
        Self {
            well_type: WellType::Injector,
            status: WellStatus::Open,
            production_mode: ProductionControlMode::None,
            injection_mode: mode,
            pressure_drops: SegmentPressureDrops::new(num_segments),
        }
    }

    /// The control mode matching the well type.
    #[must_use]
    pub fn current_mode(&self) -> ControlMode {
        match self.well_type {
            WellType::Producer => self.production_mode.into(),
            WellType::Injector => self.injection_mode.into(),
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.status == WellStatus::Stopped
    }
}
