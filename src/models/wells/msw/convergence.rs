//! Convergence measures of the assembled well residual.

use tracing::debug;

use crate::{
    models::wells::{
        group::WellType,
        spec::{InjectionControlMode, ProductionControlMode},
    },
    support::units::ToSi,
};

use super::{
    ConvergenceReport, ConvergenceTolerances, MswError, MultisegmentWellEval, Severity,
    WellFailure, WellFailureType, WellState,
};

/// Tolerances the control equation is checked against.
struct ControlTolerances {
    pressure: f64,
    rates: f64,
    max_residual_allowed: f64,
}

impl MultisegmentWellEval {
    /// Checks the residual of the last assembly against `tolerances`.
    ///
    /// Flux residuals are weighted by the average formation volume factor
    /// `b_avg` of each component. With `relax_tolerance` only the relaxed
    /// inner tolerances apply to the flux and pressure equations.
    ///
    /// # Errors
    ///
    /// Fails when `b_avg` does not hold one entry per component, or when
    /// the current control mode has no tolerance.
    pub fn get_well_convergence(
        &self,
        well_state: &WellState,
        b_avg: &[f64],
        tolerances: &ConvergenceTolerances,
        relax_tolerance: bool,
    ) -> Result<ConvergenceReport, MswError> {
        self.check_b_avg(b_avg)?;
        let layout = self.layout();
        let system = self.linear_system();
        let name = self.name();
        let tolerance_pressure = tolerances.tolerance_pressure.to_si();

        let mut report = ConvergenceReport::new();
        for (eq, &b) in b_avg.iter().enumerate() {
            let residual = (0..self.num_segments())
                .map(|seg| b * system.residual(seg, eq).abs())
                .fold(0.0, nan_max);
            let severity = if residual.is_nan() {
                Severity::NotANumber
            } else if residual > tolerances.max_residual_allowed {
                Severity::TooLarge
            } else if (!relax_tolerance && residual > tolerances.tolerance_wells)
                || residual > tolerances.relaxed_inner_tolerance_flow
            {
                Severity::Normal
            } else {
                Severity::None
            };
            if severity != Severity::None {
                report.set_well_failed(WellFailure::new(
                    WellFailureType::MassBalance,
                    severity,
                    Some(eq),
                    name,
                ));
            }
        }

        let spres = layout.spres();
        let residual = (1..self.num_segments())
            .map(|seg| system.residual(seg, spres).abs())
            .fold(0.0, nan_max);
        let severity = if residual.is_nan() {
            Severity::NotANumber
        } else if residual.is_infinite() {
            Severity::TooLarge
        } else if (!relax_tolerance && residual > tolerance_pressure)
            || residual > tolerances.relaxed_inner_tolerance_pressure.to_si()
        {
            Severity::Normal
        } else {
            Severity::None
        };
        if severity != Severity::None {
            report.set_well_failed(WellFailure::new(
                WellFailureType::Pressure,
                severity,
                None,
                name,
            ));
        }

        self.check_control_equation(
            well_state,
            &ControlTolerances {
                pressure: tolerance_pressure,
                rates: tolerances.tolerance_wells,
                max_residual_allowed: tolerances.max_residual_allowed,
            },
            system.residual(0, spres).abs(),
            &mut report,
        )?;
        Ok(report)
    }

    /// Maximum residual per equation, plus the control residual last.
    ///
    /// Flux entries are weighted by `b_avg`; the pressure entry covers the
    /// segments below the top.
    ///
    /// # Errors
    ///
    /// Fails with [`MswError::NonFiniteResidual`] on the first NaN or
    /// infinite residual, and when `b_avg` has the wrong length.
    pub fn finite_well_residuals(&self, b_avg: &[f64]) -> Result<Vec<f64>, MswError> {
        self.check_b_avg(b_avg)?;
        let num_well_eq = self.layout().num_well_eq();
        let spres = self.layout().spres();
        let system = self.linear_system();

        let mut residuals = vec![0.0_f64; num_well_eq + 1];
        for seg in 0..self.num_segments() {
            for eq in 0..num_well_eq {
                let residual = match b_avg.get(eq) {
                    Some(b) => system.residual(seg, eq).abs() * b,
                    None if seg > 0 => system.residual(seg, eq).abs(),
                    None => 0.0,
                };
                if !residual.is_finite() {
                    debug!(well = %self.name(), seg, eq, "non-finite well residual");
                    return Err(MswError::NonFiniteResidual {
                        well: self.name().to_owned(),
                        segment: Some(seg),
                        equation: eq,
                    });
                }
                residuals[eq] = residuals[eq].max(residual);
            }
        }

        let control = system.residual(0, spres).abs();
        if !control.is_finite() {
            debug!(well = %self.name(), "non-finite control residual");
            return Err(MswError::NonFiniteResidual {
                well: self.name().to_owned(),
                segment: None,
                equation: spres,
            });
        }
        residuals[num_well_eq] = control;
        Ok(residuals)
    }

    /// Tolerance of the control equation under the current mode.
    ///
    /// THP control uses `tolerance_pressure`; BHP, rate and group control
    /// use `tolerance_wells`.
    ///
    /// # Errors
    ///
    /// Fails with [`MswError::UnknownControlMode`] for any other mode.
    pub fn control_tolerance(
        &self,
        well_state: &WellState,
        tolerance_wells: f64,
        tolerance_pressure: f64,
    ) -> Result<f64, MswError> {
        use InjectionControlMode as I;
        use ProductionControlMode as P;

        match well_state.well_type {
            WellType::Injector => match well_state.injection_mode {
                I::Thp => Ok(tolerance_pressure),
                I::Bhp | I::Rate | I::Resv | I::Grup => Ok(tolerance_wells),
                _ => Err(self.unknown_mode(well_state)),
            },
            WellType::Producer => match well_state.production_mode {
                P::Thp => Ok(tolerance_pressure),
                P::Bhp
                | P::Orat
                | P::Wrat
                | P::Grat
                | P::Lrat
                | P::Resv
                | P::Crat
                | P::Grup => Ok(tolerance_wells),
                _ => Err(self.unknown_mode(well_state)),
            },
        }
    }

    /// Scalar measure of how far `residuals` are from convergence.
    ///
    /// `residuals` is the output of
    /// [`finite_well_residuals`](Self::finite_well_residuals). Each entry
    /// above its tolerance adds `residual / tolerance`; zero means every
    /// entry is within tolerance.
    ///
    /// # Errors
    ///
    /// Fails when `residuals` has the wrong length or the control mode has
    /// no tolerance.
    pub fn residual_measure_value(
        &self,
        well_state: &WellState,
        residuals: &[f64],
        tolerance_wells: f64,
        tolerance_pressure: f64,
    ) -> Result<f64, MswError> {
        let num_well_eq = self.layout().num_well_eq();
        if residuals.len() != num_well_eq + 1 {
            return Err(MswError::LengthMismatch {
                what: "residuals",
                expected: num_well_eq + 1,
                actual: residuals.len(),
            });
        }
        let spres = self.layout().spres();
        let control_tolerance =
            self.control_tolerance(well_state, tolerance_wells, tolerance_pressure)?;

        let excess = |residual: f64, tolerance: f64| {
            if residual > tolerance {
                residual / tolerance
            } else {
                0.0
            }
        };
        let flux: f64 = residuals[..num_well_eq - 1]
            .iter()
            .map(|&residual| excess(residual, tolerance_wells))
            .sum();
        Ok(flux
            + excess(residuals[spres], tolerance_pressure)
            + excess(residuals[spres + 1], control_tolerance))
    }

    fn check_control_equation(
        &self,
        well_state: &WellState,
        tolerances: &ControlTolerances,
        residual: f64,
        report: &mut ConvergenceReport,
    ) -> Result<(), MswError> {
        use InjectionControlMode as I;
        use ProductionControlMode as P;

        let (kind, tolerance) = if well_state.is_stopped() {
            (WellFailureType::ControlRate, tolerances.rates)
        } else {
            match well_state.well_type {
                WellType::Injector => match well_state.injection_mode {
                    I::Thp => (WellFailureType::ControlThp, tolerances.pressure),
                    I::Bhp => (WellFailureType::ControlBhp, tolerances.pressure),
                    I::Rate | I::Resv | I::Grup => (WellFailureType::ControlRate, tolerances.rates),
                    _ => return Err(self.unknown_mode(well_state)),
                },
                WellType::Producer => match well_state.production_mode {
                    P::Thp => (WellFailureType::ControlThp, tolerances.pressure),
                    P::Bhp => (WellFailureType::ControlBhp, tolerances.pressure),
                    P::Orat
                    | P::Wrat
                    | P::Grat
                    | P::Lrat
                    | P::Resv
                    | P::Crat
                    | P::Grup => (WellFailureType::ControlRate, tolerances.rates),
                    _ => return Err(self.unknown_mode(well_state)),
                },
            }
        };

        let severity = if residual.is_nan() {
            Severity::NotANumber
        } else if residual > 10.0 * tolerances.max_residual_allowed {
            Severity::TooLarge
        } else if residual > tolerance {
            Severity::Normal
        } else {
            return Ok(());
        };
        report.set_well_failed(WellFailure::new(kind, severity, None, self.name()));
        Ok(())
    }

    fn check_b_avg(&self, b_avg: &[f64]) -> Result<(), MswError> {
        let expected = self.layout().num_components();
        if b_avg.len() == expected {
            Ok(())
        } else {
            Err(MswError::LengthMismatch {
                what: "average formation volume factors",
                expected,
                actual: b_avg.len(),
            })
        }
    }

    fn unknown_mode(&self, well_state: &WellState) -> MswError {
        MswError::UnknownControlMode {
            well: self.name().to_owned(),
            mode: well_state.current_mode(),
        }
    }
}

/// Maximum that returns NaN when either side is NaN.
fn nan_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}
