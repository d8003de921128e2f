use std::ops::AddAssign;

/// How badly an equation failed to converge.
///
/// Ordered from mildest to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    None,
    Normal,
    TooLarge,
    NotANumber,
}

/// Which well equation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WellFailureType {
    MassBalance,
    Pressure,
    ControlBhp,
    ControlThp,
    ControlRate,
}

/// One failed equation of one well.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WellFailure {
    kind: WellFailureType,
    severity: Severity,
    component: Option<usize>,
    well_name: String,
}

impl WellFailure {
    #[must_use]
    pub fn new(
        kind: WellFailureType,
        severity: Severity,
        component: Option<usize>,
        well_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            component,
            well_name: well_name.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> WellFailureType {
        self.kind
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Mass-balance component, for [`WellFailureType::MassBalance`].
    #[must_use]
    pub fn component(&self) -> Option<usize> {
        self.component
    }

    #[must_use]
    pub fn well_name(&self) -> &str {
        &self.well_name
    }
}

/// Outcome of a convergence check: the failures in the order found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
    well_failures: Vec<WellFailure>,
}

impl ConvergenceReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_well_failed(&mut self, failure: WellFailure) {
        self.well_failures.push(failure);
    }

    #[must_use]
    pub fn converged(&self) -> bool {
        self.well_failures.is_empty()
    }

    #[must_use]
    pub fn well_failed(&self) -> bool {
        !self.well_failures.is_empty()
    }

    #[must_use]
    pub fn well_failures(&self) -> &[WellFailure] {
        &self.well_failures
    }

    /// The worst severity recorded, [`Severity::None`] when converged.
    #[must_use]
    pub fn severity_of_worst_failure(&self) -> Severity {
        self.well_failures
            .iter()
            .map(WellFailure::severity)
            .max()
            .unwrap_or_default()
    }
}

impl AddAssign for ConvergenceReport {
    fn add_assign(&mut self, rhs: Self) {
        self.well_failures.extend(rhs.well_failures);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_ordered() {
        assert!(Severity::None < Severity::Normal);
        assert!(Severity::Normal < Severity::TooLarge);
        assert!(Severity::TooLarge < Severity::NotANumber);
    }

    #[test]
    fn merging_keeps_order_and_worst_severity() {
        let mut report = ConvergenceReport::new();
        assert!(report.converged());
        assert_eq!(report.severity_of_worst_failure(), Severity::None);

        report.set_well_failed(WellFailure::new(
            WellFailureType::Pressure,
            Severity::Normal,
            None,
            "A",
        ));
        let mut other = ConvergenceReport::new();
        other.set_well_failed(WellFailure::new(
            WellFailureType::MassBalance,
            Severity::NotANumber,
            Some(1),
            "B",
        ));
        report += other;

        assert!(report.well_failed());
        assert_eq!(report.severity_of_worst_failure(), Severity::NotANumber);
        let names: Vec<_> = report.well_failures().iter().map(WellFailure::well_name).collect();
        assert_eq!(names, ["A", "B"]);
        assert_eq!(report.well_failures()[1].component(), Some(1));
    }
}
