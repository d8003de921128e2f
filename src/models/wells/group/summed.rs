use std::ops::AddAssign;

/// Phase rates summed over a subtree during one constraint check.
///
/// Entries are indexed by active-phase position, like the per-well rate
/// blocks they are summed from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WellPhasesSummed {
    pub reservoir_injection: [f64; 3],
    pub reservoir_production: [f64; 3],
    pub surface_injection: [f64; 3],
    pub surface_production: [f64; 3],
}

impl AddAssign for WellPhasesSummed {
    fn add_assign(&mut self, other: Self) {
        for i in 0..3 {
            self.reservoir_injection[i] += other.reservoir_injection[i];
            self.reservoir_production[i] += other.reservoir_production[i];
            self.surface_injection[i] += other.surface_injection[i];
            self.surface_production[i] += other.surface_production[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assign_sums_every_entry() {
        let mut total = WellPhasesSummed::default();
        let a = WellPhasesSummed {
            surface_production: [-10.0, -20.0, -30.0],
            ..Default::default()
        };
        let b = WellPhasesSummed {
            surface_production: [-1.0, -2.0, -3.0],
            reservoir_injection: [5.0, 0.0, 0.0],
            ..Default::default()
        };
        total += a;
        total += b;
        assert_eq!(total.surface_production, [-11.0, -22.0, -33.0]);
        assert_eq!(total.reservoir_injection, [5.0, 0.0, 0.0]);
        assert_eq!(total.surface_injection, [0.0; 3]);
    }
}
