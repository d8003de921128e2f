/// Dense local system of one multisegment well.
///
/// Rows and columns are addressed by `(segment, equation)` pairs; the
/// Jacobian holds `(segments · equations)²` entries, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct WellLinearSystem {
    num_segments: usize,
    num_well_eq: usize,
    residual: Vec<f64>,
    jacobian: Vec<f64>,
}

impl WellLinearSystem {
    /// A zeroed system.
    #[must_use]
    pub fn new(num_segments: usize, num_well_eq: usize) -> Self {
        let size = num_segments * num_well_eq;
        Self {
            num_segments,
            num_well_eq,
            residual: vec![0.0; size],
            jacobian: vec![0.0; size * size],
        }
    }

    #[must_use]
    pub fn num_segments(&self) -> usize {
        self.num_segments
    }

    #[must_use]
    pub fn num_well_eq(&self) -> usize {
        self.num_well_eq
    }

    /// Zeroes residual and Jacobian for a fresh assembly.
    pub fn clear(&mut self) {
        self.residual.fill(0.0);
        self.jacobian.fill(0.0);
    }

    #[must_use]
    pub fn residual(&self, seg: usize, eq: usize) -> f64 {
        self.residual[self.row(seg, eq)]
    }

    pub fn set_residual(&mut self, seg: usize, eq: usize, value: f64) {
        let row = self.row(seg, eq);
        self.residual[row] = value;
    }

    pub fn add_residual(&mut self, seg: usize, eq: usize, value: f64) {
        let row = self.row(seg, eq);
        self.residual[row] += value;
    }

    /// Residuals of segment `seg`, indexed by equation.
    #[must_use]
    pub fn segment_residual(&self, seg: usize) -> &[f64] {
        let start = self.row(seg, 0);
        &self.residual[start..start + self.num_well_eq]
    }

    /// Entry `∂r[row_seg][row_eq] / ∂x[col_seg][col_var]`.
    #[must_use]
    pub fn jacobian(&self, row_seg: usize, row_eq: usize, col_seg: usize, col_var: usize) -> f64 {
        self.jacobian[self.entry(row_seg, row_eq, col_seg, col_var)]
    }

    pub fn set_jacobian(
        &mut self,
        row_seg: usize,
        row_eq: usize,
        col_seg: usize,
        col_var: usize,
        value: f64,
    ) {
        let entry = self.entry(row_seg, row_eq, col_seg, col_var);
        self.jacobian[entry] = value;
    }

    pub fn add_jacobian(
        &mut self,
        row_seg: usize,
        row_eq: usize,
        col_seg: usize,
        col_var: usize,
        value: f64,
    ) {
        let entry = self.entry(row_seg, row_eq, col_seg, col_var);
        self.jacobian[entry] += value;
    }

    fn row(&self, seg: usize, eq: usize) -> usize {
        debug_assert!(seg < self.num_segments && eq < self.num_well_eq);
        seg * self.num_well_eq + eq
    }

    fn entry(&self, row_seg: usize, row_eq: usize, col_seg: usize, col_var: usize) -> usize {
        self.row(row_seg, row_eq) * self.residual.len() + self.row(col_seg, col_var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_addressed_by_segment_and_equation() {
        let mut system = WellLinearSystem::new(3, 2);
        system.set_residual(2, 1, 4.0);
        system.add_residual(2, 1, 1.0);
        system.set_jacobian(1, 0, 2, 1, -1.0);
        system.add_jacobian(1, 0, 2, 1, 3.0);

        assert_eq!(system.residual(2, 1), 5.0);
        assert_eq!(system.segment_residual(2), &[0.0, 5.0]);
        assert_eq!(system.jacobian(1, 0, 2, 1), 2.0);
        assert_eq!(system.jacobian(2, 1, 1, 0), 0.0);

        system.clear();
        assert_eq!(system.residual(2, 1), 0.0);
        assert_eq!(system.jacobian(1, 0, 2, 1), 0.0);
    }
}
