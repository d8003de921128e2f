use num_dual::Dual64;

/// Value of a term and its derivative with respect to each primary slot.
///
/// `derivatives[k]` is the derivative with respect to variable `k`, where
/// variable `k` of every segment was seeded at once.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: f64,
    pub derivatives: Vec<f64>,
}

impl Evaluation {
    /// Collects one dual per slot, each seeded in its own slot.
    ///
    /// The value is taken from the first slot; every slot carries the same
    /// real part.
    pub(super) fn from_slots(slots: impl IntoIterator<Item = Dual64>) -> Self {
        let mut value = 0.0;
        let derivatives = slots
            .into_iter()
            .enumerate()
            .map(|(slot, dual)| {
                if slot == 0 {
                    value = dual.re;
                }
                dual.eps
            })
            .collect();
        Self { value, derivatives }
    }

    /// A primary variable itself: unit derivative in `slot`.
    pub(super) fn variable(value: f64, slot: usize, num_slots: usize) -> Self {
        let mut derivatives = vec![0.0; num_slots];
        derivatives[slot] = 1.0;
        Self { value, derivatives }
    }
}

/// Drops the derivative part of `x`.
pub(super) fn clear_derivatives(x: Dual64) -> Dual64 {
    Dual64::from(x.re)
}
