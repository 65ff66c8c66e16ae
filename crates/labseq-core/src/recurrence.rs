//! The Labseq recurrence `value(i) = value(i-4) + value(i-3)` and the
//! four-value sliding window every evaluator advances.

use std::sync::Arc;

use num_bigint::BigUint;

use crate::constants::{BASE_LEN, BASE_VALUES};

/// Apply the recurrence: `a = value(i-4)`, `b = value(i-3)`, returns `value(i)`.
#[inline]
#[must_use]
pub fn next_value(a: &BigUint, b: &BigUint) -> BigUint {
    a + b
}

/// Base value at `index`, or `None` for `index >= 4`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn base_value(index: u64) -> Option<BigUint> {
    (index < BASE_LEN).then(|| BigUint::from(BASE_VALUES[index as usize]))
}

/// The four consecutive values preceding `next_index`.
///
/// `values[0]` is `value(next_index - 4)` and `values[3]` is
/// `value(next_index - 1)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    next_index: u64,
    values: [Arc<BigUint>; 4],
}

impl Window {
    /// Window over the base values, ready to produce `value(4)`.
    #[must_use]
    pub fn base() -> Self {
        Self {
            next_index: BASE_LEN,
            values: BASE_VALUES.map(|v| Arc::new(BigUint::from(v))),
        }
    }

    /// Build a window from the four values preceding `next_index`.
    ///
    /// `next_index` must be at least 4.
    #[must_use]
    pub fn new(next_index: u64, values: [Arc<BigUint>; 4]) -> Self {
        debug_assert!(next_index >= BASE_LEN);
        Self { next_index, values }
    }

    /// Index of the value the next `advance` produces.
    #[must_use]
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// The four values, oldest first.
    #[must_use]
    pub fn values(&self) -> &[Arc<BigUint>; 4] {
        &self.values
    }

    /// Most recent value, `value(next_index - 1)`.
    #[must_use]
    pub fn last(&self) -> &Arc<BigUint> {
        &self.values[3]
    }

    /// Compute the next value, slide the window, and return `(index, value)`.
    pub fn advance(&mut self) -> (u64, Arc<BigUint>) {
        let value = Arc::new(next_value(&self.values[0], &self.values[1]));
        self.values.rotate_left(1);
        self.values[3] = Arc::clone(&value);
        let index = self.next_index;
        self.next_index += 1;
        (index, value)
    }
}
