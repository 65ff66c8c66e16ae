//! Companion-matrix jumps over the Labseq recurrence.
//!
//! The state `(v(i-4), v(i-3), v(i-2), v(i-1))` advances by
//!
//! ```text
//!     | 0 1 0 0 |
//! M = | 0 0 1 0 |
//!     | 0 0 0 1 |
//!     | 1 1 0 0 |
//! ```
//!
//! so `M^k` moves a seed window `k` indices forward. `M^k` is computed by
//! binary exponentiation (square-and-multiply).

use std::sync::Arc;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::recurrence::Window;

type Matrix4 = [[BigUint; 4]; 4];

/// `M^steps` for the Labseq companion matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    matrix: Matrix4,
    steps: u64,
}

impl Transition {
    /// The identity transition (zero steps).
    #[must_use]
    pub fn identity() -> Self {
        Self {
            matrix: std::array::from_fn(|r| {
                std::array::from_fn(|c| if r == c { BigUint::one() } else { BigUint::zero() })
            }),
            steps: 0,
        }
    }

    /// The single-step companion matrix `M`.
    #[must_use]
    pub fn step() -> Self {
        const ONES: [[bool; 4]; 4] = [
            [false, true, false, false],
            [false, false, true, false],
            [false, false, false, true],
            [true, true, false, false],
        ];
        Self {
            matrix: ONES.map(|row| {
                row.map(|set| if set { BigUint::one() } else { BigUint::zero() })
            }),
            steps: 1,
        }
    }

    /// `M^steps`.
    #[must_use]
    pub fn power(steps: u64) -> Self {
        let mut result = Self::identity();
        if steps == 0 {
            return result;
        }
        let base = Self::step();
        let num_bits = 64 - steps.leading_zeros();
        for i in (0..num_bits).rev() {
            result = result.multiply(&result);
            if (steps >> i) & 1 == 1 {
                result = result.multiply(&base);
            }
        }
        result
    }

    /// Number of indices this transition jumps.
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Matrix product `self * other`; steps add up since powers of `M` commute.
    #[must_use]
    pub fn multiply(&self, other: &Self) -> Self {
        let matrix = std::array::from_fn(|r| {
            std::array::from_fn(|c| {
                (0..4).fold(BigUint::zero(), |acc, k| {
                    if self.matrix[r][k].is_zero() || other.matrix[k][c].is_zero() {
                        acc
                    } else {
                        acc + &self.matrix[r][k] * &other.matrix[k][c]
                    }
                })
            })
        });
        Self {
            matrix,
            steps: self.steps + other.steps,
        }
    }

    /// Jump `window` forward by `steps` indices.
    #[must_use]
    pub fn apply(&self, window: &Window) -> Window {
        let values = window.values();
        let jumped = std::array::from_fn(|r| {
            let sum = (0..4).fold(BigUint::zero(), |acc, c| {
                if self.matrix[r][c].is_zero() {
                    acc
                } else {
                    acc + &self.matrix[r][c] * values[c].as_ref()
                }
            });
            Arc::new(sum)
        });
        Window::new(window.next_index() + self.steps, jumped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::LABSEQ_TABLE;

    fn window_at(next_index: u64) -> Window {
        let mut window = Window::base();
        while window.next_index() < next_index {
            window.advance();
        }
        window
    }

    #[test]
    fn identity_leaves_window_unchanged() {
        let window = window_at(10);
        assert_eq!(Transition::identity().apply(&window), window);
    }

    #[test]
    fn single_step_matches_advance() {
        let window = window_at(12);
        let mut expected = window.clone();
        expected.advance();
        assert_eq!(Transition::step().apply(&window), expected);
    }

    #[test]
    fn power_jumps_from_base() {
        let jumped = Transition::power(10).apply(&Window::base());
        assert_eq!(jumped.next_index(), 14);
        let values: Vec<u64> = jumped
            .values()
            .iter()
            .map(|v| u64::try_from(v.as_ref()).unwrap())
            .collect();
        assert_eq!(values, LABSEQ_TABLE[10..14].to_vec());
    }

    #[test]
    fn power_matches_repeated_advance() {
        for steps in [1u64, 2, 3, 7, 16, 33, 100] {
            let start = window_at(20);
            let mut expected = start.clone();
            for _ in 0..steps {
                expected.advance();
            }
            let jumped = Transition::power(steps).apply(&start);
            assert_eq!(jumped, expected, "jump of {steps} steps");
        }
    }

    #[test]
    fn multiply_adds_steps() {
        let t = Transition::power(5).multiply(&Transition::power(7));
        assert_eq!(t.steps(), 12);
        assert_eq!(t, Transition::power(12));
    }

    #[test]
    fn power_zero_is_identity() {
        assert_eq!(Transition::power(0), Transition::identity());
    }
}
