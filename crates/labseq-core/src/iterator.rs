//! Lazy Labseq iterator independent of any store.

use std::sync::Arc;

use num_bigint::BigUint;

use crate::constants::BASE_LEN;
use crate::recurrence::{base_value, Window};
use crate::transition::Transition;

/// Lazy iterator over the Labseq sequence.
///
/// Yields `(index, value(index))` pairs starting from value(0).
///
/// # Example
/// ```
/// use labseq_core::iterator::LabseqIterator;
/// let terms: Vec<_> = LabseqIterator::new().take(11).map(|(_, v)| v.to_string()).collect();
/// assert_eq!(terms, ["0", "1", "0", "1", "1", "1", "1", "2", "2", "2", "3"]);
/// ```
pub struct LabseqIterator {
    window: Window,
    index: u64,
}

impl LabseqIterator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window: Window::base(),
            index: 0,
        }
    }

    /// Start iteration at index `n`, jumping there with `M^k` instead of
    /// stepping through every earlier term.
    #[must_use]
    pub fn from_index(n: u64) -> Self {
        if n < BASE_LEN {
            return Self {
                window: Window::base(),
                index: n,
            };
        }
        let window = Transition::power(n - BASE_LEN).apply(&Window::base());
        Self { window, index: n }
    }
}

impl Default for LabseqIterator {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for LabseqIterator {
    type Item = (u64, BigUint);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        self.index += 1;
        if let Some(value) = base_value(index) {
            return Some((index, value));
        }
        debug_assert_eq!(self.window.next_index(), index);
        let (_, value) = self.window.advance();
        Some((index, Arc::unwrap_or_clone(value)))
    }
}
