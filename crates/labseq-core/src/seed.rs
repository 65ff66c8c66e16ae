//! Resume points, seed windows, and on-demand recompute against a store.
//!
//! The store may have holes: compaction evicts old entries and concurrent
//! calls can leave in-flight blocks half written. These helpers find where
//! a fill can safely resume and heal missing predecessors by rolling a
//! local window forward from the nearest complete window below.

use std::sync::Arc;

use num_bigint::BigUint;
use tracing::warn;

use crate::constants::BASE_LEN;
use crate::evaluator::LabseqError;
use crate::recurrence::Window;
use crate::store::ValueStore;

/// First index to compute when filling up to `n`.
///
/// One past the highest `k < n` for which `k-3..=k` are all present,
/// or 4 when no such window exists above the base values.
#[must_use]
pub fn resume_index(store: &dyn ValueStore, n: u64) -> u64 {
    let mut k = store
        .max_known_index()
        .min(n.saturating_sub(1))
        .max(BASE_LEN - 1);
    loop {
        if k < BASE_LEN {
            return BASE_LEN;
        }
        match (0..4).find(|&d| !store.contains(k - d)) {
            None => return k + 1,
            Some(d) => k -= d + 1,
        }
    }
}

/// Read the window preceding `next_index` from the store, if complete.
#[must_use]
pub fn read_window(store: &dyn ValueStore, next_index: u64) -> Option<Window> {
    if next_index < BASE_LEN {
        return None;
    }
    let a = store.get(next_index - 4)?;
    let b = store.get(next_index - 3)?;
    let c = store.get(next_index - 2)?;
    let d = store.get(next_index - 1)?;
    Some(Window::new(next_index, [a, b, c, d]))
}

/// Window preceding `next_index`, recomputing missing values if needed.
pub fn resolve_window(store: &dyn ValueStore, next_index: u64) -> Result<Window, LabseqError> {
    if let Some(window) = read_window(store, next_index) {
        return Ok(window);
    }
    let values = [
        lookup_or_recompute(store, next_index - 4)?,
        lookup_or_recompute(store, next_index - 3)?,
        lookup_or_recompute(store, next_index - 2)?,
        lookup_or_recompute(store, next_index - 1)?,
    ];
    Ok(Window::new(next_index, values))
}

/// Value at `index` from the store, or recomputed on a miss.
pub fn lookup_or_recompute(
    store: &dyn ValueStore,
    index: u64,
) -> Result<Arc<BigUint>, LabseqError> {
    match store.get(index) {
        Some(value) => Ok(value),
        None => {
            warn!(index, "missing predecessor in store, recomputing");
            recompute(store, index)
        }
    }
}

/// Recompute `value(index)` and write every healed value back to the store.
///
/// Starts from the nearest complete window below `index`; if a concurrent
/// compaction removes it before it can be read, starts from the constant
/// base window instead, so this always terminates.
pub fn recompute(store: &dyn ValueStore, index: u64) -> Result<Arc<BigUint>, LabseqError> {
    if index < BASE_LEN {
        return store.get(index).ok_or_else(|| {
            LabseqError::Computation(format!("base value {index} missing from store"))
        });
    }

    let start = resume_index(store, index);
    let mut window = read_window(store, start).unwrap_or_else(Window::base);
    let mut last = Arc::clone(window.last());
    while window.next_index() <= index {
        let (i, value) = window.advance();
        store.put(i, Arc::clone(&value));
        last = value;
    }
    Ok(last)
}
