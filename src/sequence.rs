//! Bar sequences for the sorting sketches.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::rng;

/// One sortable bar.
///
/// `index` is the bar's identity (its slot before shuffling) and never
/// changes; `value` is its height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub index: usize,
    pub value: u32,
}

/// Wrap raw values as bars, numbering them in input order.
pub fn bars_from_values(values: &[u32]) -> Vec<Bar> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| Bar { index, value })
        .collect()
}

/// Bars with heights `1..=count`, shuffled by `seed`.
pub fn shuffled_bars(count: usize, seed: u64) -> Vec<Bar> {
    let mut bars: Vec<Bar> = (0..count)
        .map(|index| Bar {
            index,
            value: index as u32 + 1,
        })
        .collect();
    shuffle(&mut bars, seed);
    bars
}

/// Reorder `bars` in place; the same seed always yields the same order.
pub fn shuffle(bars: &mut [Bar], seed: u64) {
    let mut rng = rng::seeded(seed);
    bars.shuffle(&mut rng);
}

/// Largest value in the sequence (0 when empty).
pub fn max_value(bars: &[Bar]) -> u32 {
    bars.iter().map(|b| b.value).max().unwrap_or(0)
}

/// True when values never decrease left to right.
pub fn is_sorted(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].value <= w[1].value)
}

pub fn values(bars: &[Bar]) -> Vec<u32> {
    bars.iter().map(|b| b.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffled_is_permutation() {
        let bars = shuffled_bars(50, 9);
        let mut vals = values(&bars);
        vals.sort_unstable();
        assert_eq!(vals, (1..=50).collect::<Vec<u32>>());
    }

    #[test]
    fn shuffle_is_deterministic() {
        assert_eq!(shuffled_bars(30, 42), shuffled_bars(30, 42));
        assert_ne!(shuffled_bars(30, 42), shuffled_bars(30, 43));
    }

    #[test]
    fn sortedness() {
        assert!(is_sorted(&bars_from_values(&[])));
        assert!(is_sorted(&bars_from_values(&[1, 1, 2])));
        assert!(!is_sorted(&bars_from_values(&[2, 1])));
        assert_eq!(max_value(&bars_from_values(&[3, 9, 4])), 9);
    }
}
