//! Seeded random inputs for the three visualizers.
//!
//! Sizes are clamped into each algorithm's bounds before sampling, so any
//! requested size yields a valid input.

use rand::{rngs::StdRng, seq::SliceRandom as _, Rng as _, SeedableRng};
use std::collections::HashSet;

use crate::{
    closest_pair::{Point, POINTS},
    inversions::{SIZE, VALUE_MAX},
    karatsuba::{max_operand, KaratsubaInput, DIGITS},
};

/// Grid used to reject near-duplicate points.
const GRID: f64 = 1000.0;

/// A seeded RNG, or one drawn from OS entropy when `seed` is `None`.
#[must_use]
pub fn rng_from(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64)
}

/// `n` points in the unit square with pairwise distinct grid cells.
///
/// `n` is clamped into [`POINTS`].
pub fn random_points(n: usize, rng: &mut StdRng) -> Vec<Point> {
    let n = POINTS.clamp(n);
    let mut seen = HashSet::with_capacity(n);
    let mut out = Vec::with_capacity(n);
    while out.len() < n {
        let p = Point::new(rng.random::<f64>(), rng.random::<f64>());
        // Truncation onto the grid is the collision key.
        #[allow(clippy::cast_possible_truncation)]
        let key = ((p.x * GRID) as i64, (p.y * GRID) as i64);
        if seen.insert(key) {
            out.push(p);
        }
    }
    out
}

/// `n` distinct values from `1..=VALUE_MAX` in random order.
///
/// `n` is clamped into [`SIZE`].
pub fn random_values(n: usize, rng: &mut StdRng) -> Vec<u32> {
    let n = SIZE.clamp(n);
    let mut pool: Vec<u32> = (1..=VALUE_MAX).collect();
    pool.shuffle(rng);
    pool.truncate(n);
    pool
}

/// Two random operands below `10^digits`.
///
/// `digits` is clamped into [`DIGITS`].
pub fn random_operands(digits: usize, rng: &mut StdRng) -> KaratsubaInput {
    let digits = DIGITS.clamp(digits);
    let cap = max_operand(digits);
    KaratsubaInput::new(
        rng.random_range(0..=cap),
        rng.random_range(0..=cap),
        digits,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = random_points(12, &mut rng_from(Some(7)));
        let b = random_points(12, &mut rng_from(Some(7)));
        assert_eq!(a, b);
        assert_eq!(
            random_values(10, &mut rng_from(Some(3))),
            random_values(10, &mut rng_from(Some(3)))
        );
    }

    #[test]
    fn sizes_are_clamped() {
        let mut rng = rng_from(Some(1));
        assert_eq!(random_points(0, &mut rng).len(), 2);
        assert_eq!(random_points(500, &mut rng).len(), 60);
        assert_eq!(random_values(1, &mut rng).len(), 2);
        assert_eq!(random_values(100, &mut rng).len(), 30);
        assert_eq!(random_operands(40, &mut rng).digits, 12);
    }

    #[test]
    fn values_are_unique_and_in_range() {
        let v = random_values(30, &mut rng_from(Some(11)));
        let set: HashSet<u32> = v.iter().copied().collect();
        assert_eq!(set.len(), v.len());
        assert!(v.iter().all(|&x| (1..=VALUE_MAX).contains(&x)));
    }

    #[test]
    fn operands_fit_digit_count() {
        let mut rng = rng_from(Some(5));
        for _ in 0..50 {
            let k = random_operands(3, &mut rng);
            assert!(k.x <= 999 && k.y <= 999);
        }
    }
}
