//! Fair selection without replacement
//!
//! Both operations shuffle a copy of the input with a uniform Fisher–Yates
//! pass, so every permutation is equally likely. Selecting the first `k` of
//! that permutation makes every k-subset, and every reveal order within it,
//! equally likely too.

use rand::prelude::*;

/// Entertainment-grade random source for draws
pub struct Sampler {
    rng: StdRng,
}

impl Sampler {
    /// Seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence, for rehearsals and tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Reseed in place
    pub fn seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }

    /// Permuted copy of `items`; the input is untouched
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        out.shuffle(&mut self.rng);
        out
    }

    /// Split a shuffled copy of `pool` into `(selected, remainder)`.
    ///
    /// `k` saturates at `pool.len()`; selection order is the draw order.
    pub fn sample_without_replacement<T: Clone>(
        &mut self,
        pool: &[T],
        k: usize,
    ) -> (Vec<T>, Vec<T>) {
        let k = k.min(pool.len());
        let mut shuffled = self.shuffle(pool);
        let remainder = shuffled.split_off(k);
        (shuffled, remainder)
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut v: Vec<u32>) -> Vec<u32> {
        v.sort_unstable();
        v
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut sampler = Sampler::seeded(7);
        let items = vec![5, 1, 1, 9, 3, 3, 3, 0];

        for _ in 0..50 {
            let out = sampler.shuffle(&items);
            assert_eq!(sorted(out), sorted(items.clone()));
        }
        assert_eq!(items, vec![5, 1, 1, 9, 3, 3, 3, 0]);
    }

    #[test]
    fn test_two_element_shuffle_is_balanced() {
        let mut sampler = Sampler::seeded(20260101);
        let trials = 10_000;
        let swapped = (0..trials)
            .filter(|_| sampler.shuffle(&['a', 'b']) == ['b', 'a'])
            .count();

        // Binomial(10000, 0.5): sd = 50, allow ~6 sd
        assert!((4700..=5300).contains(&swapped), "swapped {swapped} of {trials}");
    }

    #[test]
    fn test_sample_splits_pool() {
        let mut sampler = Sampler::seeded(3);
        let pool: Vec<u32> = (0..10).collect();

        let (selected, remainder) = sampler.sample_without_replacement(&pool, 4);

        assert_eq!(selected.len(), 4);
        assert_eq!(remainder.len(), 6);
        let mut all = selected.clone();
        all.extend(remainder);
        assert_eq!(sorted(all), pool);
    }

    #[test]
    fn test_oversized_k_saturates() {
        let mut sampler = Sampler::seeded(3);
        let (selected, remainder) = sampler.sample_without_replacement(&[1, 2, 3], 10);
        assert_eq!(selected.len(), 3);
        assert!(remainder.is_empty());

        let (none, _) = sampler.sample_without_replacement::<u32>(&[], 2);
        assert!(none.is_empty());
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let pool: Vec<u32> = (0..30).collect();
        let a = Sampler::seeded(99).sample_without_replacement(&pool, 5).0;
        let b = Sampler::seeded(99).sample_without_replacement(&pool, 5).0;
        assert_eq!(a, b);
    }
}
