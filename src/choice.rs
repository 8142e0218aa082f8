//! Reproducible random selection primitives.
//!
//! Every chooser borrows the caller's RNG mutably and never touches its own
//! option table, so for a fixed stream state the same picks come out in the
//! same order. Map-backed choosers iterate in sorted key order.

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Picks one element of an ordered list with equal probability.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformChoice<T>(Vec<T>);

impl<T: Clone> UniformChoice<T> {
    pub fn new(options: Vec<T>) -> Self {
        Self(options)
    }

    pub fn options(&self) -> &[T] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Choose one option, consuming a single draw from `rng`.
    ///
    /// # Panics
    ///
    /// Panics if the option list is empty. Tables are validated when they
    /// are built, so an empty list here is a programming error.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> T {
        assert!(!self.0.is_empty(), "uniform choice over an empty option list");
        self.0[rng.gen_range(0..self.0.len())].clone()
    }
}

impl<T> From<Vec<T>> for UniformChoice<T> {
    fn from(options: Vec<T>) -> Self {
        Self(options)
    }
}

/// Picks one key with probability proportional to its integer weight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WeightedChoice<K: Ord>(BTreeMap<K, u32>);

impl<K: Ord + Clone> WeightedChoice<K> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, option: K, weight: u32) -> Option<u32> {
        self.0.insert(option, weight)
    }

    pub fn remove(&mut self, option: &K) -> Option<u32> {
        self.0.remove(option)
    }

    pub fn get(&self, option: &K) -> Option<u32> {
        self.0.get(option).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> {
        self.0.iter().map(|(k, w)| (k, *w))
    }

    pub fn total_weight(&self) -> u64 {
        self.0.values().map(|&w| u64::from(w)).sum()
    }

    /// Choose one key. A single draw in `[0, total)` is mapped onto the
    /// cumulative weight intervals, walked in key order.
    ///
    /// # Panics
    ///
    /// Panics if the total weight is zero.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> K {
        let total = self.total_weight();
        assert!(total > 0, "weighted choice with zero total weight");

        let mut draw = rng.gen_range(0..total);
        for (option, &weight) in &self.0 {
            let weight = u64::from(weight);
            if draw < weight {
                return option.clone();
            }
            draw -= weight;
        }
        unreachable!("draw is always below the total weight")
    }
}

impl<K: Ord> FromIterator<(K, u32)> for WeightedChoice<K> {
    fn from_iter<I: IntoIterator<Item = (K, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Independently includes each key with its own probability.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProbSetChoice<K: Ord>(BTreeMap<K, f64>);

impl<K: Ord + Clone> ProbSetChoice<K> {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, option: K, probability: f64) -> Option<f64> {
        self.0.insert(option, probability)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.0.iter().map(|(k, p)| (k, *p))
    }

    /// Sample the subset of included keys, one Bernoulli draw per key in
    /// key order. The result may be empty or the full key set.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<K> {
        self.0
            .iter()
            .filter_map(|(option, &probability)| {
                (rng.gen::<f64>() < probability).then(|| option.clone())
            })
            .collect()
    }
}

impl<K: Ord> FromIterator<(K, f64)> for ProbSetChoice<K> {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Choose a random non-empty subset of `options`.
///
/// The indices are shuffled and truncated to a random length in
/// `1..options.len()`, so lists of two or more never come back whole. A
/// one-element list yields that element and an empty list yields nothing.
pub fn uniform_set_choice<T: Clone, R: Rng + ?Sized>(options: &[T], rng: &mut R) -> Vec<T> {
    let mut indexes: Vec<usize> = (0..options.len()).collect();
    indexes.shuffle(rng);
    if indexes.len() > 1 {
        let keep = 1 + rng.gen_range(0..indexes.len() - 1);
        indexes.truncate(keep);
    }
    indexes.into_iter().map(|i| options[i].clone()).collect()
}
