//! Genome manipulation utilities for the generational trainer.
//!
//! Provides random generation, crossover, and mutation operations.

use rand::prelude::*;

use crate::compute::{Network, NetworkError};
use crate::schema::Topology;

/// Random number generator wrapper for genome operations.
///
/// One instance drives every random draw of a training run.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create with random seed.
    pub fn random() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generate a randomly initialized network.
    pub fn random_network(&mut self, topology: &Topology) -> Result<Network, NetworkError> {
        Network::random(topology, &mut self.rng)
    }

    /// Weighted coin flip.
    #[inline]
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.r#gen::<f64>() < probability
    }

    /// Uniform index in `0..len`.
    #[inline]
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    /// Produce two children from two parents.
    ///
    /// For every weight position a single coin flip (`first_parent_chance`
    /// for the first parent) picks which parent's whole matrix both children
    /// inherit. Biases get their own independent flips. The shared draw makes
    /// the two children identical.
    pub fn crossover(
        &mut self,
        first: &Network,
        second: &Network,
        first_parent_chance: f64,
    ) -> Result<[Network; 2], NetworkError> {
        let layers = first.layer_count();

        let weights: Vec<_> = (0..layers)
            .map(|w| {
                let parent = if self.chance(first_parent_chance) {
                    first
                } else {
                    second
                };
                parent.weights()[w].clone()
            })
            .collect();

        let biases: Vec<_> = (0..layers)
            .map(|b| {
                let parent = if self.chance(first_parent_chance) {
                    first
                } else {
                    second
                };
                parent.biases()[b]
            })
            .collect();

        let child = Network::from_parts(first.topology(), weights, biases)?;
        Ok([child.clone(), child])
    }

    /// Mutate each weight matrix with probability `rate`.
    ///
    /// Returns how many matrices were touched.
    pub fn mutate(&mut self, network: &mut Network, rate: f64) -> usize {
        let mut mutated = 0;
        for layer in 0..network.layer_count() {
            if self.chance(rate) {
                network.mutate_layer(layer, &mut self.rng);
                mutated += 1;
            }
        }
        mutated
    }
}
