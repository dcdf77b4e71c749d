//! Score-proportional sampling pool for crossover parents.

use super::genome::GenomeRng;

/// Upper bound on the copies a single genome contributes.
pub const MAX_COPIES: usize = u32::MAX as usize;

/// Multiset of population indices, rebuilt every generation.
///
/// Stored as `(index, copies)` runs so large scores do not allocate one
/// entry per copy. Sampling is uniform over copies, as if every copy were
/// a separate entry.
#[derive(Debug, Clone, Default)]
pub struct GenePool {
    runs: Vec<(usize, usize)>,
    total: usize,
}

impl GenePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies contributed by a genome: `round(score * multiplier)`, never
    /// negative and capped at [`MAX_COPIES`].
    pub fn copies_for(score: f64, multiplier: f64) -> usize {
        let copies = (score * multiplier).round();
        if copies.is_nan() || copies <= 0.0 {
            0
        } else if copies >= MAX_COPIES as f64 {
            MAX_COPIES
        } else {
            copies as usize
        }
    }

    /// Add `copies` entries for `index`.
    pub fn add(&mut self, index: usize, copies: usize) {
        if copies > 0 {
            self.runs.push((index, copies));
            self.total = self.total.saturating_add(copies);
        }
    }

    pub fn clear(&mut self) {
        self.runs.clear();
        self.total = 0;
    }

    /// Total entry count, repeats included.
    #[inline]
    pub fn len(&self) -> usize {
        self.total
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Entry count for one population index.
    pub fn count(&self, index: usize) -> usize {
        self.runs
            .iter()
            .filter(|(i, _)| *i == index)
            .map(|(_, n)| n)
            .sum()
    }

    /// Number of different indices present.
    pub fn distinct(&self) -> usize {
        let mut indices: Vec<usize> = self.runs.iter().map(|(i, _)| *i).collect();
        indices.sort_unstable();
        indices.dedup();
        indices.len()
    }

    /// Draw one entry uniformly.
    pub fn sample(&self, rng: &mut GenomeRng) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let mut target = rng.index(self.total);
        for &(index, copies) in &self.runs {
            if target < copies {
                return Some(index);
            }
            target -= copies;
        }
        None
    }

    /// Draw two entries holding different indices, redrawing the second
    /// until it differs.
    ///
    /// `None` when fewer than two distinct indices are present.
    pub fn draw_parents(&self, rng: &mut GenomeRng) -> Option<(usize, usize)> {
        if self.distinct() < 2 {
            return None;
        }

        let first = self.sample(rng)?;
        loop {
            let second = self.sample(rng)?;
            if second != first {
                return Some((first, second));
            }
        }
    }
}
