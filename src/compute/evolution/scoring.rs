//! Selection criteria: raw fitness or novelty against an archive.

use crate::compute::{Network, NetworkError};

/// Decides what a genome's death records and which value ranks it.
pub trait ScoringStrategy {
    /// Ranking value used for sorting and gene pool sizing.
    fn score(&self, genome: &Network) -> f64;

    /// Record `signal` from the environment onto `genome`.
    ///
    /// Returns the value tracked as the running best.
    fn on_death(&mut self, genome: &mut Network, signal: f64) -> Result<f64, NetworkError>;

    /// Number of archived genomes, if the strategy keeps any.
    fn archive_size(&self) -> usize {
        0
    }
}

/// Rank genomes by the fitness the environment reports.
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessScoring;

impl ScoringStrategy for FitnessScoring {
    fn score(&self, genome: &Network) -> f64 {
        genome.fitness
    }

    fn on_death(&mut self, genome: &mut Network, signal: f64) -> Result<f64, NetworkError> {
        genome.fitness = signal;
        Ok(signal)
    }
}

/// Rank genomes by how far their weights sit from an archive of past genomes.
#[derive(Debug, Clone)]
pub struct NoveltySearch {
    threshold: f64,
    archive: Vec<Network>,
}

impl NoveltySearch {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            archive: Vec::new(),
        }
    }

    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Archived genomes, in admission order.
    pub fn archive(&self) -> &[Network] {
        &self.archive
    }

    /// Root mean square of [`weight_distance`] to every archive member.
    ///
    /// Zero when the archive is empty.
    pub fn novelty_of(&self, genome: &Network) -> Result<f64, NetworkError> {
        if self.archive.is_empty() {
            return Ok(0.0);
        }

        let mut sum_squared = 0.0;
        for member in &self.archive {
            let distance = weight_distance(genome, member)?;
            sum_squared += distance * distance;
        }
        Ok((sum_squared / self.archive.len() as f64).sqrt())
    }
}

impl ScoringStrategy for NoveltySearch {
    fn score(&self, genome: &Network) -> f64 {
        genome.novelty
    }

    fn on_death(&mut self, genome: &mut Network, signal: f64) -> Result<f64, NetworkError> {
        let novelty = self.novelty_of(genome)?;
        genome.fitness = signal;
        genome.novelty = novelty;

        // An empty archive admits the first genome so there is something to compare against.
        if self.archive.is_empty() || novelty > self.threshold {
            self.archive.push(genome.clone_fresh());
        }

        Ok(novelty)
    }

    fn archive_size(&self) -> usize {
        self.archive.len()
    }
}

/// Distance between two genomes' weights.
///
/// Each matrix contributes the square of the sum of its cellwise differences,
/// and the result is the square root of the total. Differences are summed
/// before squaring, so opposite-signed differences cancel; this is not the
/// Euclidean norm.
pub fn weight_distance(a: &Network, b: &Network) -> Result<f64, NetworkError> {
    if a.layer_count() != b.layer_count() {
        return Err(NetworkError::InvalidTopology(format!(
            "cannot compare {} layers with {} layers",
            a.layer_count(),
            b.layer_count()
        )));
    }

    let mut squared_sum = 0.0;
    for (wa, wb) in a.weights().iter().zip(b.weights()) {
        let difference = wa.difference(wb)?.sum();
        squared_sum += difference * difference;
    }
    Ok(squared_sum.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Matrix;
    use crate::schema::Topology;

    fn topology() -> Topology {
        Topology::new(2, vec![2], 1)
    }

    fn net(first: [[f64; 2]; 2], second: [f64; 2]) -> Network {
        Network::from_parts(
            &topology(),
            vec![
                Matrix::from_rows(first.iter().map(|r| r.to_vec()).collect()).unwrap(),
                Matrix::from_rows(second.iter().map(|&v| vec![v]).collect()).unwrap(),
            ],
            vec![0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_fitness_scoring() {
        let mut genome = net([[0.0; 2]; 2], [0.0; 2]);
        let recorded = FitnessScoring.on_death(&mut genome, 4.5).unwrap();
        assert_eq!(recorded, 4.5);
        assert_eq!(FitnessScoring.score(&genome), 4.5);
        assert_eq!(FitnessScoring.archive_size(), 0);
    }

    #[test]
    fn test_weight_distance_sums_before_squaring() {
        let a = net([[1.0, 0.5], [0.0, 0.0]], [0.5, 0.0]);
        let b = net([[0.0, 0.0], [0.0, 0.0]], [0.0, 0.0]);
        // (1.5)^2 + (0.5)^2
        let expected = (1.5f64 * 1.5 + 0.25).sqrt();
        assert!((weight_distance(&a, &b).unwrap() - expected).abs() < 1e-12);

        // Opposite differences inside one matrix cancel out.
        let c = net([[0.5, -0.5], [0.0, 0.0]], [0.0, 0.0]);
        assert_eq!(weight_distance(&c, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_weight_distance_rejects_mismatch() {
        let a = net([[0.0; 2]; 2], [0.0; 2]);
        let other = Network::from_parts(
            &Topology::new(3, vec![2], 1),
            vec![Matrix::zeros(3, 2), Matrix::zeros(2, 1)],
            vec![0.0, 0.0],
        )
        .unwrap();
        assert!(matches!(
            weight_distance(&a, &other),
            Err(NetworkError::Dimension(_))
        ));
    }

    #[test]
    fn test_novelty_bootstraps_archive() {
        let mut novelty = NoveltySearch::new(0.5);
        let mut genome = net([[0.2; 2]; 2], [0.1; 2]);
        genome.fitness = 3.0;

        let recorded = novelty.on_death(&mut genome, 7.0).unwrap();
        assert_eq!(recorded, 0.0);
        assert_eq!(genome.fitness, 7.0);
        assert_eq!(novelty.archive_size(), 1);
        assert_eq!(novelty.archive()[0].fitness, 0.0);
    }

    #[test]
    fn test_novelty_threshold_admission() {
        let mut novelty = NoveltySearch::new(1.0);
        let mut origin = net([[0.0; 2]; 2], [0.0; 2]);
        novelty.on_death(&mut origin, 0.0).unwrap();

        // Distance sqrt(0.4^2 + 0.2^2) stays under the threshold.
        let mut near = net([[0.1; 2]; 2], [0.1; 2]);
        let score = novelty.on_death(&mut near, 1.0).unwrap();
        assert!((score - (0.16f64 + 0.04).sqrt()).abs() < 1e-12);
        assert_eq!(near.novelty, score);
        assert_eq!(novelty.archive_size(), 1);

        // Distance sqrt(4^2 + 2^2) against the single member.
        let mut far = net([[1.0; 2]; 2], [1.0; 2]);
        let score = novelty.on_death(&mut far, 1.0).unwrap();
        assert!(score > 1.0);
        assert_eq!(novelty.archive_size(), 2);
        assert_eq!(novelty.score(&far), score);
    }

    #[test]
    fn test_novelty_is_rms_over_archive() {
        let mut novelty = NoveltySearch::new(0.0);
        let mut a = net([[0.0; 2]; 2], [0.0; 2]);
        let mut b = net([[1.0; 2]; 2], [0.0; 2]);
        novelty.on_death(&mut a, 0.0).unwrap();
        novelty.on_death(&mut b, 0.0).unwrap();
        assert_eq!(novelty.archive_size(), 2);

        // Halfway between both members.
        let probe = net([[0.5; 2]; 2], [0.0; 2]);
        let da = weight_distance(&probe, &a).unwrap();
        let db = weight_distance(&probe, &b).unwrap();
        let expected = ((da * da + db * db) / 2.0).sqrt();
        assert!((novelty.novelty_of(&probe).unwrap() - expected).abs() < 1e-12);
    }
}
