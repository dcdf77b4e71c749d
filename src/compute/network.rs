//! Fixed-topology feed-forward network: the genome being evolved.

use rand::Rng;

use super::matrix::{Matrix, MatrixError};
use crate::schema::Topology;

/// Network construction and inference errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("Invalid topology: {0}")]
    InvalidTopology(String),
    #[error("Wrong input size: network has {expected} inputs, got {actual}")]
    InputSizeMismatch { expected: usize, actual: usize },
    #[error(transparent)]
    Dimension(#[from] MatrixError),
}

/// Feed-forward network with one weight matrix and one bias per layer.
///
/// `weights[0]` maps inputs to the first hidden layer and the last matrix maps
/// the last hidden layer to the outputs. `fitness` and `novelty` are written
/// by the trainer and the environment, never by the network itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    topology: Topology,
    weights: Vec<Matrix>,
    biases: Vec<f64>,
    /// Score reported by the environment.
    pub fitness: f64,
    /// Distance to the novelty archive, when novelty search is active.
    pub novelty: f64,
}

impl Network {
    /// Randomly initialized network; weights and biases are uniform in `[-1, 1]`.
    pub fn random<R: Rng + ?Sized>(topology: &Topology, rng: &mut R) -> Result<Self, NetworkError> {
        validate_topology(topology)?;

        let mut weights = Vec::with_capacity(topology.layer_count());
        let mut biases = Vec::with_capacity(topology.layer_count());
        for (rows, cols) in topology.weight_shapes() {
            weights.push(Matrix::random(rows, cols, rng));
            biases.push(rng.gen_range(-1.0..=1.0));
        }

        Ok(Self {
            topology: topology.clone(),
            weights,
            biases,
            fitness: 0.0,
            novelty: 0.0,
        })
    }

    /// Assemble a network from existing layers, checking every shape against
    /// the topology.
    pub fn from_parts(
        topology: &Topology,
        weights: Vec<Matrix>,
        biases: Vec<f64>,
    ) -> Result<Self, NetworkError> {
        validate_topology(topology)?;

        let shapes = topology.weight_shapes();
        if weights.len() != shapes.len() || biases.len() != shapes.len() {
            return Err(NetworkError::InvalidTopology(format!(
                "expected {} weight matrices and biases, got {} and {}",
                shapes.len(),
                weights.len(),
                biases.len()
            )));
        }

        for (matrix, &expected) in weights.iter().zip(&shapes) {
            if matrix.shape() != expected {
                return Err(MatrixError::DimensionMismatch {
                    op: "assemble",
                    left: expected,
                    right: matrix.shape(),
                }
                .into());
            }
        }

        Ok(Self {
            topology: topology.clone(),
            weights,
            biases,
            fitness: 0.0,
            novelty: 0.0,
        })
    }

    /// Deep copy with `fitness` and `novelty` reset to zero.
    pub fn clone_fresh(&self) -> Self {
        Self {
            fitness: 0.0,
            novelty: 0.0,
            ..self.clone()
        }
    }

    /// Forward pass.
    ///
    /// Inputs are squashed with tanh, every layer computes
    /// `tanh(previous * W + b)`, and each output cell is then passed through
    /// its own activation.
    pub fn run(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.topology.inputs {
            return Err(NetworkError::InputSizeMismatch {
                expected: self.topology.inputs,
                actual: inputs.len(),
            });
        }

        let mut activation = Matrix::row_vector(inputs).tanh();
        for (weights, &bias) in self.weights.iter().zip(&self.biases) {
            activation = activation.multiply(weights)?.add_scalar(bias).tanh();
        }

        Ok(activation
            .row(0)
            .iter()
            .zip(&self.topology.activations)
            .map(|(&x, f)| f.apply(x))
            .collect())
    }

    /// Mutate one weight matrix in place.
    pub fn mutate_layer<R: Rng + ?Sized>(&mut self, layer: usize, rng: &mut R) {
        if let Some(matrix) = self.weights.get_mut(layer) {
            matrix.mutate(rng);
        }
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    #[inline]
    pub fn weights(&self) -> &[Matrix] {
        &self.weights
    }

    #[inline]
    pub fn biases(&self) -> &[f64] {
        &self.biases
    }

    /// Number of weight matrices (equal to the number of biases).
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.weights.len()
    }

    /// Total number of parameters (weights + biases).
    pub fn parameter_count(&self) -> usize {
        self.weights.iter().map(Matrix::len).sum::<usize>() + self.biases.len()
    }
}

/// Reject topologies a network cannot be built from.
pub fn validate_topology(topology: &Topology) -> Result<(), NetworkError> {
    if topology.hidden.is_empty() {
        return Err(NetworkError::InvalidTopology(
            "network must have at least 1 hidden layer".to_string(),
        ));
    }
    if topology.activations.len() != topology.outputs {
        return Err(NetworkError::InvalidTopology(format!(
            "{} activation functions for {} outputs",
            topology.activations.len(),
            topology.outputs
        )));
    }
    if topology.inputs == 0 || topology.outputs == 0 || topology.hidden.contains(&0) {
        return Err(NetworkError::InvalidTopology(
            "layer sizes must be non-zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Activation;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn topology() -> Topology {
        Topology::new(4, vec![5, 3], 3).with_activations(vec![
            Activation::Tanh,
            Activation::Tanh,
            Activation::Sigmoid,
        ])
    }

    #[test]
    fn test_random_network_shapes() {
        let net = Network::random(&topology(), &mut StdRng::seed_from_u64(42)).unwrap();
        let shapes: Vec<_> = net.weights().iter().map(Matrix::shape).collect();
        assert_eq!(shapes, vec![(4, 5), (5, 3), (3, 3)]);
        assert_eq!(net.biases().len(), 3);
        assert_eq!(net.parameter_count(), 20 + 15 + 9 + 3);
        assert!(net.biases().iter().all(|b| (-1.0..=1.0).contains(b)));
        assert!(
            net.weights()
                .iter()
                .flat_map(|w| w.cells())
                .all(|w| (-1.0..=1.0).contains(w))
        );
    }

    #[test]
    fn test_invalid_topology() {
        let mut rng = StdRng::seed_from_u64(0);

        let no_hidden = Topology::new(4, Vec::new(), 2);
        assert!(matches!(
            Network::random(&no_hidden, &mut rng),
            Err(NetworkError::InvalidTopology(_))
        ));

        let wrong_activations = Topology::new(4, vec![3], 2).with_activations(vec![Activation::Tanh]);
        assert!(matches!(
            Network::random(&wrong_activations, &mut rng),
            Err(NetworkError::InvalidTopology(_))
        ));

        let zero_layer = Topology::new(4, vec![3, 0], 2);
        assert!(matches!(
            Network::random(&zero_layer, &mut rng),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_run_is_deterministic() {
        let net = Network::random(&topology(), &mut StdRng::seed_from_u64(3)).unwrap();
        let inputs = [0.2, -0.7, 1.5, 0.0];

        let first = net.run(&inputs).unwrap();
        let second = net.run(&inputs).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);

        // Sigmoid channel lands in (0, 1), tanh channels in [-1, 1].
        assert!(first[2] > 0.0 && first[2] < 1.0);
        assert!(first[..2].iter().all(|x| (-1.0..=1.0).contains(x)));
    }

    #[test]
    fn test_run_input_mismatch() {
        let net = Network::random(&topology(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(
            net.run(&[1.0, 2.0]),
            Err(NetworkError::InputSizeMismatch {
                expected: 4,
                actual: 2
            })
        );
    }

    #[test]
    fn test_run_known_values() {
        let topology =
            Topology::new(1, vec![1], 1).with_activations(vec![Activation::Identity]);
        let net = Network::from_parts(
            &topology,
            vec![
                Matrix::from_rows(vec![vec![0.5]]).unwrap(),
                Matrix::from_rows(vec![vec![-1.0]]).unwrap(),
            ],
            vec![0.1, 0.2],
        )
        .unwrap();

        let hidden = (1.0f64.tanh() * 0.5 + 0.1).tanh();
        let expected = (hidden * -1.0 + 0.2).tanh();
        let output = net.run(&[1.0]).unwrap();
        assert!((output[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_from_parts_rejects_wrong_shape() {
        let topology = Topology::new(2, vec![2], 1);
        let err = Network::from_parts(
            &topology,
            vec![Matrix::zeros(2, 2), Matrix::zeros(3, 1)],
            vec![0.0, 0.0],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            NetworkError::Dimension(MatrixError::DimensionMismatch { .. })
        ));

        let err = Network::from_parts(&topology, vec![Matrix::zeros(2, 2)], vec![0.0]).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidTopology(_)));
    }

    #[test]
    fn test_clone_fresh_resets_scores() {
        let mut net = Network::random(&topology(), &mut StdRng::seed_from_u64(9)).unwrap();
        net.fitness = 12.5;
        net.novelty = 0.4;

        let mut clone = net.clone_fresh();
        assert_eq!(clone.fitness, 0.0);
        assert_eq!(clone.novelty, 0.0);
        assert_eq!(clone.weights(), net.weights());
        assert_eq!(clone.biases(), net.biases());

        // Deep copy: mutating the clone leaves the source alone.
        clone.mutate_layer(0, &mut StdRng::seed_from_u64(1));
        assert_ne!(clone.weights()[0], net.weights()[0]);
    }
}
