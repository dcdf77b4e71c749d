//! Network shape descriptor supplied by the environment.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, optional, required};

/// Scalar post-processing applied to one output channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    /// Leave the value in tanh range.
    #[default]
    Tanh,
    /// Logistic squash into `(0, 1)`.
    Sigmoid,
    /// Pass through unchanged.
    Identity,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Tanh => x.tanh(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Identity => x,
        }
    }
}

impl FromStr for Activation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tanh" => Ok(Activation::Tanh),
            "sigmoid" | "logistic" => Ok(Activation::Sigmoid),
            "identity" | "linear" => Ok(Activation::Identity),
            other => Err(format!("unknown activation '{other}'")),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Activation::Tanh => "tanh",
            Activation::Sigmoid => "sigmoid",
            Activation::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// Fixed network topology for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Number of network inputs.
    pub inputs: usize,
    /// Neurons per hidden layer, in order.
    pub hidden: Vec<usize>,
    /// Number of network outputs.
    pub outputs: usize,
    /// One activation per output channel.
    pub activations: Vec<Activation>,
}

impl Topology {
    /// Topology with every output left in tanh range.
    pub fn new(inputs: usize, hidden: Vec<usize>, outputs: usize) -> Self {
        Self {
            inputs,
            hidden,
            outputs,
            activations: vec![Activation::Tanh; outputs],
        }
    }

    /// Replace the per-output activations.
    pub fn with_activations(mut self, activations: Vec<Activation>) -> Self {
        self.activations = activations;
        self
    }

    /// Shapes of the weight matrices, input side first.
    ///
    /// Empty when there are no hidden layers.
    pub fn weight_shapes(&self) -> Vec<(usize, usize)> {
        let Some(&last) = self.hidden.last() else {
            return Vec::new();
        };

        let mut shapes = Vec::with_capacity(self.hidden.len() + 1);
        let mut previous = self.inputs;
        for &size in &self.hidden {
            shapes.push((previous, size));
            previous = size;
        }
        shapes.push((last, self.outputs));
        shapes
    }

    /// Number of weight matrices (and biases): hidden layers plus the output layer.
    pub fn layer_count(&self) -> usize {
        if self.hidden.is_empty() {
            0
        } else {
            self.hidden.len() + 1
        }
    }

    /// Read `inputsAmount`, `neuronsInHiddenLayerCount`, `outputsAmount` and
    /// the optional `activations` list from a flat configuration map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let inputs: usize = required(map, "inputsAmount")?;
        let outputs: usize = required(map, "outputsAmount")?;
        let hidden_raw: String = required(map, "neuronsInHiddenLayerCount")?;
        let hidden = parse_list(&hidden_raw, "neuronsInHiddenLayerCount")?;

        let activations = match optional::<String>(map, "activations")? {
            Some(raw) => parse_list(&raw, "activations")?,
            None => vec![Activation::Tanh; outputs],
        };

        Ok(Self {
            inputs,
            hidden,
            outputs,
            activations,
        })
    }
}

fn parse_list<T: FromStr>(raw: &str, key: &str) -> Result<Vec<T>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_weight_shapes_chain() {
        let topology = Topology::new(5, vec![4, 3], 2);
        assert_eq!(topology.weight_shapes(), vec![(5, 4), (4, 3), (3, 2)]);
        assert_eq!(topology.layer_count(), 3);
        assert!(Topology::new(5, Vec::new(), 2).weight_shapes().is_empty());
    }

    #[test]
    fn test_activation_apply() {
        assert_eq!(Activation::Identity.apply(0.3), 0.3);
        assert_eq!(Activation::Sigmoid.apply(0.0), 0.5);
        assert!((Activation::Tanh.apply(0.5) - 0.5f64.tanh()).abs() < 1e-12);
    }

    #[test]
    fn test_from_map() {
        let topology = Topology::from_map(&map(&[
            ("inputsAmount", "6"),
            ("neuronsInHiddenLayerCount", "8, 4"),
            ("outputsAmount", "3"),
            ("activations", "tanh,tanh,sigmoid"),
        ]))
        .unwrap();

        assert_eq!(topology.hidden, vec![8, 4]);
        assert_eq!(
            topology.activations,
            vec![Activation::Tanh, Activation::Tanh, Activation::Sigmoid]
        );
    }

    #[test]
    fn test_from_map_defaults_to_tanh() {
        let topology = Topology::from_map(&map(&[
            ("inputsAmount", "2"),
            ("neuronsInHiddenLayerCount", "3"),
            ("outputsAmount", "2"),
        ]))
        .unwrap();
        assert_eq!(topology.activations, vec![Activation::Tanh; 2]);
    }

    #[test]
    fn test_from_map_rejects_bad_activation() {
        let err = Topology::from_map(&map(&[
            ("inputsAmount", "2"),
            ("neuronsInHiddenLayerCount", "3"),
            ("outputsAmount", "1"),
            ("activations", "softmax"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "activations"));
    }

    #[test]
    fn test_serialization() {
        let topology = Topology::new(3, vec![4], 2)
            .with_activations(vec![Activation::Tanh, Activation::Sigmoid]);
        let json = serde_json::to_string(&topology).unwrap();
        assert!(json.contains("\"sigmoid\""));
        let parsed: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, topology);
    }
}
