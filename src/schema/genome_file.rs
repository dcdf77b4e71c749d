//! Textual genome encoding and the persisted genome file.
//!
//! Cells and biases are stored as decimal strings. Rust's float formatting
//! emits the shortest string that parses back to the same bits, so a
//! round trip reproduces every value exactly.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Topology;
use crate::compute::{Matrix, MatrixError, Network, NetworkError};

/// Genome codec errors.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("No genome source supplied to deserialize from")]
    MissingGenomeSource,
    #[error("Weight {layer} cell ({row}, {col}) is not a number: '{value}'")]
    MalformedCell {
        layer: usize,
        row: usize,
        col: usize,
        value: String,
    },
    #[error("Bias {index} is not a number: '{value}'")]
    MalformedBias { index: usize, value: String },
    #[error("Encoded genome has no weight matrices or no biases")]
    EmptyEncoding,
    #[error("Weight {layer} has an invalid shape: {source}")]
    ShapeMismatch { layer: usize, source: MatrixError },
    #[error("Encoded genome does not fit the topology: {0}")]
    Network(#[from] NetworkError),
    #[error("Genome file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Genome file I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Weights and biases of one network as nested decimal strings.
///
/// Topology is not stored here; it comes from the consumer at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenomeEncoding {
    /// One entry per weight matrix, each a list of rows of cells.
    pub weights: Vec<Vec<Vec<String>>>,
    /// One bias per layer.
    pub biases: Vec<String>,
}

impl GenomeEncoding {
    /// Encode a network's parameters.
    pub fn from_network(network: &Network) -> Self {
        let weights = network
            .weights()
            .iter()
            .map(|matrix| {
                matrix
                    .iter_rows()
                    .map(|row| row.iter().map(f64::to_string).collect())
                    .collect()
            })
            .collect();
        let biases = network.biases().iter().map(f64::to_string).collect();

        Self { weights, biases }
    }

    /// Rebuild a network, inferring each matrix shape from the nesting and
    /// checking it against `topology`.
    pub fn decode(&self, topology: &Topology) -> Result<Network, CodecError> {
        if self.weights.is_empty() || self.biases.is_empty() {
            return Err(CodecError::EmptyEncoding);
        }

        let mut weights = Vec::with_capacity(self.weights.len());
        for (layer, rows) in self.weights.iter().enumerate() {
            let parsed = rows
                .iter()
                .enumerate()
                .map(|(row, cells)| {
                    cells
                        .iter()
                        .enumerate()
                        .map(|(col, value)| {
                            value.parse::<f64>().map_err(|_| CodecError::MalformedCell {
                                layer,
                                row,
                                col,
                                value: value.clone(),
                            })
                        })
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?;

            let matrix = Matrix::from_rows(parsed)
                .map_err(|source| CodecError::ShapeMismatch { layer, source })?;
            weights.push(matrix);
        }

        let biases = self
            .biases
            .iter()
            .enumerate()
            .map(|(index, value)| {
                value.parse::<f64>().map_err(|_| CodecError::MalformedBias {
                    index,
                    value: value.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Network::from_parts(topology, weights, biases)?)
    }
}

/// A persisted network: encoding plus the shape metadata needed to run it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenomeFile {
    /// Shape of the stored network.
    pub topology: Topology,
    /// Fitness the genome reached when it was saved.
    pub fitness: f64,
    /// Encoded parameters.
    pub genome: GenomeEncoding,
}

impl GenomeFile {
    /// Snapshot a network.
    pub fn from_network(network: &Network) -> Self {
        Self {
            topology: network.topology().clone(),
            fitness: network.fitness,
            genome: GenomeEncoding::from_network(network),
        }
    }

    /// Rebuild the runnable network; the stored fitness is carried over.
    pub fn to_network(&self) -> Result<Network, CodecError> {
        let mut network = self.genome.decode(&self.topology)?;
        network.fitness = self.fitness;
        Ok(network)
    }

    /// Write as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CodecError> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a genome file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CodecError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Read from an optional source, failing when none is supplied.
    pub fn load_source(source: Option<&Path>) -> Result<Self, CodecError> {
        let path = source.ok_or(CodecError::MissingGenomeSource)?;
        Self::load(path)
    }

    /// File name embedding the integer part of the fitness.
    pub fn file_name(&self) -> String {
        format!("network_fit{}.json", self.fitness.trunc() as i64)
    }
}
