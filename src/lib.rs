//! NEAT-style generational trainer for fixed-topology feed-forward networks.
//!
//! An external environment drives one genome at a time and reports a score
//! when the agent dies. After every genome of a generation has been scored,
//! the trainer sorts, clones elites, crosses over parents drawn from a
//! score-proportional gene pool, mutates, and refills with random genomes.
//!
//! # Architecture
//!
//! The crate is split into two main modules:
//!
//! - `schema`: Trainer configuration, network topology, and the genome file codec
//! - `compute`: Matrix algebra, forward propagation, and the evolutionary controller
//!
//! # Example
//!
//! ```rust,no_run
//! use neat_trainer::{
//!     compute::{Network, evolution::{Environment, PopulationController}},
//!     schema::{Activation, GenomeFile, Topology, TrainerConfig},
//! };
//!
//! struct Agent;
//!
//! impl Environment for Agent {
//!     fn assign_genome(&mut self, _genome: &Network) {}
//! }
//!
//! let topology = Topology::new(5, vec![8, 6], 3)
//!     .with_activations(vec![Activation::Tanh, Activation::Tanh, Activation::Sigmoid]);
//! let mut controller = PopulationController::new(TrainerConfig::default(), topology).unwrap();
//! let mut agent = Agent;
//! controller.start(&mut agent).unwrap();
//!
//! for _ in 0..100 {
//!     let genome = controller.current_genome().unwrap();
//!     let outputs = genome.run(&[0.0, 0.5, 1.0, 0.5, 0.0]).unwrap();
//!     controller.death(outputs.iter().sum(), &mut agent).unwrap();
//! }
//!
//! if let Some(best) = controller.champion() {
//!     GenomeFile::from_network(best).save("best.json").unwrap();
//! }
//! ```

pub mod compute;
pub mod schema;

// Re-export commonly used types
pub use compute::evolution::{Environment, PopulationController, TrainerError};
pub use compute::{Matrix, Network};
pub use schema::{Topology, TrainerConfig};
