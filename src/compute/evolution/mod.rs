//! Generational neuroevolution of fixed-topology networks.
//!
//! # Overview
//!
//! - **Genome Operations** (`genome`): seeded random source, crossover, and mutation
//! - **Gene Pool** (`gene_pool`): score-proportional parent sampling
//! - **Scoring** (`scoring`): raw fitness or novelty against an archive
//! - **Controller** (`controller`): the per-genome evaluation cycle and repopulation
//! - **Stats** (`stats`): append-only CSV log of every generation
//!
//! # Example
//!
//! ```rust,no_run
//! use neat_trainer::compute::Network;
//! use neat_trainer::compute::evolution::{Environment, PopulationController};
//! use neat_trainer::schema::{Topology, TrainerConfig};
//!
//! struct Sandbox;
//!
//! impl Environment for Sandbox {
//!     fn assign_genome(&mut self, _genome: &Network) {}
//! }
//!
//! let mut controller =
//!     PopulationController::new(TrainerConfig::default(), Topology::new(3, vec![6], 2)).unwrap();
//! let mut env = Sandbox;
//! controller.start(&mut env).unwrap();
//!
//! while controller.generation() <= 10 {
//!     let outputs = controller.current_genome().unwrap().run(&[0.1, 0.2, 0.3]).unwrap();
//!     controller.death(outputs[0], &mut env).unwrap();
//! }
//! println!("best fitness: {:.3}", controller.best_score());
//! ```

mod controller;
mod gene_pool;
mod genome;
mod scoring;
mod stats;

pub use controller::{Environment, GenerationProgress, PopulationController, TrainerError};
pub use gene_pool::GenePool;
pub use genome::GenomeRng;
pub use scoring::{FitnessScoring, NoveltySearch, ScoringStrategy, weight_distance};
pub use stats::StatsLog;
