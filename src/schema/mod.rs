//! Schema module - Configuration, topology, and persisted genome types.

mod config;
mod genome_file;
mod topology;

pub use config::*;
pub use genome_file::*;
pub use topology::*;
