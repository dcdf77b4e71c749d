//! Compute module - Matrix algebra, networks, and the evolutionary trainer.

mod matrix;
mod network;

pub mod evolution;

pub use matrix::*;
pub use network::{Network, NetworkError, validate_topology};
