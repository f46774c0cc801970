//! Core types and configuration for the grid ecosystem simulation.

pub mod types;
pub mod config;
pub mod error;
pub mod species;
pub mod validation;

pub use error::{Error, Result};
pub use types::*;
pub use config::*;
pub use species::*;
pub use validation::validate_config;
