//! pf-deck: simulator input decks and batch invocation.
//!
//! Provides:
//! - diameters (binary-log spaced vent diameter lists)
//! - grid (cartesian parameter grids and named run specs)
//! - deck (input deck rendering and writing)
//! - runner (simulator invocation under a wall-clock timeout)

pub mod deck;
pub mod diameters;
pub mod error;
pub mod grid;
pub mod runner;

pub use deck::{InputDeck, VentProperties, deck_file_name, output_file_name, write_decks};
pub use diameters::{binary_log_diameters, linspace};
pub use error::{DeckError, DeckResult};
pub use grid::{ParameterGrid, RunSpec};
pub use runner::{BatchReport, FailedRun, RunFailure, SimulatorRunner};
