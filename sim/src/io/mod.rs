//! Input/Output operations for sampling runs
//!
//! This module handles logging setup and the on-disk data layout.

mod output;
mod persist;

pub use output::setup_output;
pub use persist::{majority_files, timestamp, DataStore, RunLabel, SaveOptions};
