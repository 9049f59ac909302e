//! Lattice spin-model sampling command-line interface
//!
//! Runs Monte Carlo sampling over a temperature sweep from a YAML
//! configuration, or analyses a previously written data folder.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::SimApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    SimApplication::from_cli()?.run()
}
