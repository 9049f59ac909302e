pub mod acceptance;
pub mod analysis;
pub mod error;
pub mod field;
pub mod lattice;
pub mod metropolis;
pub mod model;
pub mod observables;
pub mod partition;
pub mod simulation;
pub mod wolff;

pub use error::{Result, SimError};
pub use field::SpinField;
pub use lattice::Lattice;
pub use metropolis::Metropolis;
pub use model::{GaugeZ2, Glass, Ising, SpinModel, SquareIce, XyRotor};
pub use observables::{ObservableSeries, Summary};
pub use partition::MajorityPartition;
pub use simulation::{Algorithm, ModelKind, RunParameters, Simulation, TrialOutcome};
pub use wolff::Wolff;
