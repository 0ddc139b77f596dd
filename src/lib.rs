//! Steady-state power propagation in Fabry-Perot erbium-doped fiber laser cavities.
//!
//! The pump and the two counter-propagating signal powers are integrated along the
//! fiber with a fixed-step RK4 scheme, sweeping back and forth between the two cavity
//! mirrors until the reflectivity boundary conditions are self-consistent.
//!
//! To get started, refer to the `demos` directory in the main repository.

mod simulation;
mod sweep;

pub mod edfl;
pub mod prelude;

pub use simulation::{
    CavityConfig, InitialGuess, PumpDirection, RunDescriptor, SaveSettings, SaveType,
    Simulation, SimulationDescriptor, SolverSettings,
};
pub use sweep::{LasingFit, PumpSweep, PumpSweepDescriptor, SweepResult};

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {parameter} = {value} ({reason})")]
    InvalidConfiguration {
        parameter: String,
        value: f64,
        reason: &'static str,
    },
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
}

/// Manages actual computations.
pub trait Solver {
    /// Solves the cavity boundary value problem, ticking `bar` once per relaxation iteration.
    fn solve(&self, bar: &Option<indicatif::ProgressBar>) -> edfl::SolveResult;

    fn config(&self) -> &CavityConfig;
}
