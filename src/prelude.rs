//! Includes commonly used library components.

pub use crate::{
    CavityConfig,
    InitialGuess,
    PumpDirection,
    RunDescriptor,
    SaveSettings,
    SaveType,
    Simulation,
    SimulationDescriptor,
    Solver,
    SolverSettings,
};
pub use crate::edfl::{
    CavitySolver, CavitySolverDescriptor, ErbiumFiber, GainMedium, PhysicalConstants,
    PopulationModel, SolveOutcome, SolveResult,
};
