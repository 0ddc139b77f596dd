use std::path::Path;

use crate::edfl::{Propagation, SolveResult, Sweep};
use crate::{Error, Solver};

/// Which end of the cavity the pump is launched into.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PumpDirection {
    /// The pump enters at `z = 0`, behind the high reflector.
    Forward,
    /// The pump enters at `z = L`, behind the output coupler.
    Backward,
}

impl PumpDirection {
    /// The direction the pump light travels in.
    #[inline]
    pub fn propagation(self) -> Propagation {
        match self {
            PumpDirection::Forward => Propagation::Forward,
            PumpDirection::Backward => Propagation::Backward,
        }
    }

    /// The first integration pass of each relaxation iteration.
    ///
    /// It starts at the end opposite the pump, so it finishes where the pump power is known.
    #[inline]
    pub fn first_sweep(self) -> Sweep {
        match self {
            PumpDirection::Forward => Sweep::Descending,
            PumpDirection::Backward => Sweep::Ascending,
        }
    }
}

/// Starting values for the first integration pass.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct InitialGuess {
    /// Pump power at the far end, as a fraction of the launched pump power.
    pub pump_fraction: f64,
    /// Signal power leaving the far end [W].
    pub signal: f64,
}

impl Default for InitialGuess {
    fn default() -> Self {
        Self {
            pump_fraction: 0.1,
            signal: 1e-3,
        }
    }
}

/// Controls the relaxation loop.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SolverSettings {
    /// Largest accepted boundary mismatch [W].
    pub tolerance: f64,
    /// Number of relaxation iterations after which the best estimate is returned.
    pub max_iterations: usize,
    pub initial_guess: InitialGuess,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_iterations: 40,
            initial_guess: InitialGuess::default(),
        }
    }
}

/// Describes the laser cavity.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CavityConfig {
    /// Length of the doped fiber [m].
    pub fiber_length: f64,
    /// Number of integration steps along the fiber.
    pub segments: usize,
    /// Reflectivity of the mirror at `z = 0`.
    pub r1: f64,
    /// Reflectivity of the output mirror at `z = L`.
    pub r2: f64,
    /// Launched pump power [W].
    pub pump_power: f64,
    pub pump_direction: PumpDirection,
    pub solver: SolverSettings,
}

impl Default for CavityConfig {
    fn default() -> Self {
        Self {
            fiber_length: 10.0,
            segments: 100,
            r1: 0.98,
            r2: 0.1,
            pump_power: 0.1,
            pump_direction: PumpDirection::Forward,
            solver: SolverSettings::default(),
        }
    }
}

impl CavityConfig {
    /// The default cavity pumped with `pump_power` watts from the given end.
    pub fn new(pump_power: f64, pump_direction: PumpDirection) -> Self {
        Self {
            pump_power,
            pump_direction,
            ..Default::default()
        }
    }

    /// The physical size of each integration step.
    #[inline]
    pub fn step_size(&self) -> f64 {
        self.fiber_length / (self.segments as f64)
    }

    /// Checks every parameter before any integration is done.
    pub fn validate(&self) -> Result<(), Error> {
        fn invalid(parameter: &str, value: f64, reason: &'static str) -> Result<(), Error> {
            Err(Error::InvalidConfiguration {
                parameter: parameter.to_string(),
                value,
                reason,
            })
        }

        if !(self.fiber_length.is_finite() && self.fiber_length > 0.0) {
            return invalid("fiber_length", self.fiber_length, "must be positive and finite");
        }
        if self.segments == 0 {
            return invalid("segments", 0.0, "must be at least one");
        }
        for (parameter, value) in [("r1", self.r1), ("r2", self.r2)] {
            if !(0.0..=1.0).contains(&value) {
                return invalid(parameter, value, "reflectivity must lie in [0, 1]");
            }
        }
        if !(self.pump_power.is_finite() && self.pump_power >= 0.0) {
            return invalid("pump_power", self.pump_power, "must be non-negative and finite");
        }

        let settings = &self.solver;
        if !(settings.tolerance.is_finite() && settings.tolerance > 0.0) {
            return invalid("tolerance", settings.tolerance, "must be positive and finite");
        }
        if settings.max_iterations == 0 {
            return invalid("max_iterations", 0.0, "must be at least one");
        }
        let guess = &settings.initial_guess;
        if !(guess.pump_fraction.is_finite() && guess.pump_fraction >= 0.0) {
            return invalid("pump_fraction", guess.pump_fraction, "must be non-negative and finite");
        }
        if !(guess.signal.is_finite() && guess.signal >= 0.0) {
            return invalid("signal", guess.signal, "must be non-negative and finite");
        }

        Ok(())
    }
}

/// Describes a simulation.
pub struct SimulationDescriptor<S: Solver> {
    /// The `Solver` for the simulation.
    pub solver: S,
}

/// Describes a simulation run.
pub struct RunDescriptor<P: AsRef<Path>> {
    /// Whether or not to print information to the console.
    pub verbose: bool,
    /// What, if any, information to save to file.
    pub save_settings: Option<SaveSettings<P>>,
}

/// How data should be saved to file.
#[derive(Debug)]
pub struct SaveSettings<P: AsRef<Path>> {
    /// The path to the save file.
    pub filename: P,
    /// What information to save.
    pub save_type: SaveType,
    /// Whether or not to overwrite any previously saved runs.
    pub overwrite: bool,
}

/// Represents what data to save.
#[derive(PartialEq, Debug)]
pub enum SaveType {
    /// Save every profile at every grid point.
    Full,
    /// Save the powers at the two cavity ends only.
    End,
}

/// The main `struct` of the framework.
pub struct Simulation<S: Solver> {
    solver: S,
}

impl<S: Solver> Simulation<S> {
    /// Creates a new `Simulation` instance.
    #[inline]
    pub fn new(desc: SimulationDescriptor<S>) -> Result<Self, Error> {
        desc.solver.config().validate()?;

        Ok(Self {
            solver: desc.solver,
        })
    }

    #[inline]
    pub fn config(&self) -> &CavityConfig {
        self.solver.config()
    }

    /// Does a computational run.
    pub fn run<P: AsRef<Path>>(&self, desc: RunDescriptor<P>) -> Result<SolveResult, Error> {
        let config = self.solver.config();

        // setup output if verbose
        let bar = if desc.verbose {
            println!(
                "\n-- Cavity --\n\
                pump:         {:<9.3e} W ({:?})\n\
                length:       {:<9.3} m\n\
                segments:     {}\n\
                R1 / R2:      {} / {}\n",
                config.pump_power,
                config.pump_direction,
                config.fiber_length,
                config.segments,
                config.r1,
                config.r2,
            );
            Some(indicatif::ProgressBar::new(config.solver.max_iterations as u64))
        } else {
            None
        };

        let result = self.solver.solve(&bar);

        if let Some(ref bar) = bar {
            bar.finish();
            println!(
                "{:?} after {} iterations, output power {:.4e} W",
                result.outcome, result.iterations, result.output_power,
            );
        }

        if let Some(ref settings) = desc.save_settings {
            save(settings, config, &result)?;
        }

        Ok(result)
    }
}

/// Writes `result` into a new `run_<k>` group of the settings' file.
fn save<P: AsRef<Path>>(
    settings: &SaveSettings<P>,
    config: &CavityConfig,
    result: &SolveResult,
) -> Result<(), Error> {
    let filename = settings.filename.as_ref();
    let file = if filename.exists() && !settings.overwrite {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };

    let run_index = file.member_names()?.len();
    let group = file.create_group(&format!("run_{}", run_index))?;

    // save scalars as group attributes
    let scalars = [
        ("output_power", result.output_power),
        ("fiber_length", config.fiber_length),
        ("launched_pump", config.pump_power),
        ("r1", config.r1),
        ("r2", config.r2),
    ];
    for (name, value) in scalars {
        group.new_attr::<f64>()
            .shape(hdf5::Extents::Scalar)
            .create(name)?
            .write_scalar(&value)?;
    }
    group.new_attr::<u64>()
        .shape(hdf5::Extents::Scalar)
        .create("iterations")?
        .write_scalar(&(result.iterations as u64))?;
    group.new_attr::<u8>()
        .shape(hdf5::Extents::Scalar)
        .create("converged")?
        .write_scalar(&u8::from(result.converged))?;

    match settings.save_type {
        SaveType::Full => {
            let profiles = [
                ("position", &result.positions),
                ("pump", &result.pump),
                ("forward_signal", &result.forward_signal),
                ("backward_signal", &result.backward_signal),
                ("n1", &result.n1),
                ("n2", &result.n2),
            ];
            for (name, data) in profiles {
                group.new_dataset::<f64>()
                    .shape(data.len())
                    .create(name)?
                    .write(data.view())?;
            }
        }
        SaveType::End => {
            let last = result.positions.len() - 1;
            let profiles = [
                ("pump", &result.pump),
                ("forward_signal", &result.forward_signal),
                ("backward_signal", &result.backward_signal),
            ];
            for (name, data) in profiles {
                let ends = ndarray::arr1(&[data[0], data[last]]);
                group.new_dataset::<f64>()
                    .shape(2_usize)
                    .create(name)?
                    .write(ends.view())?;
            }
        }
    }

    file.close()?;
    Ok(())
}
