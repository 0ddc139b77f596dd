use crate::edfl::{rk4, CavityState, GainMedium, PopulationModel, PowerProfile, Sweep};
use crate::{CavityConfig, Error, Solver};

/// Describes the composition of a `CavitySolver`.
pub struct CavitySolverDescriptor<M: GainMedium + PopulationModel> {
    pub medium: M,
    pub config: CavityConfig,
}

/// Steps of the double-sweep relaxation loop.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SolverState {
    FirstSweep,
    CheckFirstConvergence,
    SecondSweep,
    CheckFullConvergence,
    Converged,
    IterationLimitReached,
    Diverged,
}

/// How a solve ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SolveOutcome {
    /// The mirror boundary conditions were met within tolerance.
    Converged,
    /// The iteration cap was hit; the last profile is the best available estimate.
    IterationLimitReached,
    /// A boundary mismatch became non-finite.
    Diverged,
}

/// Boundary mismatches of the latest relaxation iteration [W].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ConvergenceMetrics {
    /// Signal mismatch at the mirror reached by the first sweep.
    pub first_signal: f64,
    /// Difference between the pump reached by the first sweep and the launched pump.
    pub pump: f64,
    /// Signal mismatch at the mirror reached by the second sweep.
    pub second_signal: f64,
    /// Number of relaxation iterations started.
    pub iterations: usize,
}

impl Default for ConvergenceMetrics {
    fn default() -> Self {
        Self {
            first_signal: f64::INFINITY,
            pump: f64::INFINITY,
            second_signal: f64::INFINITY,
            iterations: 0,
        }
    }
}

impl ConvergenceMetrics {
    /// Whether the first sweep alone already satisfies both of its boundary conditions.
    #[inline]
    pub fn first_sweep_converged(&self, tolerance: f64) -> bool {
        self.first_signal < tolerance && self.pump < tolerance
    }

    /// Whether a full iteration has converged.
    ///
    /// Either first-sweep mismatch may be left over, as long as the other one and the
    /// second-sweep mismatch are within tolerance.
    #[inline]
    pub fn converged(&self, tolerance: f64) -> bool {
        let first_unresolved = self.first_signal >= tolerance && self.pump >= tolerance;
        let second_unresolved = self.second_signal >= tolerance;

        self.is_finite() && !(first_unresolved || second_unresolved)
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.first_signal.is_finite() && self.pump.is_finite() && self.second_signal.is_finite()
    }
}

/// The steady state found by a `CavitySolver`.
#[derive(Clone, PartialEq, Debug)]
pub struct SolveResult {
    /// Power transmitted through the output mirror, `(1 - R2) Psf(L)` [W].
    pub output_power: f64,
    pub positions: ndarray::Array1<f64>,
    pub pump: ndarray::Array1<f64>,
    pub forward_signal: ndarray::Array1<f64>,
    pub backward_signal: ndarray::Array1<f64>,
    /// Ground level population along the fiber [1 / m³].
    pub n1: ndarray::Array1<f64>,
    /// Metastable level population along the fiber [1 / m³].
    pub n2: ndarray::Array1<f64>,
    pub converged: bool,
    pub iterations: usize,
    pub outcome: SolveOutcome,
    pub metrics: ConvergenceMetrics,
}

/// Solves the cavity by alternately integrating from each mirror.
pub struct CavitySolver<M: GainMedium + PopulationModel> {
    medium: M,
    config: CavityConfig,
}

impl<M: GainMedium + PopulationModel> CavitySolver<M> {
    /// Creates a solver, rejecting invalid configurations up front.
    #[inline]
    pub fn new(desc: CavitySolverDescriptor<M>) -> Result<Self, Error> {
        desc.config.validate()?;

        Ok(Self {
            medium: desc.medium,
            config: desc.config,
        })
    }

    #[inline]
    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Where the first sweep of the first iteration starts, built from the initial guess.
    fn initial_state(&self) -> CavityState {
        let guess = self.config.solver.initial_guess;
        let first = self.config.pump_direction.first_sweep();
        let z = match first {
            Sweep::Ascending => 0.0,
            Sweep::Descending => self.config.fiber_length,
        };

        let unreflected = CavityState {
            z,
            pump: guess.pump_fraction * self.config.pump_power,
            forward: guess.signal,
            backward: guess.signal,
        };
        // the start boundary is the one the reversed sweep would exit through
        self.reflect(unreflected, first.reversed())
    }

    /// The sample on the boundary a sweep finished at.
    #[inline]
    fn exit(profile: &PowerProfile, sweep: Sweep) -> CavityState {
        match sweep {
            Sweep::Ascending => profile.end(),
            Sweep::Descending => profile.start(),
        }
    }

    /// Mismatch between the signal returning from the mirror a sweep finished at and the
    /// reflection of the signal arriving there.
    #[inline]
    fn mirror_mismatch(&self, exit: &CavityState, sweep: Sweep) -> f64 {
        match sweep {
            Sweep::Ascending => (exit.backward - self.config.r2 * exit.forward).abs(),
            Sweep::Descending => (exit.forward - self.config.r1 * exit.backward).abs(),
        }
    }

    /// Replaces the returning signal at the mirror a sweep finished at with the reflection
    /// of the arriving signal.
    #[inline]
    fn reflect(&self, exit: CavityState, sweep: Sweep) -> CavityState {
        match sweep {
            Sweep::Ascending => CavityState {
                backward: self.config.r2 * exit.forward,
                ..exit
            },
            Sweep::Descending => CavityState {
                forward: self.config.r1 * exit.backward,
                ..exit
            },
        }
    }

    fn finish(
        &self,
        profile: PowerProfile,
        outcome: SolveOutcome,
        metrics: ConvergenceMetrics,
    ) -> SolveResult {
        let output_power = (1.0 - self.config.r2) * profile.end().forward;
        let (n1, n2) = self.medium.populations_along(&profile);

        SolveResult {
            output_power,
            positions: profile.positions,
            pump: profile.pump,
            forward_signal: profile.forward,
            backward_signal: profile.backward,
            n1,
            n2,
            converged: outcome == SolveOutcome::Converged,
            iterations: metrics.iterations,
            outcome,
            metrics,
        }
    }
}

impl<M: GainMedium + PopulationModel> Solver for CavitySolver<M> {
    fn solve(&self, bar: &Option<indicatif::ProgressBar>) -> SolveResult {
        let config = &self.config;
        let tolerance = config.solver.tolerance;
        let h = config.step_size();
        let nsteps = config.segments;
        let pump = config.pump_direction.propagation();
        let first = config.pump_direction.first_sweep();
        let second = first.reversed();

        let mut start = self.initial_state();
        let mut profile = PowerProfile::zeros(nsteps + 1);
        let mut metrics = ConvergenceMetrics::default();
        let mut state = SolverState::FirstSweep;

        loop {
            state = match state {
                SolverState::FirstSweep => {
                    metrics.iterations += 1;
                    if let Some(ref bar) = bar {
                        bar.inc(1)
                    }

                    profile = rk4::integrate(&self.medium, start, h, nsteps, first, pump);
                    SolverState::CheckFirstConvergence
                }
                SolverState::CheckFirstConvergence => {
                    let exit = Self::exit(&profile, first);
                    metrics.first_signal = self.mirror_mismatch(&exit, first);
                    metrics.pump = (exit.pump - config.pump_power).abs();

                    if !(metrics.first_signal.is_finite() && metrics.pump.is_finite()) {
                        SolverState::Diverged
                    } else if metrics.first_sweep_converged(tolerance) {
                        SolverState::Converged
                    } else {
                        SolverState::SecondSweep
                    }
                }
                SolverState::SecondSweep => {
                    // restart from the mirror just reached, with the pump at its launch value
                    let exit = Self::exit(&profile, first);
                    let restart = CavityState {
                        pump: config.pump_power,
                        ..self.reflect(exit, first)
                    };

                    profile = rk4::integrate(&self.medium, restart, h, nsteps, second, pump);
                    SolverState::CheckFullConvergence
                }
                SolverState::CheckFullConvergence => {
                    let exit = Self::exit(&profile, second);
                    metrics.second_signal = self.mirror_mismatch(&exit, second);
                    start = self.reflect(exit, second);

                    if !metrics.second_signal.is_finite() {
                        SolverState::Diverged
                    } else if metrics.converged(tolerance) {
                        SolverState::Converged
                    } else if metrics.iterations >= config.solver.max_iterations {
                        SolverState::IterationLimitReached
                    } else {
                        SolverState::FirstSweep
                    }
                }
                SolverState::Converged => {
                    return self.finish(profile, SolveOutcome::Converged, metrics)
                }
                SolverState::IterationLimitReached => {
                    return self.finish(profile, SolveOutcome::IterationLimitReached, metrics)
                }
                SolverState::Diverged => {
                    return self.finish(profile, SolveOutcome::Diverged, metrics)
                }
            };
        }
    }

    fn config(&self) -> &CavityConfig {
        &self.config
    }
}
