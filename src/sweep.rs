use crate::edfl::{CavitySolver, CavitySolverDescriptor, GainMedium, PopulationModel, SolveOutcome};
use crate::{CavityConfig, Error, Solver};

/// Describes a series of solves that differ only in launched pump power.
pub struct PumpSweepDescriptor<'a, M: GainMedium + PopulationModel> {
    pub medium: &'a M,
    /// The cavity shared by every point; its `pump_power` is replaced.
    pub config: CavityConfig,
    /// Launched pump powers to solve for [W].
    pub pump_powers: Vec<f64>,
}

/// Output power against launched pump power.
#[derive(Clone, PartialEq, Debug)]
pub struct SweepResult {
    pub pump_powers: ndarray::Array1<f64>,
    pub output_powers: ndarray::Array1<f64>,
    pub outcomes: Vec<SolveOutcome>,
}

/// A straight-line fit to the lasing part of a pump sweep.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct LasingFit {
    /// Output power gained per unit of launched pump power.
    pub slope_efficiency: f64,
    /// Launched pump power at which the fitted line reaches zero output [W].
    pub threshold: f64,
}

/// Solves the same cavity for several launched pump powers.
pub struct PumpSweep<'a, M: GainMedium + PopulationModel> {
    medium: &'a M,
    config: CavityConfig,
    pump_powers: Vec<f64>,
}

impl<'a, M: GainMedium + PopulationModel> PumpSweep<'a, M> {
    /// Creates a new `PumpSweep`, validating every point before any solve starts.
    pub fn new(desc: PumpSweepDescriptor<'a, M>) -> Result<Self, Error> {
        for &pump_power in &desc.pump_powers {
            CavityConfig { pump_power, ..desc.config }.validate()?;
        }

        Ok(Self {
            medium: desc.medium,
            config: desc.config,
            pump_powers: desc.pump_powers,
        })
    }

    /// Runs every solve in order, optionally showing a progress bar over the points.
    pub fn run(&self, verbose: bool) -> Result<SweepResult, Error> {
        let bar = if verbose {
            println!("# of pump powers: {}", self.pump_powers.len());
            Some(indicatif::ProgressBar::new(self.pump_powers.len() as u64))
        } else {
            None
        };

        let mut output_powers = ndarray::Array1::<f64>::zeros(self.pump_powers.len());
        let mut outcomes = Vec::with_capacity(self.pump_powers.len());
        for (i, &pump_power) in self.pump_powers.iter().enumerate() {
            let solver = CavitySolver::new(CavitySolverDescriptor {
                medium: self.medium,
                config: CavityConfig { pump_power, ..self.config },
            })?;
            let result = solver.solve(&None);

            output_powers[i] = result.output_power;
            outcomes.push(result.outcome);

            if let Some(ref bar) = bar {
                bar.inc(1)
            }
        }

        if let Some(ref bar) = bar {
            bar.finish();
        }

        Ok(SweepResult {
            pump_powers: ndarray::Array1::from(self.pump_powers.clone()),
            output_powers,
            outcomes,
        })
    }
}

impl SweepResult {
    /// Fits a line through the converged points whose output exceeds 1% of the largest
    /// output. Returns `None` when fewer than two such points exist.
    pub fn lasing_fit(&self) -> Option<LasingFit> {
        let max_output = self
            .output_powers
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, outcome)| **outcome == SolveOutcome::Converged)
            .map(|(&p, _)| p)
            .fold(0.0_f64, f64::max);
        if max_output <= 0.0 {
            return None;
        }

        let points = self
            .pump_powers
            .iter()
            .zip(self.output_powers.iter())
            .zip(&self.outcomes)
            .filter(|((_, out), outcome)| {
                **outcome == SolveOutcome::Converged && **out > 0.01 * max_output
            })
            .map(|((&pump, &out), _)| (pump, out))
            .collect::<Vec<_>>();
        if points.len() < 2 {
            return None;
        }

        // least squares
        let n = points.len() as f64;
        let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
        let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
        let sxx = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum::<f64>();
        let sxy = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum::<f64>();
        if sxx == 0.0 {
            return None;
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;
        Some(LasingFit {
            slope_efficiency: slope,
            threshold: -intercept / slope,
        })
    }
}
