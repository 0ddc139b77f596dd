//! Two-level rate-equation model of an erbium-doped fiber.

use std::f64::consts::PI;

use crate::edfl::{
    CavityState, GainMedium, PopulationModel, PowerProfile, PowerRates, Propagation,
};

/// Fractions of the pump and signal mode power overlapping the doped core.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct OverlapFactors {
    pub pump: f64,
    pub signal: f64,
}

impl OverlapFactors {
    /// Overlaps used by the propagation equations.
    pub const PROPAGATION: OverlapFactors = OverlapFactors { pump: 0.64, signal: 0.43 };
    /// Overlaps used when reporting population profiles of a finished solve.
    ///
    /// These differ from [`OverlapFactors::PROPAGATION`] and are kept separate on purpose.
    pub const POPULATION_REPORT: OverlapFactors = OverlapFactors { pump: 0.81, signal: 0.6 };
}

/// Material and waveguide constants of the doped fiber.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PhysicalConstants {
    /// Pump wavelength [m].
    pub pump_wavelength: f64,
    /// Signal wavelength [m].
    pub signal_wavelength: f64,
    /// Pump absorption cross-section σ12 [m²].
    pub pump_absorption: f64,
    /// Pump emission cross-section σ21 [m²].
    pub pump_emission: f64,
    /// Signal absorption cross-section σ12 [m²].
    pub signal_absorption: f64,
    /// Signal emission cross-section σ21 [m²].
    pub signal_emission: f64,
    /// Metastable level lifetime [s].
    pub lifetime: f64,
    /// Erbium ion concentration [1 / m³].
    pub ion_concentration: f64,
    /// Doped core radius [m].
    pub core_radius: f64,
    /// Background loss at the pump wavelength [1 / m].
    pub pump_loss: f64,
    /// Background loss at the signal wavelength [1 / m].
    pub signal_loss: f64,
    pub propagation_overlap: OverlapFactors,
    pub report_overlap: OverlapFactors,
    /// Planck constant [J s].
    pub planck: f64,
    /// Speed of light in vacuum [m / s].
    pub speed_of_light: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            pump_wavelength: 980e-9,
            signal_wavelength: 1550e-9,
            pump_absorption: 2.186e-25,
            pump_emission: 0.0,
            signal_absorption: 2.57e-25,
            signal_emission: 3.41e-25,
            lifetime: 10e-3,
            ion_concentration: 1e25,
            core_radius: 2e-6,
            pump_loss: 1.15e-3,
            signal_loss: 1.15e-3,
            propagation_overlap: OverlapFactors::PROPAGATION,
            report_overlap: OverlapFactors::POPULATION_REPORT,
            planck: 6.626_070_15e-34,
            speed_of_light: 299_792_458.0,
        }
    }
}

impl PhysicalConstants {
    #[inline]
    pub fn core_area(&self) -> f64 {
        PI * self.core_radius.powi(2)
    }

    /// Energy flux per unit power at the pump wavelength, `A h ν` [J m²].
    #[inline]
    fn pump_flux_norm(&self) -> f64 {
        self.core_area() * self.planck * self.speed_of_light / self.pump_wavelength
    }

    #[inline]
    fn signal_flux_norm(&self) -> f64 {
        self.core_area() * self.planck * self.speed_of_light / self.signal_wavelength
    }
}

/// Steady-state ion populations [1 / m³].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Populations {
    /// Ground level.
    pub n1: f64,
    /// Metastable level.
    pub n2: f64,
}

/// An erbium-doped fiber described by a fixed set of [`PhysicalConstants`].
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct ErbiumFiber {
    pub constants: PhysicalConstants,
}

impl ErbiumFiber {
    #[inline]
    pub fn new(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    /// Solves the two-level population balance for the local pump power and total signal
    /// power, using the given overlap factors.
    #[inline]
    pub fn populations(&self, pump: f64, signal: f64, overlap: OverlapFactors) -> Populations {
        let c = &self.constants;

        let signal_flux = overlap.signal * signal / c.signal_flux_norm();
        let w12 = c.signal_absorption * signal_flux;
        let w21 = c.signal_emission * signal_flux;
        let r12 = c.pump_absorption * overlap.pump * pump / c.pump_flux_norm();
        let a21 = c.lifetime.recip();

        Populations {
            n1: c.ion_concentration * (w21 + a21) / (w12 + r12 + w21 + a21),
            n2: c.ion_concentration * (w12 + r12) / (w21 + a21 + w12 + r12),
        }
    }

    /// `dPp/dz` for a pump travelling in direction `pump`.
    #[inline]
    pub fn pump_derivative(&self, state: &CavityState, pump: Propagation) -> f64 {
        let c = &self.constants;
        let overlap = c.propagation_overlap;
        let pops = self.populations(state.pump, state.forward + state.backward, overlap);

        let gain = overlap.pump * (c.pump_emission * pops.n2 - c.pump_absorption * pops.n1)
            - c.pump_loss;
        pump.sign() * gain * state.pump
    }

    /// `dPsf/dz` when `signal` is forward, `dPsb/dz` when it is backward.
    #[inline]
    pub fn signal_derivative(&self, state: &CavityState, signal: Propagation) -> f64 {
        let c = &self.constants;
        let overlap = c.propagation_overlap;
        let pops = self.populations(state.pump, state.forward + state.backward, overlap);

        let gain = overlap.signal
            * (c.signal_emission * pops.n2 - c.signal_absorption * pops.n1)
            - c.signal_loss;
        let power = match signal {
            Propagation::Forward => state.forward,
            Propagation::Backward => state.backward,
        };
        signal.sign() * gain * power
    }

    /// Population profiles `(N1, N2)` along finished power profiles.
    ///
    /// Uses the report overlap factors, not the propagation ones.
    pub fn population_density(
        &self,
        pump: ndarray::ArrayView1<f64>,
        backward: ndarray::ArrayView1<f64>,
        forward: ndarray::ArrayView1<f64>,
    ) -> (ndarray::Array1<f64>, ndarray::Array1<f64>) {
        let overlap = self.constants.report_overlap;
        let mut n1 = ndarray::Array1::<f64>::zeros(pump.len());
        let mut n2 = ndarray::Array1::<f64>::zeros(pump.len());

        ndarray::Zip::from(&mut n1)
            .and(&mut n2)
            .and(&pump)
            .and(&backward)
            .and(&forward)
            .for_each(|n1, n2, &pp, &psb, &psf| {
                let pops = self.populations(pp, psf + psb, overlap);
                *n1 = pops.n1;
                *n2 = pops.n2;
            });

        (n1, n2)
    }
}

impl GainMedium for ErbiumFiber {
    #[inline]
    fn rates(&self, state: &CavityState, pump: Propagation) -> PowerRates {
        PowerRates {
            pump: self.pump_derivative(state, pump),
            forward: self.signal_derivative(state, Propagation::Forward),
            backward: self.signal_derivative(state, Propagation::Backward),
        }
    }
}

impl PopulationModel for ErbiumFiber {
    fn populations_along(
        &self,
        profile: &PowerProfile,
    ) -> (ndarray::Array1<f64>, ndarray::Array1<f64>) {
        ErbiumFiber::population_density(
            self,
            profile.pump.view(),
            profile.backward.view(),
            profile.forward.view(),
        )
    }
}
