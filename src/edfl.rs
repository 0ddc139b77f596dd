pub mod physics;
pub mod rk4;

mod cavity_solver;

pub use cavity_solver::{
    CavitySolver, CavitySolverDescriptor, ConvergenceMetrics, SolveOutcome, SolveResult,
    SolverState,
};
pub use physics::{ErbiumFiber, OverlapFactors, PhysicalConstants, Populations};

/// Direction in which light travels along the fiber.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Propagation {
    /// Toward increasing `z`.
    Forward,
    /// Toward decreasing `z`.
    Backward,
}

impl Propagation {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Propagation::Forward => 1.0,
            Propagation::Backward => -1.0,
        }
    }
}

/// Direction in which an integration pass walks the grid.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Sweep {
    /// From `z = 0` up to `z = L`.
    Ascending,
    /// From `z = L` down to `z = 0`.
    Descending,
}

impl Sweep {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Sweep::Ascending => 1.0,
            Sweep::Descending => -1.0,
        }
    }

    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Sweep::Ascending => Sweep::Descending,
            Sweep::Descending => Sweep::Ascending,
        }
    }
}

/// The powers carried by the fiber at one longitudinal position.
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct CavityState {
    /// Longitudinal position [m].
    pub z: f64,
    /// Pump power [W].
    pub pump: f64,
    /// Signal power travelling toward `+z` [W].
    pub forward: f64,
    /// Signal power travelling toward `-z` [W].
    pub backward: f64,
}

impl CavityState {
    /// Moves the state by `dz`, changing each power at the given rates.
    #[inline]
    pub fn advanced(&self, rates: &PowerRates, dz: f64) -> Self {
        Self {
            z: self.z + dz,
            pump: self.pump + dz * rates.pump,
            forward: self.forward + dz * rates.forward,
            backward: self.backward + dz * rates.backward,
        }
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.pump.is_finite() && self.forward.is_finite() && self.backward.is_finite()
    }
}

/// Spatial derivatives `d/dz` of the three powers [W / m].
#[derive(Copy, Clone, PartialEq, Debug, Default)]
pub struct PowerRates {
    pub pump: f64,
    pub forward: f64,
    pub backward: f64,
}

/// Describes the local response of the doped fiber to the light passing through it.
pub trait GainMedium {
    /// Derivatives of the pump, forward signal and backward signal powers at `state`.
    ///
    /// `pump` is the direction in which the pump light travels.
    fn rates(&self, state: &CavityState, pump: Propagation) -> PowerRates;
}

impl<M: GainMedium + ?Sized> GainMedium for &M {
    #[inline]
    fn rates(&self, state: &CavityState, pump: Propagation) -> PowerRates {
        (**self).rates(state, pump)
    }
}

/// Reports the ion populations sustained by a finished set of power profiles.
pub trait PopulationModel {
    /// Ground and metastable populations `(N1, N2)` at every sample of `profile`.
    fn populations_along(
        &self,
        profile: &PowerProfile,
    ) -> (ndarray::Array1<f64>, ndarray::Array1<f64>);
}

impl<M: PopulationModel + ?Sized> PopulationModel for &M {
    #[inline]
    fn populations_along(
        &self,
        profile: &PowerProfile,
    ) -> (ndarray::Array1<f64>, ndarray::Array1<f64>) {
        (**self).populations_along(profile)
    }
}

/// Samples of one integration pass, stored in order of increasing `z`.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerProfile {
    pub positions: ndarray::Array1<f64>,
    pub pump: ndarray::Array1<f64>,
    pub forward: ndarray::Array1<f64>,
    pub backward: ndarray::Array1<f64>,
}

impl PowerProfile {
    /// Creates a zeroed profile with `npoints` grid points.
    pub fn zeros(npoints: usize) -> Self {
        Self {
            positions: ndarray::Array1::zeros(npoints),
            pump: ndarray::Array1::zeros(npoints),
            forward: ndarray::Array1::zeros(npoints),
            backward: ndarray::Array1::zeros(npoints),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn set(&mut self, index: usize, state: &CavityState) {
        self.positions[index] = state.z;
        self.pump[index] = state.pump;
        self.forward[index] = state.forward;
        self.backward[index] = state.backward;
    }

    #[inline]
    pub fn state(&self, index: usize) -> CavityState {
        CavityState {
            z: self.positions[index],
            pump: self.pump[index],
            forward: self.forward[index],
            backward: self.backward[index],
        }
    }

    /// The sample at `z = 0`.
    #[inline]
    pub fn start(&self) -> CavityState {
        self.state(0)
    }

    /// The sample at `z = L`.
    #[inline]
    pub fn end(&self) -> CavityState {
        self.state(self.len() - 1)
    }
}
