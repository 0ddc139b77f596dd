//! Classical fourth-order Runge-Kutta stepping along the fiber.

use crate::edfl::{CavityState, GainMedium, PowerProfile, PowerRates, Propagation, Sweep};

/// Advances `state` by one step of length `h` in the direction of `sweep`.
///
/// Every stage is evaluated at the consistently extrapolated intermediate state, so a
/// slope that depends on `z` alone is integrated exactly up to cubic order.
#[inline]
pub fn step<M: GainMedium + ?Sized>(
    medium: &M,
    state: &CavityState,
    h: f64,
    sweep: Sweep,
    pump: Propagation,
) -> CavityState {
    let dz = sweep.sign() * h;

    let k1 = medium.rates(state, pump);
    let k2 = medium.rates(&state.advanced(&k1, dz / 2.0), pump);
    let k3 = medium.rates(&state.advanced(&k2, dz / 2.0), pump);
    let k4 = medium.rates(&state.advanced(&k3, dz), pump);

    let slope = PowerRates {
        pump: (k1.pump + 2.0 * k2.pump + 2.0 * k3.pump + k4.pump) / 6.0,
        forward: (k1.forward + 2.0 * k2.forward + 2.0 * k3.forward + k4.forward) / 6.0,
        backward: (k1.backward + 2.0 * k2.backward + 2.0 * k3.backward + k4.backward) / 6.0,
    };
    state.advanced(&slope, dz)
}

/// Integrates from `start` across `nsteps` steps, storing every grid point in position order.
///
/// `start` must sit on the boundary the sweep leaves from.
pub fn integrate<M: GainMedium + ?Sized>(
    medium: &M,
    start: CavityState,
    h: f64,
    nsteps: usize,
    sweep: Sweep,
    pump: Propagation,
) -> PowerProfile {
    let mut profile = PowerProfile::zeros(nsteps + 1);
    let index = |k: usize| match sweep {
        Sweep::Ascending => k,
        Sweep::Descending => nsteps - k,
    };

    let mut state = start;
    profile.set(index(0), &state);
    for k in 1..=nsteps {
        state = step(medium, &state, h, sweep, pump);
        profile.set(index(k), &state);
    }

    profile
}
