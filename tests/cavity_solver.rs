//! Integration tests: full cavity solves with the default erbium fiber.
//!
//! Reference output powers were computed independently with the same physical constants
//! and the same relaxation scheme.

use approx::assert_relative_eq;
use edfl::prelude::*;

fn solve(config: CavityConfig) -> SolveResult {
    CavitySolver::new(CavitySolverDescriptor {
        medium: ErbiumFiber::default(),
        config,
    })
    .expect("valid configuration")
    .solve(&None)
}

#[test]
fn forward_pumped_100mw_matches_reference() {
    let config = CavityConfig {
        fiber_length: 10.0,
        segments: 100,
        r1: 0.98,
        r2: 0.1,
        pump_power: 0.1,
        pump_direction: PumpDirection::Forward,
        ..Default::default()
    };
    let result = solve(config);

    assert!(result.converged);
    assert!(result.iterations <= 40);
    assert_relative_eq!(result.output_power, 54.29e-3, max_relative = 0.01);
}

#[test]
fn forward_pumped_60mw_matches_reference() {
    let result = solve(CavityConfig::new(0.06, PumpDirection::Forward));

    assert_eq!(result.outcome, SolveOutcome::Converged);
    assert_relative_eq!(result.output_power, 29.61e-3, max_relative = 0.01);
    assert_relative_eq!(
        result.output_power,
        0.9 * result.forward_signal[100],
        max_relative = 1e-12,
    );
}

#[test]
fn backward_pumped_100mw_matches_reference() {
    let result = solve(CavityConfig::new(0.1, PumpDirection::Backward));

    assert!(result.converged);
    assert_relative_eq!(result.output_power, 54.47e-3, max_relative = 0.01);
    // the pump enters at z = L and is absorbed on its way to z = 0
    assert_relative_eq!(result.pump[100], 0.1, epsilon = 1e-4);
    assert!(result.pump[0] < result.pump[100]);
}

#[test]
fn result_is_insensitive_to_grid_refinement() {
    let coarse = solve(CavityConfig::new(0.1, PumpDirection::Forward));
    let fine = solve(CavityConfig {
        segments: 1000,
        ..CavityConfig::new(0.1, PumpDirection::Forward)
    });

    assert!(fine.converged);
    assert_relative_eq!(coarse.output_power, fine.output_power, max_relative = 1e-3);
}

#[test]
fn below_threshold_output_vanishes() {
    let result = solve(CavityConfig::new(0.005, PumpDirection::Forward));

    assert!(result.converged);
    assert!(result.output_power >= 0.0);
    assert!(result.output_power < 1e-6);
}

#[test]
fn unpumped_fiber_stays_in_ground_state() {
    let result = solve(CavityConfig::new(0.0, PumpDirection::Forward));
    let ner = ErbiumFiber::default().constants.ion_concentration;

    assert!(result.converged);
    assert!(result.pump.iter().all(|&p| p == 0.0));
    for (&n1, &n2) in result.n1.iter().zip(result.n2.iter()) {
        assert_relative_eq!(n1 + n2, ner, max_relative = 1e-6);
        assert!(n1 > 0.99 * ner);
    }
}

#[test]
fn repeated_solves_are_bit_identical() {
    let config = CavityConfig::new(0.08, PumpDirection::Backward);
    let fiber = ErbiumFiber::default();
    let solver = CavitySolver::new(CavitySolverDescriptor { medium: fiber, config }).unwrap();

    let first = solver.solve(&None);
    let second = solver.solve(&None);
    let fresh = solve(config);

    assert_eq!(first, second);
    assert_eq!(first, fresh);
    assert_eq!(first.output_power.to_bits(), fresh.output_power.to_bits());
}

#[test]
fn populations_are_conserved_along_lasing_cavity() {
    let result = solve(CavityConfig::new(0.1, PumpDirection::Forward));
    let ner = ErbiumFiber::default().constants.ion_concentration;

    assert_eq!(result.n1.len(), 101);
    for (&n1, &n2) in result.n1.iter().zip(result.n2.iter()) {
        assert_relative_eq!(n1 + n2, ner, max_relative = 1e-6);
    }
    // the launch end is pumped hardest
    assert!(result.n2[0] > result.n2[100]);
}

#[test]
fn single_segment_gives_two_point_profile() {
    for pump_direction in [PumpDirection::Forward, PumpDirection::Backward] {
        let result = solve(CavityConfig {
            segments: 1,
            ..CavityConfig::new(0.1, pump_direction)
        });

        assert_eq!(result.positions.len(), 2);
        assert_eq!(result.pump.len(), 2);
        assert_eq!(result.n2.len(), 2);
        assert_eq!(result.positions[0], 0.0);
        assert_eq!(result.positions[1], 10.0);
        assert!(result.iterations <= 40);
    }
}

#[test]
fn extreme_reflectivities_are_accepted() {
    for (r1, r2) in [(0.0, 0.1), (0.98, 0.0), (1.0, 0.1), (0.98, 1.0), (0.0, 0.0), (1.0, 1.0)] {
        for pump_direction in [PumpDirection::Forward, PumpDirection::Backward] {
            let result = solve(CavityConfig {
                r1,
                r2,
                ..CavityConfig::new(0.1, pump_direction)
            });

            assert!(result.output_power.is_finite());
            assert!(result.iterations >= 1 && result.iterations <= 40);
            if r2 == 1.0 {
                assert_eq!(result.output_power, 0.0);
            }
        }
    }
}

#[test]
fn invalid_configuration_fails_fast() {
    let bad = [
        CavityConfig { fiber_length: 0.0, ..Default::default() },
        CavityConfig { segments: 0, ..Default::default() },
        CavityConfig { r1: 1.5, ..Default::default() },
        CavityConfig { r2: -0.5, ..Default::default() },
        CavityConfig { pump_power: -0.1, ..Default::default() },
    ];

    for config in bad {
        let solver = CavitySolver::new(CavitySolverDescriptor {
            medium: ErbiumFiber::default(),
            config,
        });
        assert!(matches!(solver, Err(edfl::Error::InvalidConfiguration { .. })));
    }
}
