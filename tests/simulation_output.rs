//! Integration tests: driving a solve through `Simulation` and saving it to HDF5.

use std::path::PathBuf;

use approx::assert_relative_eq;
use edfl::prelude::*;

fn scratch_file(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("edfl_{}_{}.h5", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn simulation(config: CavityConfig) -> Simulation<CavitySolver<ErbiumFiber>> {
    Simulation::new(SimulationDescriptor {
        solver: CavitySolver::new(CavitySolverDescriptor {
            medium: ErbiumFiber::default(),
            config,
        })
        .unwrap(),
    })
    .unwrap()
}

#[test]
fn run_without_saving_matches_direct_solve() {
    let config = CavityConfig::new(0.06, PumpDirection::Forward);
    let sim = simulation(config);

    let result = sim
        .run(RunDescriptor::<PathBuf> {
            verbose: false,
            save_settings: None,
        })
        .unwrap();

    let direct = CavitySolver::new(CavitySolverDescriptor {
        medium: ErbiumFiber::default(),
        config,
    })
    .unwrap()
    .solve(&None);
    assert_eq!(result, direct);
    assert_eq!(sim.config(), &config);
}

#[test]
fn full_save_writes_profiles_and_scalars() -> Result<(), edfl::Error> {
    let path = scratch_file("full");
    let sim = simulation(CavityConfig::new(0.1, PumpDirection::Forward));

    let result = sim.run(RunDescriptor {
        verbose: false,
        save_settings: Some(SaveSettings {
            filename: &path,
            save_type: SaveType::Full,
            overwrite: true,
        }),
    })?;

    let file = hdf5::File::open(&path)?;
    let run = file.group("run_0")?;
    assert_eq!(run.attr("output_power")?.read_scalar::<f64>()?, result.output_power);
    assert_eq!(run.attr("iterations")?.read_scalar::<u64>()?, result.iterations as u64);
    assert_eq!(run.attr("converged")?.read_scalar::<u8>()?, 1);
    assert_eq!(run.attr("r2")?.read_scalar::<f64>()?, 0.1);

    let pump = run.dataset("pump")?.read_1d::<f64>()?;
    assert_eq!(pump, result.pump);
    let n2 = run.dataset("n2")?.read_1d::<f64>()?;
    assert_eq!(n2.len(), 101);
    let position = run.dataset("position")?.read_1d::<f64>()?;
    assert_relative_eq!(position[100], 10.0, epsilon = 1e-9);

    file.close()?;
    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn appended_runs_get_their_own_groups() -> Result<(), edfl::Error> {
    let path = scratch_file("append");

    for (i, pump_power) in [0.06, 0.1].iter().enumerate() {
        let sim = simulation(CavityConfig::new(*pump_power, PumpDirection::Backward));
        sim.run(RunDescriptor {
            verbose: false,
            save_settings: Some(SaveSettings {
                filename: &path,
                save_type: SaveType::End,
                overwrite: i == 0,
            }),
        })?;
    }

    let file = hdf5::File::open(&path)?;
    assert_eq!(file.member_names()?.len(), 2);

    let second = file.group("run_1")?;
    assert_eq!(second.attr("launched_pump")?.read_scalar::<f64>()?, 0.1);
    let pump = second.dataset("pump")?.read_1d::<f64>()?;
    assert_eq!(pump.len(), 2);
    // backward pumping: the launched pump sits at z = L
    assert_relative_eq!(pump[1], 0.1, epsilon = 1e-4);
    assert!(second.dataset("n1").is_err());

    file.close()?;
    std::fs::remove_file(&path).ok();
    Ok(())
}

#[test]
fn default_constants_match_codata() {
    let constants = PhysicalConstants::default();

    assert_relative_eq!(
        constants.planck,
        physical_constants::PLANCK_CONSTANT,
        max_relative = 1e-12,
    );
    assert_relative_eq!(
        constants.speed_of_light,
        physical_constants::SPEED_OF_LIGHT_IN_VACUUM,
        max_relative = 1e-12,
    );
}
