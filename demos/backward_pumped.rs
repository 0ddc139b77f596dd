use edfl::prelude::*;

fn main() {
    let config = CavityConfig {
        fiber_length: 10.0, // [m]
        segments: 100,
        r1: 0.98,
        r2: 0.1,
        pump_power: 100e-3, // [W]
        pump_direction: PumpDirection::Backward,
        ..Default::default()
    };

    let simulation = Simulation::new(SimulationDescriptor {
        solver: CavitySolver::new(CavitySolverDescriptor {
            medium: ErbiumFiber::default(),
            config,
        })
        .unwrap(),
    })
    .unwrap();

    println!(
        "\n-- General Simulation Info --\n\
        # of segments:  {}\n\
        Δz:             {:<9.2e} m\n",
        config.segments,
        config.step_size(),
    );

    std::fs::create_dir_all("data").unwrap();
    let result = simulation
        .run(RunDescriptor {
            verbose: true,
            save_settings: Some(SaveSettings {
                filename: "data/backward_pumped.h5",
                save_type: SaveType::Full,
                overwrite: true,
            }),
        })
        .unwrap();

    println!(
        "\nPout = {:.4} mW ({} iterations, converged: {})",
        result.output_power * 1e3,
        result.iterations,
        result.converged,
    );
}
