use edfl::prelude::*;
use edfl::{PumpSweep, PumpSweepDescriptor};

fn main() {
    let fiber = ErbiumFiber::default();

    // launched pump from 0 to 150 mW
    let pump_powers = (0..=30).map(|i| i as f64 * 5e-3).collect::<Vec<_>>();

    let sweep = PumpSweep::new(PumpSweepDescriptor {
        medium: &fiber,
        config: CavityConfig::new(0.0, PumpDirection::Forward),
        pump_powers,
    })
    .unwrap();

    let result = sweep.run(true).unwrap();

    println!("\n  Pp [mW]   Pout [mW]   outcome");
    for ((pump, out), outcome) in result
        .pump_powers
        .iter()
        .zip(result.output_powers.iter())
        .zip(&result.outcomes)
    {
        println!("{:>8.1}  {:>10.4}   {:?}", pump * 1e3, out * 1e3, outcome);
    }

    match result.lasing_fit() {
        Some(fit) => println!(
            "\nthreshold:        {:.2} mW\nslope efficiency: {:.1} %",
            fit.threshold * 1e3,
            fit.slope_efficiency * 100.0,
        ),
        None => println!("\nno lasing points"),
    }
}
