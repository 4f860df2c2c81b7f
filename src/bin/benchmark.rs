use std::time::Instant;

use rand::{distributions::Uniform, prelude::Distribution, rngs::StdRng, SeedableRng};
use spikecore::core::{create_core, RawInput};

#[path = "../scenario_params.rs"]
mod scenario_params;

fn main() {
    let mut core = create_core(scenario_params::get_scenario_params()).unwrap();

    let mut reset_input = RawInput::idle();
    reset_input.reset_n = false;
    core.tick(&reset_input);

    let mut rng = StdRng::seed_from_u64(0);
    let stimulus_dist = Uniform::new_inclusive(0u8, 100);

    let mut spike_count = 0usize;
    let mut checksum = 0usize;
    let t_stop = 1_000_000;

    let wall_start = Instant::now();

    for t in 0..t_stop {
        let input = RawInput {
            reset_n: true,
            enable: true,
            primary_in: stimulus_dist.sample(&mut rng),
            secondary_in: 0x01,
        };

        let output = core.tick(&input);

        if output.spike() {
            spike_count += 1;
            checksum += t;
        }
    }

    let wall_time = wall_start.elapsed();
    let cycle_throughput = t_stop as f64 / wall_time.as_secs_f64();

    eprintln!("Spikes per cycle: {}", spike_count as f64 / t_stop as f64);
    eprintln!(
        "Cycle throughput: {:.3e} ({:.3} ns per cycle)",
        cycle_throughput,
        1e9 / cycle_throughput
    );
    eprintln!("Checksum: {}", checksum);
    eprintln!(
        "Final state: {}",
        serde_json::to_string(&core.state_snapshot()).unwrap()
    );
}
