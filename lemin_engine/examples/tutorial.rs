use lemin_engine::{format_turn, Colony, Simulation, SolveOptions};
use std::path::Path;

fn main() {
    let colony_file = Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/colonies/shortcut.txt");
    let colony = match Colony::load(&colony_file) {
        Ok(colony) => colony,
        Err(e) => panic!("Error reading colony file: {}", e),
    };

    let replay_filename = "/tmp/tutorial_replay.json".to_string();

    let mut simulation =
        match Simulation::new(colony, &SolveOptions::default(), Some(replay_filename)) {
            Ok(simulation) => simulation,
            Err(e) => panic!("Error solving colony: {}", e),
        };

    let routes: Vec<String> = simulation
        .group()
        .routes()
        .iter()
        .map(|route| route.key())
        .collect();
    println!("Routes: {:?}", routes);
    println!("Ants per route: {:?}", simulation.schedule().counts);

    // Step through the simulation one turn at a time
    let mut state = simulation.start();
    while !state.finished {
        state = match simulation.update() {
            Ok(state) => state,
            Err(e) => panic!("Error updating simulation: {}", e),
        };
        println!("{}", format_turn(&state.moves));
    }

    println!("\nAll {} ants arrived in {} turns", state.arrived, state.turn);
}
