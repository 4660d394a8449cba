use lemin_engine::{Colony, Simulation, SolveOptions};
use std::path::Path;

fn main() {
    let colony_file = Path::new(env!("CARGO_MANIFEST_DIR")).join("examples/colonies/square.txt");
    let colony = Colony::load(&colony_file).unwrap();
    let mut simulation = Simulation::new(colony, &SolveOptions::default(), None).unwrap();

    simulation.start();
    simulation.draw().unwrap();
}
