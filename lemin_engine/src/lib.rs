//! # lemin_engine
//!
//! The core engine for the lem-in colony solver.
//! Moves a number of ants from the start room of a colony to its end room in as few
//! turns as possible, with at most one ant per room at any time.

pub mod colony;
pub use colony::Colony;

pub mod error;
pub use error::LemInError;
pub use error::LemInResult;

pub mod graph;
pub use graph::RoomGraph;

pub mod paths;
pub use paths::enumerate_simple_paths;
pub use paths::enumerate_simple_paths_bounded;
pub use paths::Route;

pub mod routes;
pub use routes::select_best_group;
pub use routes::RouteGroup;

pub mod schedule;
pub use schedule::build_schedule;
pub use schedule::format_turn;
pub use schedule::Move;
pub use schedule::Schedule;
pub use schedule::Turn;

pub mod simulation;
pub use simulation::solve;
pub use simulation::AntState;
pub use simulation::Simulation;
pub use simulation::SimulationState;
pub use simulation::Solution;
pub use simulation::SolveOptions;

pub mod render;
pub use render::Visualizer;

mod entities;
pub use entities::Ant;
pub use entities::Room;
pub use entities::RoomKind;

mod replay;
