use crate::colony::Colony;
use crate::error::{LemInError, LemInResult};
use crate::paths::{enumerate_simple_paths, enumerate_simple_paths_bounded};
use crate::render;
use crate::replay::{create_replay_logger, ReplayLogger};
use crate::routes::{select_best_group, RouteGroup};
use crate::schedule::{build_schedule, simulate, Dispatcher, Schedule, Turn};
use serde::Serialize;
use tracing::{debug, info};

/// Knobs for solving a colony.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SolveOptions {
    /// Gives up when start and end are linked by more than this many simple paths.
    /// `None` enumerates every path.
    pub max_routes: Option<usize>,
    /// Rejects colonies holding more ants than this before any work is done.
    /// Balancing costs one step per ant and route, so `None` leaves it unbounded.
    pub max_ants: Option<usize>,
}

/// Everything computed for a colony: the chosen routes, the ant distribution and the moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub group: RouteGroup,
    pub schedule: Schedule,
    pub turns: Vec<Turn>,
}

/// Finds the route group and ant distribution for a colony.
pub fn plan(colony: &Colony, options: &SolveOptions) -> LemInResult<(RouteGroup, Schedule)> {
    if let Some(limit) = options.max_ants {
        if colony.ants() > limit {
            return Err(LemInError::AntLimitExceeded(limit));
        }
    }

    let graph = colony.graph();
    let routes = match options.max_routes {
        Some(limit) => enumerate_simple_paths_bounded(graph, colony.start(), colony.end(), limit)?,
        None => enumerate_simple_paths(graph, colony.start(), colony.end()),
    };

    if routes.is_empty() {
        return Err(LemInError::NoPathFound {
            start: colony.start().to_string(),
            end: colony.end().to_string(),
        });
    }

    let group = select_best_group(routes, colony.ants())?;
    let schedule = build_schedule(&group, colony.ants())?;

    Ok((group, schedule))
}

/// Solves a colony in one go.
pub fn solve(colony: &Colony, options: &SolveOptions) -> LemInResult<Solution> {
    let (group, schedule) = plan(colony, options)?;
    let turns = simulate(&group, &schedule)?;

    info!(
        ants = colony.ants(),
        routes = group.len(),
        turns = turns.len(),
        "Solved colony"
    );

    Ok(Solution {
        group,
        schedule,
        turns,
    })
}

/// A simulation of ants crossing the colony.
/// Main entry point for stepping through a solution turn by turn.
pub struct Simulation {
    colony: Colony,
    group: RouteGroup,
    schedule: Schedule,
    dispatcher: Dispatcher,
    turn: usize,
    arrived: usize,
    last_moves: Turn,
    started: bool,
    finished: bool,
    replay_logger: Box<dyn ReplayLogger>,
}

/// Represents the state of the simulation.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationState {
    /// The current turn, 0 before any ant has moved.
    pub turn: usize,
    /// The moves made during this turn.
    pub moves: Turn,
    /// The ants walking a route, in admission order.
    pub ants: Vec<AntState>,
    /// Ants still waiting in the start room.
    pub waiting: usize,
    /// Ants that reached the end room.
    pub arrived: usize,
    /// Whether every ant reached the end room.
    pub finished: bool,
}

/// Represents an ant in the simulation state.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AntState {
    /// The identifier of the ant, e.g. `L1`.
    pub id: String,
    /// The admission number of the ant, 1 for the first ant admitted.
    pub number: usize,
    /// The index of the route the ant walks.
    pub route: usize,
    /// The room the ant stands in. `None` while it waits in the start room.
    pub room: Option<String>,
}

impl Simulation {
    /// Creates a new simulation, solving the colony up front.
    ///
    /// # Arguments
    /// * `colony` - The parsed colony.
    /// * `options` - How to solve the colony.
    /// * `replay_filename` - The filename to save the replay to. If `None`, no replay will be saved.
    pub fn new(
        colony: Colony,
        options: &SolveOptions,
        replay_filename: Option<String>,
    ) -> LemInResult<Simulation> {
        let (group, schedule) = plan(&colony, options)?;
        let dispatcher = Dispatcher::new(&group, &schedule);
        let replay_logger = create_replay_logger(replay_filename, &colony);

        Ok(Simulation {
            colony,
            group,
            schedule,
            dispatcher,
            turn: 0,
            arrived: 0,
            last_moves: Vec::new(),
            started: false,
            finished: false,
            replay_logger,
        })
    }

    /// Starts the simulation.
    ///
    /// Must be called once before updating. Calling it again replays from the beginning.
    pub fn start(&mut self) -> SimulationState {
        self.turn = 0;
        self.arrived = 0;
        self.last_moves = Vec::new();
        self.started = true;
        self.finished = false;
        self.dispatcher = Dispatcher::new(&self.group, &self.schedule);
        self.replay_logger.clear();
        self.replay_logger.log_plan(
            self.group
                .routes()
                .iter()
                .map(|route| route.rooms().to_vec())
                .collect(),
            self.schedule.clone(),
        );

        self.spawn_ants();
        self.log_turn();

        self.state()
    }

    /// Moves every ant one room forward.
    pub fn update(&mut self) -> LemInResult<SimulationState> {
        if !self.started {
            return Err(LemInError::SimulationNotStarted);
        }

        if self.finished {
            return Err(LemInError::SimulationFinished);
        }

        self.turn += 1;

        let moves = self.dispatcher.advance();
        for step in &moves {
            if step.room == self.colony.end() {
                self.arrived += 1;
                self.replay_logger
                    .log_arrive_ant(self.turn, step.ant.clone(), step.room.clone());
            } else {
                self.replay_logger
                    .log_move_ant(self.turn, step.ant.clone(), step.room.clone());
            }
        }
        self.last_moves = moves;

        self.spawn_ants();
        self.log_turn();

        if self.dispatcher.is_finished() {
            self.finished = true;
            debug!(turns = self.turn, "Simulation finished");
            self.replay_logger.save()?;
        }

        Ok(self.state())
    }

    /// Plays the simulation from the beginning and returns the moves of every turn.
    pub fn run(&mut self) -> LemInResult<Vec<Turn>> {
        let mut state = self.start();
        let mut turns = Vec::with_capacity(self.schedule.total_steps);

        while !state.finished {
            state = self.update()?;
            turns.push(state.moves.clone());
        }

        Ok(turns)
    }

    /// Draws the colony and the current ant positions to the console.
    pub fn draw(&self) -> LemInResult<()> {
        render::draw(&self.colony, &self.state())
    }

    pub fn colony(&self) -> &Colony {
        &self.colony
    }

    pub fn group(&self) -> &RouteGroup {
        &self.group
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The current state of the simulation.
    pub fn state(&self) -> SimulationState {
        SimulationState {
            turn: self.turn,
            moves: self.last_moves.clone(),
            ants: self
                .dispatcher
                .ants()
                .iter()
                .map(|ant| AntState {
                    id: ant.id(),
                    number: ant.number(),
                    route: ant.route(),
                    room: self.dispatcher.room_of(ant).map(|room| room.to_string()),
                })
                .collect(),
            waiting: self.dispatcher.waiting(),
            arrived: self.arrived,
            finished: self.finished,
        }
    }
}

impl Simulation {
    fn spawn_ants(&mut self) {
        for ant in self.dispatcher.admit() {
            self.replay_logger
                .log_spawn_ant(self.turn, ant.id(), ant.route());
        }
    }

    fn log_turn(&mut self) {
        self.replay_logger.log_turn(
            self.turn,
            self.dispatcher.ants().len(),
            self.dispatcher.waiting(),
            self.arrived,
        );
    }
}
