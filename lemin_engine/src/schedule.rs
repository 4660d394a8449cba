use crate::entities::Ant;
use crate::error::{LemInError, LemInResult};
use crate::routes::RouteGroup;
use serde::Serialize;
use tracing::{debug, trace};

/// How many ants walk each route of a group and how long it takes them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Schedule {
    /// Ticks until the last ant reaches the end room.
    pub total_steps: usize,
    /// Ants assigned to each route, in group order.
    pub counts: Vec<usize>,
}

/// Result of spreading ants over routes of the given natural heights.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Balance {
    pub counts: Vec<usize>,
    /// The tick at which the last ant of each route arrives.
    pub heights: Vec<usize>,
    pub total_steps: usize,
}

/// Spreads `ants` over routes so the last arrival happens as early as possible.
///
/// A route of natural height `h` walked by `n` ants finishes at tick `h + n - 1`, so each
/// ant goes to the route that currently finishes first (earliest route on ties). Routes
/// that are too long to pay off end up with no ants.
pub fn balance(natural_heights: &[usize], ants: usize) -> Balance {
    let mut counts = vec![0; natural_heights.len()];
    let mut heights: Vec<usize> = natural_heights
        .iter()
        .map(|height| height.saturating_sub(1))
        .collect();

    for _ in 0..ants {
        let Some(route) = index_of_min(&heights) else {
            break;
        };
        counts[route] += 1;
        heights[route] += 1;
    }

    let total_steps = heights
        .iter()
        .zip(&counts)
        .filter(|(_, count)| **count > 0)
        .map(|(height, _)| *height)
        .max()
        .unwrap_or(0);

    Balance {
        counts,
        heights,
        total_steps,
    }
}

/// Computes the ant distribution for the winning group.
pub fn build_schedule(group: &RouteGroup, ants: usize) -> LemInResult<Schedule> {
    let Some(first) = group.routes().first() else {
        return Err(LemInError::NoPathFound {
            start: String::new(),
            end: String::new(),
        });
    };
    if first.natural_height() == 0 {
        return Err(LemInError::InvariantViolation(format!(
            "route {} has no room to move into",
            first.key()
        )));
    }

    let heights: Vec<usize> = group.routes().iter().map(|route| route.natural_height()).collect();
    let Balance {
        counts,
        total_steps,
        ..
    } = balance(&heights, ants);

    let assigned: usize = counts.iter().sum();
    if assigned != ants {
        return Err(LemInError::InvariantViolation(format!(
            "{} of {} ants were assigned a route",
            assigned, ants
        )));
    }

    debug!(?counts, total_steps, "Built schedule");

    Ok(Schedule {
        total_steps,
        counts,
    })
}

/// One ant moving into one room.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Move {
    pub ant: String,
    pub room: String,
}

impl Move {
    pub fn new(ant: &str, room: &str) -> Move {
        Move {
            ant: ant.to_string(),
            room: room.to_string(),
        }
    }
}

/// The moves made during one tick, in ant admission order.
pub type Turn = Vec<Move>;

/// Renders a turn as a line of the output, e.g. `L1-end L2-a`.
pub fn format_turn(turn: &[Move]) -> String {
    turn.iter()
        .map(|step| format!("{}-{}", step.ant, step.room))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Moves ants along the routes of a group according to a schedule, one tick at a time.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    routes: Vec<Vec<String>>,
    remaining: Vec<usize>,
    ants: Vec<Ant>,
    admitted: usize,
}

impl Dispatcher {
    pub fn new(group: &RouteGroup, schedule: &Schedule) -> Dispatcher {
        Dispatcher {
            routes: group
                .routes()
                .iter()
                .map(|route| route.steps().to_vec())
                .collect(),
            remaining: schedule.counts.clone(),
            ants: Vec::new(),
            admitted: 0,
        }
    }

    /// Sends one waiting ant onto every route that still has ants to carry.
    /// Returns the ants that were admitted.
    pub fn admit(&mut self) -> Vec<Ant> {
        let mut admitted = Vec::new();

        for (route, remaining) in self.remaining.iter_mut().enumerate() {
            if *remaining == 0 {
                continue;
            }

            *remaining -= 1;
            self.admitted += 1;
            let ant = Ant::new(self.admitted, route);
            admitted.push(ant.clone());
            self.ants.push(ant);
        }

        admitted
    }

    /// Advances every active ant one room, retires the ones that reached the end room
    /// and admits the next ants.
    pub fn tick(&mut self) -> Turn {
        let turn = self.advance();
        self.admit();

        trace!(moves = turn.len(), active = self.ants.len(), "Ticked");

        turn
    }

    /// Moves every active ant one room forward and retires the ones that reached the end room.
    pub fn advance(&mut self) -> Turn {
        let mut turn = Vec::with_capacity(self.ants.len());

        for ant in self.ants.iter_mut() {
            let room = &self.routes[ant.route()][ant.position()];
            turn.push(Move::new(&ant.id(), room));
            ant.advance();
        }

        let routes = &self.routes;
        self.ants
            .retain(|ant| ant.position() < routes[ant.route()].len());

        turn
    }

    /// Ants currently walking a route, in admission order.
    pub fn ants(&self) -> &[Ant] {
        &self.ants
    }

    /// The room an active ant currently stands in, or `None` if it is still in the start room.
    pub fn room_of(&self, ant: &Ant) -> Option<&str> {
        match ant.position() {
            0 => None,
            position => self.routes[ant.route()]
                .get(position - 1)
                .map(|room| room.as_str()),
        }
    }

    /// Ants still waiting in the start room for a route.
    pub fn waiting(&self) -> usize {
        self.remaining.iter().sum()
    }

    pub fn is_finished(&self) -> bool {
        self.ants.is_empty() && self.waiting() == 0
    }
}

/// Plays a whole schedule and returns the moves of every tick.
pub fn simulate(group: &RouteGroup, schedule: &Schedule) -> LemInResult<Vec<Turn>> {
    let mut dispatcher = Dispatcher::new(group, schedule);
    let mut turns = Vec::with_capacity(schedule.total_steps);

    dispatcher.admit();
    while !dispatcher.is_finished() {
        let turn = dispatcher.tick();
        if turn.is_empty() {
            return Err(LemInError::InvariantViolation(format!(
                "{} ants are stuck in the start room",
                dispatcher.waiting()
            )));
        }
        turns.push(turn);
    }

    Ok(turns)
}

fn index_of_min(values: &[usize]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        // `min_by_key` returns the first minimum, which keeps ties on the earliest route
        .min_by_key(|(_, value)| **value)
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::Route;

    fn group(routes: &[&[&str]]) -> RouteGroup {
        let mut group = RouteGroup::new();
        for rooms in routes {
            let route = Route::new(rooms.iter().map(|room| room.to_string()).collect());
            assert!(group.try_add(&route));
        }
        group
    }

    fn lines(turns: &[Turn]) -> Vec<String> {
        turns.iter().map(|turn| format_turn(turn)).collect()
    }

    #[test]
    fn when_balancing_ants_over_equal_routes_they_are_split_evenly() {
        let balance = balance(&[3, 3], 4);

        assert_eq!(balance.counts, vec![2, 2]);
        assert_eq!(balance.heights, vec![4, 4]);
        assert_eq!(balance.total_steps, 4);
    }

    #[test]
    fn when_balancing_ants_ties_go_to_the_earliest_route() {
        let balance = balance(&[2, 2, 2], 4);

        assert_eq!(balance.counts, vec![2, 1, 1]);
        assert_eq!(balance.total_steps, 3);
    }

    #[test]
    fn when_balancing_fewer_ants_than_routes_long_routes_stay_empty() {
        let balance = balance(&[2, 5], 3);

        assert_eq!(balance.counts, vec![3, 0]);
        assert_eq!(balance.total_steps, 4);
    }

    #[test]
    fn when_balancing_the_used_routes_finish_within_one_tick_of_each_other() {
        let balance = balance(&[2, 3, 4, 6], 17);

        let used: Vec<usize> = balance
            .heights
            .iter()
            .zip(&balance.counts)
            .filter(|(_, count)| **count > 0)
            .map(|(height, _)| *height)
            .collect();
        let max = *used.iter().max().unwrap();
        let min = *used.iter().min().unwrap();

        assert!(max - min <= 1);
        assert_eq!(balance.total_steps, max);
        assert_eq!(balance.counts.iter().sum::<usize>(), 17);
    }

    #[test]
    fn when_building_a_schedule_for_an_empty_group_a_no_path_found_error_is_returned() {
        let result = build_schedule(&RouteGroup::new(), 3);

        assert!(matches!(result, Err(LemInError::NoPathFound { .. })));
    }

    #[test]
    fn when_building_a_schedule_twice_the_result_is_the_same() {
        let group = group(&[&["s", "a", "e"], &["s", "b", "c", "e"]]);

        let first = build_schedule(&group, 7).unwrap();
        let second = build_schedule(&group, 7).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.counts.iter().sum::<usize>(), 7);
    }

    #[test]
    fn when_scheduling_a_single_route_the_ants_are_funneled_one_per_tick() {
        let group = group(&[&["start", "a", "end"]]);
        let schedule = build_schedule(&group, 3).unwrap();

        let turns = simulate(&group, &schedule).unwrap();

        assert_eq!(schedule.total_steps, 4);
        assert_eq!(
            lines(&turns),
            vec!["L1-a", "L1-end L2-a", "L2-end L3-a", "L3-end"]
        );
    }

    #[test]
    fn when_scheduling_two_equal_routes_four_ants_take_one_extra_tick() {
        let group = group(&[&["s", "a", "b", "e"], &["s", "c", "d", "e"]]);
        let schedule = build_schedule(&group, 4).unwrap();

        let turns = simulate(&group, &schedule).unwrap();

        assert_eq!(schedule.counts, vec![2, 2]);
        assert_eq!(schedule.total_steps, 4);
        assert_eq!(
            lines(&turns),
            vec![
                "L1-a L2-c",
                "L1-b L2-d L3-a L4-c",
                "L1-e L2-e L3-b L4-d",
                "L3-e L4-e",
            ]
        );
    }

    #[test]
    fn when_start_is_adjacent_to_end_each_ant_takes_its_own_tick() {
        let group = group(&[&["s", "e"]]);
        let schedule = build_schedule(&group, 5).unwrap();

        let turns = simulate(&group, &schedule).unwrap();

        assert_eq!(schedule.total_steps, 5);
        assert_eq!(turns.len(), 5);
        assert!(turns.iter().all(|turn| turn.len() == 1));
    }

    #[test]
    fn when_one_ant_is_scheduled_it_takes_the_route_height() {
        let group = group(&[&["s", "a", "b", "e"]]);
        let schedule = build_schedule(&group, 1).unwrap();

        let turns = simulate(&group, &schedule).unwrap();

        assert_eq!(schedule.total_steps, 3);
        assert_eq!(lines(&turns), vec!["L1-a", "L1-b", "L1-e"]);
    }

    #[test]
    fn when_simulating_the_number_of_turns_matches_the_schedule() {
        let group = group(&[&["s", "a", "e"], &["s", "b", "c", "d", "e"]]);
        let schedule = build_schedule(&group, 9).unwrap();

        let turns = simulate(&group, &schedule).unwrap();

        assert_eq!(turns.len(), schedule.total_steps);
        let arrivals = turns
            .iter()
            .flatten()
            .filter(|step| step.room == "e")
            .count();
        assert_eq!(arrivals, 9);
    }

    #[test]
    fn when_simulating_no_interior_room_ever_holds_two_ants() {
        let group = group(&[&["s", "a", "b", "e"], &["s", "c", "e"], &["s", "d", "f", "g", "e"]]);
        let schedule = build_schedule(&group, 12).unwrap();

        let mut dispatcher = Dispatcher::new(&group, &schedule);
        dispatcher.admit();
        while !dispatcher.is_finished() {
            dispatcher.tick();

            let mut occupied: Vec<&str> = dispatcher
                .ants()
                .iter()
                .filter_map(|ant| dispatcher.room_of(ant))
                .collect();
            let total = occupied.len();
            occupied.sort();
            occupied.dedup();
            assert_eq!(occupied.len(), total);
        }
    }

    #[test]
    fn when_formatting_a_turn_moves_are_joined_by_spaces() {
        let turn = vec![Move::new("L1", "end"), Move::new("L2", "a")];

        assert_eq!(format_turn(&turn), "L1-end L2-a");
        assert_eq!(format_turn(&[]), "");
    }
}
