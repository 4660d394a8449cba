use crate::error::{LemInError, LemInResult};
use crate::graph::RoomGraph;
use tracing::debug;

/// A simple path through the colony, from the start room to the end room inclusive.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Route {
    rooms: Vec<String>,
}

impl Route {
    pub fn new(rooms: Vec<String>) -> Route {
        Route { rooms }
    }

    pub fn rooms(&self) -> &[String] {
        &self.rooms
    }

    /// The rooms between start and end, which are the ones that can collide with other routes.
    pub fn interior(&self) -> &[String] {
        match self.rooms.len() {
            0..=2 => &[],
            len => &self.rooms[1..len - 1],
        }
    }

    /// The rooms an ant walks into, i.e. every room after the start room.
    pub fn steps(&self) -> &[String] {
        self.rooms.get(1..).unwrap_or(&[])
    }

    /// Number of moves an ant needs from the start room to reach the end room.
    pub fn natural_height(&self) -> usize {
        self.steps().len()
    }

    /// The comma joined room sequence, used to order routes of the same length.
    pub fn key(&self) -> String {
        self.rooms.join(",")
    }
}

/// Finds every simple path from `start` to `end`.
///
/// Routes come out in the order the depth-first search reaches `end`, which follows
/// the tunnel declaration order. An unreachable `end` yields no routes.
pub fn enumerate_simple_paths(graph: &RoomGraph, start: &str, end: &str) -> Vec<Route> {
    // Without a limit the search can't fail
    search(graph, start, end, None).unwrap_or_default()
}

/// Same as [`enumerate_simple_paths`] but gives up once more than `limit` routes exist.
///
/// # Arguments
/// * `limit` - The maximum number of routes to collect.
pub fn enumerate_simple_paths_bounded(
    graph: &RoomGraph,
    start: &str,
    end: &str,
    limit: usize,
) -> LemInResult<Vec<Route>> {
    search(graph, start, end, Some(limit))
}

fn search(
    graph: &RoomGraph,
    start: &str,
    end: &str,
    limit: Option<usize>,
) -> LemInResult<Vec<Route>> {
    let mut routes = Vec::new();

    // Each frame owns the path that led to its room, so backtracking is just dropping the frame
    let mut stack: Vec<Vec<&str>> = vec![vec![start]];

    while let Some(path) = stack.pop() {
        let current = path[path.len() - 1];

        if current == end {
            if limit.is_some_and(|limit| routes.len() >= limit) {
                return Err(LemInError::RouteLimitExceeded(routes.len()));
            }
            routes.push(Route::new(path.iter().map(|room| room.to_string()).collect()));
            continue;
        }

        // Pushed in reverse so neighbors are explored in declaration order
        for neighbor in graph.neighbors(current).iter().rev() {
            if path.contains(&neighbor.as_str()) {
                continue;
            }

            let mut next = path.clone();
            next.push(neighbor.as_str());
            stack.push(next);
        }
    }

    debug!(routes = routes.len(), %start, %end, "Enumerated simple paths");

    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::HashSet;

    fn graph(rooms: &[&str], tunnels: &[(&str, &str)]) -> RoomGraph {
        let mut graph = RoomGraph::new();
        for room in rooms {
            graph.add_room(room).unwrap();
        }
        for (a, b) in tunnels {
            graph.add_tunnel(a, b).unwrap();
        }
        graph
    }

    fn rooms(route: &Route) -> Vec<&str> {
        route.rooms().iter().map(|room| room.as_str()).collect()
    }

    #[test]
    fn when_creating_a_route_its_interior_steps_and_height_are_derived() {
        let route = Route::new(vec!["s".into(), "a".into(), "b".into(), "e".into()]);

        assert_eq!(route.interior(), &["a", "b"]);
        assert_eq!(route.steps(), &["a", "b", "e"]);
        assert_eq!(route.natural_height(), 3);
        assert_eq!(route.key(), "s,a,b,e");
    }

    #[test]
    fn when_a_route_links_start_directly_to_end_it_has_no_interior() {
        let route = Route::new(vec!["s".into(), "e".into()]);

        assert!(route.interior().is_empty());
        assert_eq!(route.natural_height(), 1);
    }

    #[test]
    fn when_enumerating_paths_every_simple_path_is_found_in_neighbor_order() {
        // s - a - e
        //  \  |  /
        //     b
        let graph = graph(
            &["s", "a", "b", "e"],
            &[("s", "a"), ("s", "b"), ("a", "b"), ("a", "e"), ("b", "e")],
        );

        let routes = enumerate_simple_paths(&graph, "s", "e");
        let routes: Vec<Vec<&str>> = routes.iter().map(rooms).collect();

        assert_eq!(
            routes,
            vec![
                vec!["s", "a", "b", "e"],
                vec!["s", "a", "e"],
                vec!["s", "b", "a", "e"],
                vec!["s", "b", "e"],
            ]
        );
    }

    #[test]
    fn when_start_and_end_are_disconnected_no_paths_are_found() {
        let graph = graph(&["s", "a", "b", "e"], &[("s", "a"), ("b", "e")]);

        assert!(enumerate_simple_paths(&graph, "s", "e").is_empty());
    }

    #[test]
    fn when_start_is_adjacent_to_end_the_direct_path_is_found() {
        let graph = graph(&["s", "e"], &[("s", "e")]);

        let routes = enumerate_simple_paths(&graph, "s", "e");

        assert_eq!(routes.len(), 1);
        assert_eq!(rooms(&routes[0]), vec!["s", "e"]);
    }

    #[test]
    fn when_the_route_limit_is_exceeded_a_route_limit_error_is_returned() {
        let graph = graph(
            &["s", "a", "b", "c", "e"],
            &[("s", "a"), ("s", "b"), ("s", "c"), ("a", "e"), ("b", "e"), ("c", "e")],
        );

        let result = enumerate_simple_paths_bounded(&graph, "s", "e", 2);

        assert!(matches!(result, Err(LemInError::RouteLimitExceeded(2))));
        assert_eq!(
            enumerate_simple_paths_bounded(&graph, "s", "e", 3).unwrap().len(),
            3
        );
    }

    #[test]
    fn when_enumerating_paths_on_random_graphs_no_path_revisits_a_room_or_repeats() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let size = rng.gen_range(2..8);
            let names: Vec<String> = (0..size).map(|i| format!("r{}", i)).collect();
            let mut graph = RoomGraph::new();
            for name in &names {
                graph.add_room(name).unwrap();
            }
            for i in 0..size {
                for j in (i + 1)..size {
                    if rng.gen_bool(0.4) {
                        graph.add_tunnel(&names[i], &names[j]).unwrap();
                    }
                }
            }

            let start = &names[0];
            let end = &names[size - 1];
            let routes = enumerate_simple_paths(&graph, start, end);

            let unique: HashSet<&Route> = routes.iter().collect();
            assert_eq!(unique.len(), routes.len());

            for route in &routes {
                let visited: HashSet<&String> = route.rooms().iter().collect();
                assert_eq!(visited.len(), route.rooms().len());
                assert_eq!(&route.rooms()[0], start);
                assert_eq!(&route.rooms()[route.rooms().len() - 1], end);
                for pair in route.rooms().windows(2) {
                    assert!(graph.has_tunnel(&pair[0], &pair[1]));
                }
            }
        }
    }
}
