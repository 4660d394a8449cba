use crate::error::{LemInError, LemInResult};
use crate::paths::Route;
use crate::schedule::balance;
use std::collections::HashSet;
use tracing::debug;

/// Routes that can be walked at the same time because no two share an interior room.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteGroup {
    routes: Vec<Route>,
    occupied: HashSet<String>,
}

impl RouteGroup {
    pub fn new() -> RouteGroup {
        RouteGroup::default()
    }

    /// Adds `route` unless one of its interior rooms is already used by the group.
    /// Returns whether the route was added.
    pub fn try_add(&mut self, route: &Route) -> bool {
        if route.interior().iter().any(|room| self.occupied.contains(room)) {
            return false;
        }

        self.occupied.extend(route.interior().iter().cloned());
        self.routes.push(route.clone());
        true
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of ticks needed to move `ants` ants through this group.
    pub fn required_steps(&self, ants: usize) -> usize {
        let heights: Vec<usize> = self.routes.iter().map(Route::natural_height).collect();
        balance(&heights, ants).total_steps
    }
}

/// Orders routes by length, then by their room sequence so the output is reproducible.
pub fn sort_routes(routes: &mut [Route]) {
    routes.sort_by(|a, b| {
        a.interior()
            .len()
            .cmp(&b.interior().len())
            .then_with(|| a.key().cmp(&b.key()))
    });
}

/// Builds one group per route: the group starts with that route and greedily takes
/// every later route that doesn't collide with it.
///
/// `routes` must already be sorted with [`sort_routes`].
pub fn candidate_groups(routes: &[Route]) -> Vec<RouteGroup> {
    (0..routes.len())
        .map(|anchor| {
            let mut group = RouteGroup::new();
            for route in &routes[anchor..] {
                group.try_add(route);
            }
            group
        })
        .collect()
}

/// Picks the candidate group that moves `ants` ants in the fewest ticks.
/// Ties go to the group anchored on the earliest route.
pub fn select_best_group(mut routes: Vec<Route>, ants: usize) -> LemInResult<RouteGroup> {
    // A route needs at least a start and an end room
    routes.retain(|route| route.rooms().len() >= 2);

    let endpoints = routes
        .first()
        .and_then(|route| route.rooms().first().zip(route.rooms().last()));
    let (start, end) = match endpoints {
        Some((start, end)) => (start.clone(), end.clone()),
        None => {
            return Err(LemInError::NoPathFound {
                start: String::new(),
                end: String::new(),
            })
        }
    };

    sort_routes(&mut routes);

    let mut best: Option<(usize, RouteGroup)> = None;
    for (anchor, group) in candidate_groups(&routes).into_iter().enumerate() {
        let steps = group.required_steps(ants);
        debug!(anchor, routes = group.len(), steps, "Ranked candidate group");

        // Strictly smaller keeps the earliest anchor on ties
        if best.as_ref().is_none_or(|(best_steps, _)| steps < *best_steps) {
            best = Some((steps, group));
        }
    }

    match best {
        Some((steps, group)) if !group.is_empty() => {
            debug!(routes = group.len(), steps, "Selected route group");
            Ok(group)
        }
        _ => Err(LemInError::NoPathFound { start, end }),
    }
}
