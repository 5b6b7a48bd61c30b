//! Multi-leg A* planning helper shared by the shopper and cashier FSMs.

use retailsim_core::{SimRng, Vector2};
use retailsim_nav::{AStar, NavGrid};

/// Plan a path through `start -> legs[0] -> legs[1] -> ...` by chaining
/// individual A* legs. `None` if any leg fails — per `spec.md` §7, callers
/// fall back to a direct single-waypoint path rather than propagating this.
pub fn plan_through(
    astar: &AStar,
    grid: &NavGrid,
    start: Vector2,
    legs: &[Vector2],
    agent_radius: f32,
    rng: &mut SimRng,
) -> Option<Vec<Vector2>> {
    let mut full = Vec::new();
    let mut from = start;
    for &leg in legs {
        let leg_path = astar.find_path(grid, from, leg, agent_radius, rng)?;
        full.extend(leg_path);
        from = leg;
    }
    Some(full)
}

/// Fallback used when planning fails entirely: a direct single-waypoint
/// path straight to the goal (may require anti-glitch recovery to execute).
pub fn direct_fallback(goal: Vector2) -> Vec<Vector2> {
    vec![goal]
}
