//! 8-connected A* over a [`NavGrid`], with corridor-aware path smoothing
//! (`spec.md` §4.2).

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use retailsim_core::{SimRng, Vector2};

use crate::grid::NavGrid;

/// Hard cap on node expansions, guaranteeing termination on pathological
/// grids (`spec.md` §4.2).
const MAX_EXPANSIONS: usize = 5_000;
/// Radius searched for a walkable substitute when start/goal lands on a
/// blocked cell (`spec.md` §4.2 "goal/start repair").
const REPAIR_SEARCH_RADIUS: f32 = 5.0;

/// Path planner over a [`NavGrid`]. Stateless — holds no per-query data, so
/// one instance is shared by every shopper.
pub struct AStar {
    pub smoothing: bool,
}

impl Default for AStar {
    fn default() -> Self {
        Self { smoothing: true }
    }
}

impl AStar {
    pub fn new(smoothing: bool) -> Self {
        Self { smoothing }
    }

    /// Find a path from `start` to `goal`. Returns waypoint centers
    /// (smoothed if `self.smoothing`), or `None` if no path is found within
    /// the expansion budget. `rng` resolves tie-breaks between equal
    /// f-scores, per `spec.md` §9 (every stochastic choice, including
    /// tie-breaking, must consume from the single seeded RNG).
    pub fn find_path(
        &self,
        grid: &NavGrid,
        start: Vector2,
        goal: Vector2,
        agent_radius: f32,
        rng: &mut SimRng,
    ) -> Option<Vec<Vector2>> {
        let start = self.repair(grid, start)?;
        let goal = self.repair(grid, goal)?;

        let (sx, sz) = grid.world_to_cell(start);
        let (gx, gz) = grid.world_to_cell(goal);
        if (sx, sz) == (gx, gz) {
            return Some(vec![goal]);
        }

        let raw = self.search(grid, (sx, sz), (gx, gz), rng)?;
        let waypoints: Vec<Vector2> = raw.into_iter().map(|(x, z)| grid.cell_center(x, z)).collect();

        if self.smoothing {
            Some(smooth_path(grid, &waypoints, agent_radius))
        } else {
            Some(waypoints)
        }
    }

    fn repair(&self, grid: &NavGrid, p: Vector2) -> Option<Vector2> {
        let (gx, gz) = grid.world_to_cell(p);
        if grid.is_walkable(gx, gz) {
            Some(p)
        } else {
            grid.find_nearest_walkable(p, REPAIR_SEARCH_RADIUS)
        }
    }

    fn search(
        &self,
        grid: &NavGrid,
        start: (usize, usize),
        goal: (usize, usize),
        rng: &mut SimRng,
    ) -> Option<Vec<(usize, usize)>> {
        let w = grid.gw;
        let idx = |x: usize, z: usize| z * w + x;

        let mut g_score = vec![f32::INFINITY; grid.gw * grid.gd];
        let mut came_from = vec![None; grid.gw * grid.gd];
        let mut open = BinaryHeap::new();
        let mut closed = vec![false; grid.gw * grid.gd];

        g_score[idx(start.0, start.1)] = 0.0;
        open.push(HeapEntry {
            f: heuristic(start, goal),
            tie: rng.gen_range(0..u32::MAX),
            pos: start,
        });

        let mut expansions = 0usize;
        while let Some(HeapEntry { pos, .. }) = open.pop() {
            if closed[idx(pos.0, pos.1)] {
                continue;
            }
            if pos == goal {
                return Some(reconstruct(&came_from, goal, w));
            }
            closed[idx(pos.0, pos.1)] = true;

            expansions += 1;
            if expansions > MAX_EXPANSIONS {
                return None;
            }

            for (nx, nz, step_cost) in neighbors(grid, pos) {
                let ni = idx(nx, nz);
                if closed[ni] {
                    continue;
                }
                let tentative = g_score[idx(pos.0, pos.1)] + step_cost * grid.cost(nx, nz);
                if tentative < g_score[ni] {
                    g_score[ni] = tentative;
                    came_from[ni] = Some(pos);
                    open.push(HeapEntry {
                        f: tentative + heuristic((nx, nz), goal),
                        tie: rng.gen_range(0..u32::MAX),
                        pos: (nx, nz),
                    });
                }
            }
        }
        None
    }
}

#[derive(Copy, Clone)]
struct HeapEntry {
    f: f32,
    tie: u32,
    pos: (usize, usize),
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.f == other.f && self.tie == other.tie
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    // Reversed so `BinaryHeap` (a max-heap) pops the lowest f-score first.
    // Equal f-scores fall back to the random tie key drawn at insertion.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .partial_cmp(&self.f)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.tie.cmp(&self.tie))
    }
}

fn heuristic(a: (usize, usize), b: (usize, usize)) -> f32 {
    let dx = a.0 as f32 - b.0 as f32;
    let dz = a.1 as f32 - b.1 as f32;
    (dx * dx + dz * dz).sqrt()
}

/// 8-connected neighbors with diagonal corner-cut prevention: a diagonal
/// step is only permitted if both orthogonal neighbors sharing its corner
/// are walkable (`spec.md` §4.2).
fn neighbors(grid: &NavGrid, pos: (usize, usize)) -> Vec<(usize, usize, f32)> {
    const ORTHOGONAL: f32 = 1.0;
    const DIAGONAL: f32 = std::f32::consts::SQRT_2;

    let (x, z) = (pos.0 as i32, pos.1 as i32);
    let mut out = Vec::with_capacity(8);

    for dz in -1..=1 {
        for dx in -1..=1 {
            if dx == 0 && dz == 0 {
                continue;
            }
            let nx = x + dx;
            let nz = z + dz;
            if nx < 0 || nz < 0 {
                continue;
            }
            let (nx, nz) = (nx as usize, nz as usize);
            if !grid.is_walkable(nx, nz) {
                continue;
            }

            if dx != 0 && dz != 0 {
                let side_a = x + dx >= 0 && grid.is_walkable((x + dx) as usize, z as usize);
                let side_b = z + dz >= 0 && grid.is_walkable(x as usize, (z + dz) as usize);
                if !side_a || !side_b {
                    continue;
                }
                out.push((nx, nz, DIAGONAL));
            } else {
                out.push((nx, nz, ORTHOGONAL));
            }
        }
    }
    out
}

fn reconstruct(
    came_from: &[Option<(usize, usize)>],
    goal: (usize, usize),
    w: usize,
) -> Vec<(usize, usize)> {
    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(prev) = came_from[cur.1 * w + cur.0] {
        path.push(prev);
        cur = prev;
    }
    path.reverse();
    path
}

// ── Path smoothing ────────────────────────────────────────────────────────────

/// Greedy line-of-sight sweep: for each current waypoint, keep the furthest
/// successor reachable by a clear corridor (`spec.md` §4.2).
fn smooth_path(grid: &NavGrid, path: &[Vector2], agent_radius: f32) -> Vec<Vector2> {
    if path.len() <= 2 {
        return path.to_vec();
    }

    let mut smoothed = vec![path[0]];
    let mut i = 0;
    while i < path.len() - 1 {
        let mut furthest = i + 1;
        for j in (i + 1)..path.len() {
            if corridor_clear(grid, path[i], path[j], agent_radius) {
                furthest = j;
            }
        }
        smoothed.push(path[furthest]);
        i = furthest;
    }
    smoothed
}

/// Walk the segment `a -> b` in steps of `res/4`, checking the center and
/// both sides offset by `agent_radius + 0.2` along the segment normal.
/// Prevents the smoother from grazing obstacles that A* only skirted via
/// inflated cells (`spec.md` §4.2, glossary "corridor test").
fn corridor_clear(grid: &NavGrid, a: Vector2, b: Vector2, agent_radius: f32) -> bool {
    let half_width = agent_radius + 0.2;
    let delta = b - a;
    let dist = delta.length();
    if dist < 1e-6 {
        return true;
    }
    let dir = delta.normalized();
    let normal = dir.perp();

    let step = (grid.res / 4.0).max(0.01);
    let steps = (dist / step).ceil() as usize;

    for s in 0..=steps {
        let t = (s as f32 * step).min(dist);
        let p = a + dir.scale(t);
        let side_a = p + normal.scale(half_width);
        let side_b = p - normal.scale(half_width);
        if !grid.is_strictly_walkable_world(p)
            || !grid.is_strictly_walkable_world(side_a)
            || !grid.is_strictly_walkable_world(side_b)
        {
            return false;
        }
    }
    true
}
