//! `NavGrid` — occupancy/zone grid built once from a scene (`spec.md` §4.1).

use retailsim_core::{LaneId, Vector2};

use crate::cell::{Cell, Zone};
use crate::error::{NavError, NavResult};
use crate::scene::{ObjectClass, Roi, SceneObject};

/// Minimum obstacle footprint enforced on generic solid objects, meters.
const MIN_OBSTACLE_SIZE: f32 = 1.5;
/// Default inflation radius around blocked cells, meters.
const DEFAULT_INFLATION: f32 = 0.5;
/// Max cost at a cell immediately adjacent to a blocked cell.
const INFLATION_MAX_COST: f32 = 4.0;
/// Stride used when scanning for safe waypoints, meters.
const WAYPOINT_STRIDE: f32 = 2.0;
/// How far a "- Service"/"- Queue" ROI centroid may sit from an existing
/// cashier before it's treated as the same lane.
const CASHIER_DEDUP_RADIUS: f32 = 2.0;

/// A checkout lane's physical anchor, derived from scene objects/ROIs.
#[derive(Clone, Debug)]
pub struct CashierSite {
    pub pos: Vector2,
    pub width: f32,
    pub queue_center: Option<Vector2>,
    pub service_center: Option<Vector2>,
    pub queue_zone_id: Option<LaneId>,
}

/// Derived landmark bands used for zone classification (`spec.md` §3).
#[derive(Clone, Debug)]
pub struct ZoneBounds {
    pub cashier_line_z: f32,
    pub shopping_min_z: f32,
    pub shopping_max_z: f32,
    pub shopping_min_x: f32,
    pub shopping_max_x: f32,
    pub checkout_min_x: f32,
    pub checkout_max_x: f32,
    pub bypass_corridor_x: f32,
}

/// Pre-sampled walkable positions bucketed by zone, used for browsing
/// destinations and anti-glitch warps (`spec.md` §4.1 step 7, glossary).
#[derive(Clone, Debug, Default)]
pub struct SafeWaypoints {
    pub entrance: Vec<Vector2>,
    pub bypass: Vec<Vector2>,
    pub shopping: Vec<Vector2>,
    pub aisles: Vec<Vector2>,
    pub queue: Vec<Vector2>,
}

/// The static occupancy / zone grid for one venue.
///
/// Built once via [`NavGrid::build`] from the scene provider's objects and
/// ROIs; immutable for the lifetime of the simulator afterward. `AStar` and
/// agent steering both query it read-only during a tick.
pub struct NavGrid {
    pub world_w: f32,
    pub world_d: f32,
    pub res: f32,
    pub gw: usize,
    pub gd: usize,
    cells: Vec<Cell>,
    zones: Vec<Zone>,
    costs: Vec<f32>,
    pub cashiers: Vec<CashierSite>,
    pub entrance_pos: Vector2,
    pub zone_bounds: ZoneBounds,
    pub safe_waypoints: SafeWaypoints,
}

impl NavGrid {
    /// Build a grid from a scene. `res` is the cell edge length (default
    /// 0.5 m per `spec.md` §6); `inflation` is the inflation radius (default
    /// 0.5 m).
    pub fn build(
        world_w: f32,
        world_d: f32,
        res: f32,
        inflation: f32,
        objects: &[SceneObject],
        rois: &[Roi],
    ) -> NavResult<Self> {
        let gw = (world_w / res).ceil().max(1.0) as usize;
        let gd = (world_d / res).ceil().max(1.0) as usize;
        if gw == 0 || gd == 0 {
            return Err(NavError::EmptyGrid { w: world_w, d: world_d, res });
        }

        let mut grid = NavGrid {
            world_w,
            world_d,
            res,
            gw,
            gd,
            cells: vec![Cell::Free; gw * gd],
            zones: vec![Zone::None; gw * gd],
            costs: vec![1.0; gw * gd],
            cashiers: Vec::new(),
            entrance_pos: Vector2::new(world_w * 0.5, 0.0),
            zone_bounds: ZoneBounds {
                cashier_line_z: world_d * 0.5,
                shopping_min_z: world_d * 0.5 + 8.0,
                shopping_max_z: world_d,
                shopping_min_x: 0.0,
                shopping_max_x: world_w,
                checkout_min_x: 0.0,
                checkout_max_x: world_w,
                bypass_corridor_x: world_w - 1.0,
            },
            safe_waypoints: SafeWaypoints::default(),
        };

        grid.mark_obstacles(objects);
        grid.derive_cashiers(rois);
        grid.derive_zone_bounds(objects);
        grid.apply_inflation(inflation);
        grid.classify_zones();
        grid.sample_safe_waypoints();

        Ok(grid)
    }

    // ── Build steps ───────────────────────────────────────────────────────

    fn mark_obstacles(&mut self, objects: &[SceneObject]) {
        for obj in objects {
            let class = obj.classify();
            if class == ObjectClass::Passable {
                continue;
            }

            let cos_t = obj.rotation_y.cos().abs();
            let sin_t = obj.rotation_y.sin().abs();
            let mut eff_w = obj.scale.x * cos_t + obj.scale.z * sin_t;
            let mut eff_d = obj.scale.z * cos_t + obj.scale.x * sin_t;

            if class == ObjectClass::SolidExpand {
                eff_w = eff_w.max(MIN_OBSTACLE_SIZE).min(self.world_w);
                eff_d = eff_d.max(MIN_OBSTACLE_SIZE).min(self.world_d);
            }

            let min = Vector2::new(obj.position.x - eff_w * 0.5, obj.position.z - eff_d * 0.5);
            let max = Vector2::new(obj.position.x + eff_w * 0.5, obj.position.z + eff_d * 0.5);

            let (gx0, gz0) = self.world_to_cell_floor(min);
            let (gx1, gz1) = self.world_to_cell_floor(max);
            for gz in gz0..=gz1 {
                for gx in gx0..=gx1 {
                    if let Some(i) = self.index(gx, gz) {
                        self.cells[i] = Cell::Blocked;
                        self.costs[i] = f32::INFINITY;
                    }
                }
            }
        }
    }

    fn derive_cashiers(&mut self, rois: &[Roi]) {
        for roi in rois {
            let Some(prefix) = roi.name.strip_suffix(" - Queue") else { continue };
            let Some(service) = rois
                .iter()
                .find(|r| r.name == format!("{prefix} - Service"))
            else {
                continue;
            };

            let queue_center = roi.centroid();
            let service_center = service.centroid();

            let existing = self
                .cashiers
                .iter()
                .any(|c| c.pos.distance(service_center) < CASHIER_DEDUP_RADIUS);
            if existing {
                continue;
            }

            self.cashiers.push(CashierSite {
                pos: service_center,
                width: 1.5,
                queue_center: Some(queue_center),
                service_center: Some(service_center),
                queue_zone_id: None,
            });
        }

        self.cashiers
            .sort_by(|a, b| a.pos.x.partial_cmp(&b.pos.x).unwrap());
        for (i, c) in self.cashiers.iter_mut().enumerate() {
            c.queue_zone_id = Some(LaneId(i as u32));
        }
    }

    fn derive_zone_bounds(&mut self, objects: &[SceneObject]) {
        let checkout_zs: Vec<f32> = objects
            .iter()
            .filter(|o| o.classify() == ObjectClass::SolidCompact)
            .map(|o| o.position.z)
            .collect();
        let checkout_xs: Vec<f32> = objects
            .iter()
            .filter(|o| o.classify() == ObjectClass::SolidCompact)
            .map(|o| o.position.x)
            .collect();

        let cashier_line_z = if !checkout_zs.is_empty() {
            let min = checkout_zs.iter().cloned().fold(f32::INFINITY, f32::min);
            let max = checkout_zs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
            (min + max) * 0.5
        } else {
            self.world_d * 0.5
        };

        let (checkout_min_x, checkout_max_x) = if !checkout_xs.is_empty() {
            (
                checkout_xs.iter().cloned().fold(f32::INFINITY, f32::min),
                checkout_xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
            )
        } else {
            (0.0, self.world_w)
        };

        if let Some(entrance_obj) = objects.iter().find(|o| o.kind.eq_ignore_ascii_case("entrance"))
        {
            self.entrance_pos = entrance_obj.position;
        }

        // Bypass corridor runs along the world edge opposite the entrance.
        let bypass_corridor_x = if self.entrance_pos.x < self.world_w * 0.5 {
            self.world_w - 1.0
        } else {
            1.0
        };

        let shelf_xs: Vec<f32> = objects
            .iter()
            .filter(|o| o.classify() == ObjectClass::SolidExpand)
            .map(|o| o.position.x)
            .collect();
        let shelf_zs: Vec<f32> = objects
            .iter()
            .filter(|o| o.classify() == ObjectClass::SolidExpand)
            .map(|o| o.position.z)
            .collect();

        let shopping_min_z = cashier_line_z + 8.0;
        let shopping_max_z = if !shelf_zs.is_empty() {
            shelf_zs
                .iter()
                .cloned()
                .fold(f32::NEG_INFINITY, f32::max)
                .max(shopping_min_z)
        } else {
            self.world_d
        };
        let (shopping_min_x, shopping_max_x) = if !shelf_xs.is_empty() {
            (
                shelf_xs.iter().cloned().fold(f32::INFINITY, f32::min),
                shelf_xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max),
            )
        } else {
            (0.0, self.world_w)
        };

        self.zone_bounds = ZoneBounds {
            cashier_line_z,
            shopping_min_z,
            shopping_max_z,
            shopping_min_x,
            shopping_max_x,
            checkout_min_x,
            checkout_max_x,
            bypass_corridor_x,
        };
    }

    fn apply_inflation(&mut self, radius: f32) {
        let radius = if radius > 0.0 { radius } else { DEFAULT_INFLATION };
        let ring = (radius / self.res).ceil() as i32;
        if ring <= 0 {
            return;
        }

        let blocked: Vec<(i32, i32)> = (0..self.gd as i32)
            .flat_map(|gz| (0..self.gw as i32).map(move |gx| (gx, gz)))
            .filter(|&(gx, gz)| {
                self.index(gx as usize, gz as usize)
                    .map(|i| self.cells[i] == Cell::Blocked)
                    .unwrap_or(false)
            })
            .collect();

        // best[cell] = smallest ring-distance to any blocked cell seen so far.
        let mut best = vec![i32::MAX; self.gw * self.gd];
        for (bx, bz) in blocked {
            for dz in -ring..=ring {
                for dx in -ring..=ring {
                    let gx = bx + dx;
                    let gz = bz + dz;
                    let Some(i) = self.index_signed(gx, gz) else { continue };
                    if self.cells[i] == Cell::Blocked {
                        continue;
                    }
                    let d = dx.abs().max(dz.abs());
                    if d <= ring && d < best[i] {
                        best[i] = d;
                    }
                }
            }
        }

        for (i, &d) in best.iter().enumerate() {
            if d == i32::MAX {
                continue;
            }
            self.cells[i] = Cell::Inflated;
            // Cost rises linearly from 1 at the outer ring to INFLATION_MAX_COST
            // adjacent to the obstacle (d == 0 means directly touching).
            let t = 1.0 - (d as f32 / ring as f32);
            self.costs[i] = 1.0 + t * (INFLATION_MAX_COST - 1.0);
        }
    }

    fn classify_zones(&mut self) {
        let zb = self.zone_bounds.clone();
        for gz in 0..self.gd {
            for gx in 0..self.gw {
                let Some(i) = self.index(gx, gz) else { continue };
                let p = self.cell_center(gx, gz);

                let zone = if p.z < zb.cashier_line_z - 1.0 {
                    Zone::Entrance
                } else if p.z <= zb.cashier_line_z + 3.0 && p.x >= zb.checkout_min_x - 1.0
                    && p.x <= zb.checkout_max_x + 1.0
                {
                    Zone::Checkout
                } else if p.z < zb.shopping_min_z {
                    Zone::Queue
                } else if p.x >= zb.shopping_min_x
                    && p.x <= zb.shopping_max_x
                    && p.z >= zb.shopping_min_z
                    && p.z <= zb.shopping_max_z
                {
                    Zone::Shopping
                } else {
                    Zone::Bypass
                };
                self.zones[i] = zone;
            }
        }
    }

    fn sample_safe_waypoints(&mut self) {
        let stride = (WAYPOINT_STRIDE / self.res).round().max(1.0) as usize;
        let mut waypoints = SafeWaypoints::default();

        let mut gz = 0;
        while gz < self.gd {
            let mut gx = 0;
            while gx < self.gw {
                if self.is_strictly_walkable(gx, gz) {
                    let p = self.cell_center(gx, gz);
                    match self.zones[self.index(gx, gz).unwrap()] {
                        Zone::Entrance => waypoints.entrance.push(p),
                        Zone::Bypass => waypoints.bypass.push(p),
                        Zone::Shopping => waypoints.shopping.push(p),
                        Zone::Queue => waypoints.queue.push(p),
                        Zone::Checkout | Zone::None => {}
                    }
                }
                gx += stride;
            }
            gz += stride;
        }

        // Aisle waypoints: midpoint of every contiguous walkable run per row
        // within the shopping z-band (`spec.md` §4.1 step 7).
        for gz in 0..self.gd {
            let z = self.cell_center(0, gz).z;
            if z < self.zone_bounds.shopping_min_z || z > self.zone_bounds.shopping_max_z {
                continue;
            }
            let mut run_start: Option<usize> = None;
            for gx in 0..=self.gw {
                let walkable = gx < self.gw && self.is_strictly_walkable(gx, gz);
                match (walkable, run_start) {
                    (true, None) => run_start = Some(gx),
                    (false, Some(start)) => {
                        let mid = (start + gx - 1) / 2;
                        waypoints.aisles.push(self.cell_center(mid, gz));
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        self.safe_waypoints = waypoints;
    }

    // ── Coordinate helpers ────────────────────────────────────────────────

    #[inline]
    fn index(&self, gx: usize, gz: usize) -> Option<usize> {
        if gx < self.gw && gz < self.gd {
            Some(gz * self.gw + gx)
        } else {
            None
        }
    }

    #[inline]
    fn index_signed(&self, gx: i32, gz: i32) -> Option<usize> {
        if gx >= 0 && gz >= 0 {
            self.index(gx as usize, gz as usize)
        } else {
            None
        }
    }

    #[inline]
    pub fn world_to_cell(&self, p: Vector2) -> (usize, usize) {
        let gx = ((p.x / self.res) as i64).clamp(0, self.gw as i64 - 1) as usize;
        let gz = ((p.z / self.res) as i64).clamp(0, self.gd as i64 - 1) as usize;
        (gx, gz)
    }

    fn world_to_cell_floor(&self, p: Vector2) -> (usize, usize) {
        self.world_to_cell(p)
    }

    #[inline]
    pub fn cell_center(&self, gx: usize, gz: usize) -> Vector2 {
        Vector2::new(
            (gx as f32 + 0.5) * self.res,
            (gz as f32 + 0.5) * self.res,
        )
    }

    // ── Queries (`spec.md` §4.1) ──────────────────────────────────────────

    /// `true` unless the cell is `Blocked`. A* routes through `Inflated`
    /// cells at a cost penalty but never through `Blocked` ones.
    pub fn is_walkable(&self, gx: usize, gz: usize) -> bool {
        self.index(gx, gz)
            .map(|i| self.cells[i] != Cell::Blocked)
            .unwrap_or(false)
    }

    /// `true` only for `Free` cells. Agent bodies (steering, avoidance) use
    /// this — an inflated cell is a valid fallback path but not a place an
    /// agent's body should stand.
    pub fn is_strictly_walkable(&self, gx: usize, gz: usize) -> bool {
        self.index(gx, gz)
            .map(|i| self.cells[i] == Cell::Free)
            .unwrap_or(false)
    }

    /// Collision/body-placement check. Inflated cells count as walkable
    /// here — they're where A*-planned paths legitimately route agents
    /// close to obstacles; only `Blocked` cells actually stop movement.
    /// Safe-waypoint sampling uses the stricter [`NavGrid::is_strictly_walkable`]
    /// instead, since those points are meant to be clear of any obstacle.
    pub fn is_walkable_world(&self, p: Vector2) -> bool {
        if p.x < 0.0 || p.z < 0.0 || p.x >= self.world_w || p.z >= self.world_d {
            return false;
        }
        let (gx, gz) = self.world_to_cell(p);
        self.is_walkable(gx, gz)
    }

    /// World-coordinate counterpart to [`NavGrid::is_strictly_walkable`].
    /// Corridor/clearance tests that must stay clear of inflation rings
    /// (rather than merely avoid `Blocked` cells) use this instead of
    /// [`NavGrid::is_walkable_world`].
    pub fn is_strictly_walkable_world(&self, p: Vector2) -> bool {
        if p.x < 0.0 || p.z < 0.0 || p.x >= self.world_w || p.z >= self.world_d {
            return false;
        }
        let (gx, gz) = self.world_to_cell(p);
        self.is_strictly_walkable(gx, gz)
    }

    pub fn cost(&self, gx: usize, gz: usize) -> f32 {
        match self.index(gx, gz) {
            Some(i) if self.cells[i] != Cell::Blocked => self.costs[i],
            _ => f32::INFINITY,
        }
    }

    pub fn zone_at(&self, gx: usize, gz: usize) -> Zone {
        self.index(gx, gz).map(|i| self.zones[i]).unwrap_or(Zone::None)
    }

    pub fn zone(&self, p: Vector2) -> Zone {
        let (gx, gz) = self.world_to_cell(p);
        self.zone_at(gx, gz)
    }

    /// Spiral outward from `(x, z)` up to `max_r` meters and return the
    /// first walkable cell's world center. `None` if nothing found
    /// (`spec.md` §4.1).
    pub fn find_nearest_walkable(&self, p: Vector2, max_r: f32) -> Option<Vector2> {
        let (cx, cz) = self.world_to_cell(p);
        let max_ring = (max_r / self.res).ceil() as i32;

        if self.is_walkable(cx, cz) {
            return Some(self.cell_center(cx, cz));
        }

        for ring in 1..=max_ring {
            for dz in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dz.abs() != ring {
                        continue; // only the ring's perimeter
                    }
                    let gx = cx as i32 + dx;
                    let gz = cz as i32 + dz;
                    if gx < 0 || gz < 0 {
                        continue;
                    }
                    let (gx, gz) = (gx as usize, gz as usize);
                    if self.is_walkable(gx, gz) {
                        return Some(self.cell_center(gx, gz));
                    }
                }
            }
        }
        None
    }

    /// A random pre-sampled waypoint from `zone`'s bucket. Shopping falls
    /// back to the aisle bucket if empty (`spec.md` §4.1).
    pub fn random_waypoint(&self, zone: Zone, rng: &mut retailsim_core::AgentRng) -> Option<Vector2> {
        let bucket = match zone {
            Zone::Entrance => &self.safe_waypoints.entrance,
            Zone::Bypass => &self.safe_waypoints.bypass,
            Zone::Queue => &self.safe_waypoints.queue,
            Zone::Shopping if !self.safe_waypoints.shopping.is_empty() => {
                &self.safe_waypoints.shopping
            }
            Zone::Shopping => &self.safe_waypoints.aisles,
            Zone::Checkout | Zone::None => return None,
        };
        rng.choose(bucket).copied()
    }

    /// Render the grid as ASCII for test failure output / interactive
    /// debugging. Not part of the external contract (`spec.md` §9).
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity((self.gw + 1) * self.gd);
        for gz in (0..self.gd).rev() {
            for gx in 0..self.gw {
                let ch = match self.index(gx, gz).map(|i| self.cells[i]) {
                    Some(Cell::Free) => '.',
                    Some(Cell::Inflated) => ',',
                    Some(Cell::Blocked) => '#',
                    None => ' ',
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}
