//! `retailsim-nav` — occupancy/zone grid, A* path planner, and directional
//! gate enforcement.
//!
//! # Crate layout
//!
//! | Module     | Contents                                              |
//! |------------|--------------------------------------------------------|
//! | [`scene`]  | `SceneObject`, `Roi` — one-time scene ingestion input   |
//! | [`cell`]   | `Cell`, `Zone` enums                                    |
//! | [`grid`]   | `NavGrid` — occupancy grid, zones, safe waypoints       |
//! | [`astar`]  | `AStar` — grid path planner with corridor smoothing     |
//! | [`gate`]   | `GateManager`, `Gate` — directional crossing rules      |
//! | [`error`]  | `NavError`, `NavResult`                                 |

pub mod astar;
pub mod cell;
pub mod error;
pub mod gate;
pub mod grid;
pub mod scene;

#[cfg(test)]
mod tests;

pub use astar::AStar;
pub use cell::{Cell, Zone};
pub use error::{NavError, NavResult};
pub use gate::{Gate, GateManager};
pub use grid::{CashierSite, NavGrid, SafeWaypoints, ZoneBounds};
pub use scene::{ObjectClass, Roi, SceneObject};
