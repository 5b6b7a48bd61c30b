//! `retailsim-core` — foundational types for the `retailsim` pedestrian simulator.
//!
//! This crate is a dependency of every other `retailsim-*` crate. It
//! intentionally has no `retailsim-*` dependencies and minimal external ones
//! (only `rand` and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module        | Contents                                     |
//! |---------------|-----------------------------------------------|
//! | [`ids`]       | `AgentId`, `LaneId`                          |
//! | [`geo`]       | `Vector2`, planar distance                   |
//! | [`time`]      | `Tick`, `SimClock`                           |
//! | [`rng`]       | `AgentRng` (per-agent), `SimRng` (global)     |
//! | [`error`]     | `CoreError`, `CoreResult`                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.  |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod states;
pub mod time;

#[cfg(test)]
mod tests;

pub use error::{CoreError, CoreResult};
pub use geo::Vector2;
pub use ids::{AgentId, LaneId};
pub use rng::{AgentRng, SimRng};
pub use states::{CashierState, ShopperState};
pub use time::{SimClock, Tick};
