//! `retailsim-sim` — scene ingestion, the `Simulator` tick loop, ID
//! confusion, lane-state control, and track emission.
//!
//! # Crate layout
//!
//! | Module         | Contents                                              |
//! |-----------------|--------------------------------------------------------|
//! | [`config`]      | `SimulatorConfig` and its nested config structs         |
//! | [`simulator`]   | `Simulator`, the owning tick-loop orchestrator          |
//! | [`idconfusion`] | `IDConfusion`                                           |
//! | [`lanestate`]   | `LaneStateController`, `LaneRef`, `LaneState`            |
//! | [`track`]       | `TrackMessage` and its emission helpers                 |
//! | [`diagnostics`] | `Diagnostics`, `GateViolation`                          |
//! | [`error`]       | `SimError`, `SimResult`                                 |

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod idconfusion;
pub mod lanestate;
pub mod simulator;
pub mod track;

#[cfg(test)]
mod tests;

pub use config::{IdConfusionConfig, LaneStateConfig, SimulatorConfig};
pub use diagnostics::{Diagnostics, GateViolation, SafeWaypointBucketSizes};
pub use error::{SimError, SimResult};
pub use idconfusion::IDConfusion;
pub use lanestate::{DesiredState, LaneMetrics, LaneRef, LaneState, LaneStateController, LaneStatus};
pub use simulator::Simulator;
pub use track::TrackMessage;

pub use retailsim_nav::scene::{Roi, SceneObject};
