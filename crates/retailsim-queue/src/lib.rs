//! `retailsim-queue` — per-lane checkout queue management.
//!
//! # Crate layout
//!
//! | Module      | Contents                                         |
//! |-------------|----------------------------------------------------|
//! | [`lane`]    | `LaneGeometry`, `Lane`                            |
//! | [`manager`] | `QueueManager` — service slot + waiting list FIFO |
//! | [`service`] | `ServiceTimeModel` (fixed or basket-weighted)     |
//! | [`error`]   | `QueueError`, `QueueResult`                        |
//!
//! There is no teacher analogue for this crate; it is grounded in
//! `dt-schedule`'s ordered, index-based collections (`WakeQueue`'s
//! `BTreeMap<Tick, Vec<AgentId>>`), generalized here to a `Vec<AgentId>`
//! FIFO per lane.

pub mod error;
pub mod lane;
pub mod manager;
pub mod service;


pub use error::{QueueError, QueueResult};
pub use lane::{Lane, LaneGeometry};
pub use manager::QueueManager;
pub use service::ServiceTimeModel;
