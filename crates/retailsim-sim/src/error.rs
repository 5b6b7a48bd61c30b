//! `SimError` — per `spec.md` §7, no internal failure aborts a tick; these
//! variants exist for `get_diagnostics()` and logging, not control flow.

use thiserror::Error;

use retailsim_nav::NavError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scene ingestion failed: {0}")]
    Scene(#[from] NavError),

    #[error("max occupancy ({0}) reached")]
    MaxOccupancy(u32),

    #[error("unknown lane reference: {0}")]
    UnknownLane(String),

    #[error("invalid manual command: {0}")]
    InvalidCommand(&'static str),
}

pub type SimResult<T> = Result<T, SimError>;
