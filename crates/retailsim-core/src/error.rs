//! Shared error type for `retailsim-core` and a common base for sub-crates.
//!
//! Sub-crates define their own error enums and convert them into a
//! crate-local error (or into each other via `#[from]`) rather than sharing
//! one god enum. Per `spec.md` §7, no error here is ever fatal to a tick —
//! these types exist for diagnostics, not for aborting the simulation.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
