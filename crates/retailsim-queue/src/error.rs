//! `QueueError` — diagnostics only; `spec.md` §7 treats no queue failure as
//! fatal to a tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("lane index {0} out of range")]
    NoSuchLane(u32),
}

pub type QueueResult<T> = Result<T, QueueError>;
