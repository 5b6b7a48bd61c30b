//! `AgentError` — diagnostics only; `spec.md` §7 treats no agent-level
//! failure as fatal to a tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("no lane available for queue decision")]
    NoLaneAvailable,
}

pub type AgentResult<T> = Result<T, AgentError>;
