//! Error types for a collection cycle.

use std::time::Duration;

use thiserror::Error;

use kubeanno_catalog::ListError;
use kubeanno_core::ResourceKind;

#[derive(Debug, Error)]
pub enum CollectError {
    /// A per-kind list call failed; the cycle stopped at that kind.
    #[error(transparent)]
    Transport(#[from] ListError),

    #[error("scrape deadline of {budget:?} exceeded while listing {kind}")]
    DeadlineExceeded { kind: ResourceKind, budget: Duration },

    /// Another cycle held the snapshot for the whole budget.
    #[error("previous collection cycle still running after {budget:?}")]
    Busy { budget: Duration },
}

impl CollectError {
    /// The kind the cycle stopped at, if it got that far.
    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            CollectError::Transport(e) => Some(e.kind),
            CollectError::DeadlineExceeded { kind, .. } => Some(*kind),
            CollectError::Busy { .. } => None,
        }
    }
}
