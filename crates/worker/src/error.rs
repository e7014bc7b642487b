// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the worker control surface and work routine

use crate::state::WorkerState;
use std::sync::Arc;
use thiserror::Error;

/// A captured work-routine failure, shared with observers and accessors
pub type WorkFailure = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the worker control surface
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The requested control operation has no transition from the current state
    #[error("worker {name:?} cannot {operation} while in state {state}")]
    OperationNotAllowed {
        name: String,
        operation: &'static str,
        state: WorkerState,
    },
}

/// Failure channel of the work routine.
///
/// `Stopped` is the stop sentinel: it is raised by a stop breakpoint so the
/// stack unwinds through any cleanup in the work routine. Every other
/// failure is a crash and is captured verbatim.
#[derive(Debug, Error)]
pub enum WorkError {
    /// The worker acknowledged a stop request at a stop breakpoint
    #[error("execution stopped at a stop breakpoint")]
    Stopped,
    /// Any other failure escaping the work routine
    #[error(transparent)]
    Failed(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl WorkError {
    /// Wrap an arbitrary failure value
    pub fn failed(failure: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Failed(failure.into())
    }

    /// Whether this is the stop sentinel
    pub const fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}
