// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the state machine engine

use std::fmt::Debug;
use thiserror::Error;

/// Errors raised while building or driving a state machine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsmError<S: Debug, E: Debug> {
    /// The same `(state, event)` pair was registered twice
    #[error("duplicate transition from {from:?} on {event:?}")]
    DuplicateTransition { from: S, event: E },
    /// Strict processing found no transition out of the current state
    #[error("transition not allowed from {from:?} on {event:?}")]
    TransitionNotAllowed { from: S, event: E },
}
