// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observer hooks fired as a worker moves through its lifecycle

use crate::error::WorkFailure;

/// Callbacks fired as a worker moves through its lifecycle.
///
/// Hooks run synchronously on whichever thread drove the transition: a
/// control-surface caller or the execution thread itself. They are
/// delivered in transition order. Every hook defaults to a no-op.
pub trait WorkerObserver: Send + Sync {
    /// The execution thread is running (fresh start, rescinded stop, or resume)
    fn running(&self) {}

    /// A pause was requested; waiting for a pause breakpoint
    fn running_waiting_to_pause(&self) {}

    /// A stop was requested; waiting for a stop breakpoint
    fn running_waiting_to_stop(&self) {}

    /// A stop breakpoint was hit; the work routine is cleaning up
    fn stopping(&self) {}

    /// The worker stopped after acknowledging a stop request
    fn stopped_after_stop_request(&self) {}

    /// The work routine returned on its own
    fn stopped_normally(&self) {}

    /// The execution thread is blocked at a pause breakpoint
    fn paused(&self) {}

    /// The work routine failed; the failure is retained until restart
    fn crashed(&self, _failure: &WorkFailure) {}

    /// A crashed worker was reset and can be started again
    fn restarted(&self) {}
}
