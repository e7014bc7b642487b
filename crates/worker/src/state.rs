// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker lifecycle states, events, and the transition table

use leash_fsm::{FsmError, StateMachine, StateMachineBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a worker's execution thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerState {
    /// No execution thread alive; the initial state
    Stopped,
    /// Execution thread alive and not paused
    Running,
    /// Pause requested, but no pause breakpoint reached yet
    RunningWaitingForPause,
    /// Stop requested, but no stop breakpoint reached yet
    RunningWaitingForStop,
    /// Stop breakpoint hit; the work routine is cleaning up
    Stopping,
    /// Execution thread blocked at a pause breakpoint
    Paused,
    /// The work routine failed with something other than the stop sentinel
    Crashed,
}

impl WorkerState {
    /// State name as a string identifier
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Running => "RUNNING",
            Self::RunningWaitingForPause => "RUNNING_WAITING_FOR_PAUSE",
            Self::RunningWaitingForStop => "RUNNING_WAITING_FOR_STOP",
            Self::Stopping => "STOPPING",
            Self::Paused => "PAUSED",
            Self::Crashed => "CRASHED",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Event driving the worker lifecycle machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerEvent {
    /// External request to start (or rescind a pending stop)
    Start,
    /// External request to stop at the next stop breakpoint
    Stop,
    /// External request to pause at the next pause breakpoint
    Pause,
    /// External request to withdraw a pause or release a paused thread
    Resume,
    /// External request to reset a crashed worker
    Restart,
    /// The execution thread reached a pause breakpoint
    PauseBreakpointEncountered,
    /// The execution thread reached a stop breakpoint
    StopBreakpointEncountered,
    /// The work routine returned (normally or through the stop sentinel)
    Terminated,
    /// The work routine failed
    Crash,
}

impl WorkerEvent {
    /// Event name as a string identifier
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Stop => "STOP",
            Self::Pause => "PAUSE",
            Self::Resume => "RESUME",
            Self::Restart => "RESTART",
            Self::PauseBreakpointEncountered => "PAUSE_BREAKPOINT_ENCOUNTERED",
            Self::StopBreakpointEncountered => "STOP_BREAKPOINT_ENCOUNTERED",
            Self::Terminated => "TERMINATED",
            Self::Crash => "CRASH",
        }
    }
}

impl fmt::Display for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Build the worker lifecycle machine, initially [`WorkerState::Stopped`].
pub(crate) fn lifecycle_machine() -> StateMachine<WorkerState, WorkerEvent> {
    let mut builder = StateMachineBuilder::new();
    build_table(&mut builder).expect("lifecycle transition table is statically well-formed");
    builder.create(WorkerState::Stopped)
}

fn build_table(
    builder: &mut StateMachineBuilder<WorkerState, WorkerEvent>,
) -> Result<(), FsmError<WorkerState, WorkerEvent>> {
    use self::{WorkerEvent as E, WorkerState as S};

    builder.add_transition(S::Stopped, E::Start, S::Running)?;

    builder.add_transition(S::Running, E::Stop, S::RunningWaitingForStop)?;
    builder.add_transition(S::Running, E::Pause, S::RunningWaitingForPause)?;
    builder.add_transition(S::Running, E::Crash, S::Crashed)?;
    builder.add_transition(S::Running, E::Terminated, S::Stopped)?;

    builder.add_transition(S::RunningWaitingForStop, E::Start, S::Running)?;
    builder.add_transition(
        S::RunningWaitingForStop,
        E::StopBreakpointEncountered,
        S::Stopping,
    )?;
    builder.add_transition(S::RunningWaitingForStop, E::Pause, S::RunningWaitingForPause)?;
    builder.add_transition(S::RunningWaitingForStop, E::Crash, S::Crashed)?;
    builder.add_transition(S::RunningWaitingForStop, E::Terminated, S::Stopped)?;

    builder.add_transition(S::RunningWaitingForPause, E::Resume, S::Running)?;
    builder.add_transition(
        S::RunningWaitingForPause,
        E::PauseBreakpointEncountered,
        S::Paused,
    )?;
    builder.add_transition(S::RunningWaitingForPause, E::Stop, S::RunningWaitingForStop)?;
    builder.add_transition(S::RunningWaitingForPause, E::Crash, S::Crashed)?;
    builder.add_transition(S::RunningWaitingForPause, E::Terminated, S::Stopped)?;

    builder.add_transition(S::Paused, E::Resume, S::Running)?;

    builder.add_transition(S::Stopping, E::Terminated, S::Stopped)?;
    builder.add_transition(S::Stopping, E::Crash, S::Crashed)?;

    builder.add_transition(S::Crashed, E::Restart, S::Stopped)?;

    Ok(())
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
