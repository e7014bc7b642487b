// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A running state machine with an immutable transition table

use crate::error::FsmError;
use crate::listener::StateMachineListener;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, ThreadId};

/// Exclusive, thread-reentrant ownership of event processing.
///
/// Listener callbacks may feed events back into the machine from the
/// processing thread; other threads wait until the outermost call finishes.
struct Gate {
    state: Mutex<GateState>,
    released: Condvar,
}

#[derive(Default)]
struct GateState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl Gate {
    fn new() -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            released: Condvar::new(),
        }
    }

    fn enter(&self) -> GateGuard<'_> {
        let me = thread::current().id();
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        while state.owner.is_some_and(|owner| owner != me) {
            state = self.released.wait(state).unwrap_or_else(|e| e.into_inner());
        }
        state.owner = Some(me);
        state.depth += 1;
        GateGuard { gate: self }
    }
}

struct GateGuard<'a> {
    gate: &'a Gate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.state.lock().unwrap_or_else(|e| e.into_inner());
        state.depth -= 1;
        if state.depth == 0 {
            state.owner = None;
            self.gate.released.notify_one();
        }
    }
}

struct Inner<S, E> {
    state: S,
    listeners: Vec<Arc<dyn StateMachineListener<S, E>>>,
}

/// A state machine created by [`StateMachineBuilder`](crate::StateMachineBuilder).
///
/// The transition table is immutable after construction. Event processing
/// is totally ordered: listeners observe transitions in the order events
/// were processed, and a listener may process further events from inside a
/// callback without deadlocking.
pub struct StateMachine<S, E> {
    table: HashMap<(S, E), S>,
    inner: Mutex<Inner<S, E>>,
    gate: Gate,
}

impl<S, E> StateMachine<S, E>
where
    S: Clone + Eq + Hash + Debug,
    E: Clone + Eq + Hash + Debug,
{
    pub(crate) fn new(table: HashMap<(S, E), S>, initial: S) -> Self {
        Self {
            table,
            inner: Mutex::new(Inner {
                state: initial,
                listeners: Vec::new(),
            }),
            gate: Gate::new(),
        }
    }

    /// Current state. Never waits on in-flight listener callbacks.
    pub fn current_state(&self) -> S {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .clone()
    }

    /// Whether the table has a transition for `event` out of the current state
    pub fn is_transition_existing(&self, event: &E) -> bool {
        let state = self.current_state();
        self.table.contains_key(&(state, event.clone()))
    }

    /// Register a listener; it is notified after already-registered ones.
    pub fn add_listener(&self, listener: Arc<dyn StateMachineListener<S, E>>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.listeners.push(listener);
    }

    /// Remove a previously registered listener (matched by identity).
    pub fn remove_listener(&self, listener: &Arc<dyn StateMachineListener<S, E>>) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.listeners.retain(|known| !Arc::ptr_eq(known, listener));
    }

    /// Process an event strictly: if the current state has no transition for
    /// it, listeners are told and [`FsmError::TransitionNotAllowed`] returns.
    pub fn process_event(&self, event: E) -> Result<(), FsmError<S, E>> {
        self.process(event, true)
    }

    /// Process an event silently: if the current state has no transition for
    /// it, nothing happens.
    pub fn process_event_silent(&self, event: E) {
        let _ = self.process(event, false);
    }

    fn process(&self, event: E, strict: bool) -> Result<(), FsmError<S, E>> {
        let _gate = self.gate.enter();

        let (from, listeners) = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            (inner.state.clone(), inner.listeners.clone())
        };

        let Some(to) = self.table.get(&(from.clone(), event.clone())).cloned() else {
            if strict {
                for listener in &listeners {
                    listener.unexisting_transition(&from, &event);
                }
                return Err(FsmError::TransitionNotAllowed { from, event });
            }
            return Ok(());
        };

        {
            let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.state = to.clone();
        }
        tracing::trace!(from = ?from, event = ?event, to = ?to, "transition");

        if to == from {
            for listener in &listeners {
                listener.state_loop(&from, &event);
            }
        } else {
            for listener in &listeners {
                listener.state_changed(&from, &event, &to);
            }
        }
        for listener in &listeners {
            listener.event_occurred(&from, &event, &to);
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "machine_tests.rs"]
mod tests;
