// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builder accumulating transitions into an immutable table

use crate::error::FsmError;
use crate::machine::StateMachine;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Accumulates `(from, event) -> to` transitions, then freezes them into a
/// [`StateMachine`]
#[derive(Debug)]
pub struct StateMachineBuilder<S, E> {
    table: HashMap<(S, E), S>,
}

impl<S, E> StateMachineBuilder<S, E>
where
    S: Clone + Eq + Hash + Debug,
    E: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Register a transition. Registering the same `(from, event)` pair
    /// twice fails with [`FsmError::DuplicateTransition`].
    pub fn add_transition(&mut self, from: S, event: E, to: S) -> Result<&mut Self, FsmError<S, E>> {
        match self.table.entry((from, event)) {
            Entry::Occupied(existing) => {
                let (from, event) = existing.key().clone();
                Err(FsmError::DuplicateTransition { from, event })
            }
            Entry::Vacant(slot) => {
                slot.insert(to);
                Ok(self)
            }
        }
    }

    /// Freeze the table and return a machine sitting in `initial`.
    pub fn create(self, initial: S) -> StateMachine<S, E> {
        StateMachine::new(self.table, initial)
    }
}

impl<S, E> Default for StateMachineBuilder<S, E>
where
    S: Clone + Eq + Hash + Debug,
    E: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
