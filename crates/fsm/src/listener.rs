// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener hooks fired by a running state machine

/// Callbacks fired by a [`StateMachine`](crate::StateMachine) as events are
/// processed.
///
/// Every hook defaults to a no-op so implementors override only what they
/// care about.
pub trait StateMachineListener<S, E>: Send + Sync {
    /// The machine moved to a different state.
    fn state_changed(&self, _from: &S, _event: &E, _to: &S) {}

    /// An event was processed, whether or not the state changed.
    fn event_occurred(&self, _from: &S, _event: &E, _to: &S) {}

    /// A transition whose target equals its source was taken.
    fn state_loop(&self, _state: &S, _event: &E) {}

    /// Strict processing found no transition; fired before the error returns.
    fn unexisting_transition(&self, _from: &S, _event: &E) {}
}

type TransitionHook<S, E> = Box<dyn Fn(&S, &E, &S) + Send + Sync>;
type EventHook<S, E> = Box<dyn Fn(&S, &E) + Send + Sync>;

/// Listener assembled from optional closures, for callers that do not want
/// to define a dedicated listener type.
pub struct FnListener<S, E> {
    state_changed: Option<TransitionHook<S, E>>,
    event_occurred: Option<TransitionHook<S, E>>,
    state_loop: Option<EventHook<S, E>>,
    unexisting_transition: Option<EventHook<S, E>>,
}

impl<S, E> FnListener<S, E> {
    pub fn new() -> Self {
        Self {
            state_changed: None,
            event_occurred: None,
            state_loop: None,
            unexisting_transition: None,
        }
    }

    /// Set the hook fired when the machine moves to a different state
    pub fn on_state_changed(mut self, hook: impl Fn(&S, &E, &S) + Send + Sync + 'static) -> Self {
        self.state_changed = Some(Box::new(hook));
        self
    }

    /// Set the hook fired on every processed event
    pub fn on_event_occurred(mut self, hook: impl Fn(&S, &E, &S) + Send + Sync + 'static) -> Self {
        self.event_occurred = Some(Box::new(hook));
        self
    }

    /// Set the hook fired when a transition loops back to its source
    pub fn on_state_loop(mut self, hook: impl Fn(&S, &E) + Send + Sync + 'static) -> Self {
        self.state_loop = Some(Box::new(hook));
        self
    }

    /// Set the hook fired when strict processing finds no transition
    pub fn on_unexisting_transition(
        mut self,
        hook: impl Fn(&S, &E) + Send + Sync + 'static,
    ) -> Self {
        self.unexisting_transition = Some(Box::new(hook));
        self
    }
}

impl<S, E> Default for FnListener<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, E> StateMachineListener<S, E> for FnListener<S, E> {
    fn state_changed(&self, from: &S, event: &E, to: &S) {
        if let Some(hook) = &self.state_changed {
            hook(from, event, to);
        }
    }

    fn event_occurred(&self, from: &S, event: &E, to: &S) {
        if let Some(hook) = &self.event_occurred {
            hook(from, event, to);
        }
    }

    fn state_loop(&self, state: &S, event: &E) {
        if let Some(hook) = &self.state_loop {
            hook(state, event);
        }
    }

    fn unexisting_transition(&self, from: &S, event: &E) {
        if let Some(hook) = &self.unexisting_transition {
            hook(from, event);
        }
    }
}
