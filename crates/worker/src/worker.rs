// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The controllable worker and its execution thread

use crate::error::{WorkError, WorkFailure, WorkerError};
use crate::observer::WorkerObserver;
use crate::state::{lifecycle_machine, WorkerEvent, WorkerState};
use leash_fsm::{FsmError, StateMachine, StateMachineListener};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, Weak};
use std::thread::{self, ThreadId};

type WorkFn = dyn Fn(&WorkerHandle) -> Result<(), WorkError> + Send + Sync;

/// A long-running unit of work that can be started, paused, resumed,
/// stopped, and restarted through breakpoints the work routine declares.
///
/// `Worker` is a cheap handle; clones control the same underlying worker.
/// Control verbs submit lifecycle events to an internal state machine and
/// fail with [`WorkerError::OperationNotAllowed`] when the current state has
/// no transition for them. Stop and pause are cooperative: they take effect
/// only when the work routine reaches the matching breakpoint.
#[derive(Clone)]
pub struct Worker {
    inner: Arc<WorkerInner>,
}

impl Worker {
    /// Create an unnamed worker around a work routine.
    pub fn new<F>(work: F) -> Self
    where
        F: Fn(&WorkerHandle) -> Result<(), WorkError> + Send + Sync + 'static,
    {
        Self::named("", work)
    }

    /// Create a named worker; the name also labels the execution thread.
    pub fn named<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn(&WorkerHandle) -> Result<(), WorkError> + Send + Sync + 'static,
    {
        let inner = Arc::new(WorkerInner {
            name: name.into(),
            machine: lifecycle_machine(),
            work: Box::new(work),
            observers: Mutex::new(Vec::new()),
            pause: PauseGate::new(),
            crash: Mutex::new(None),
            exec: Mutex::new(None),
        });
        inner.machine.add_listener(Arc::new(LifecycleListener {
            inner: Arc::downgrade(&inner),
        }));
        Self { inner }
    }

    /// Start the worker. Legal from STOPPED (spawns the execution thread)
    /// and from RUNNING_WAITING_FOR_STOP (rescinds the pending stop).
    pub fn start(&self) -> Result<(), WorkerError> {
        self.control(WorkerEvent::Start, "start")
    }

    /// Request a cooperative stop, honored at the next stop breakpoint.
    pub fn stop(&self) -> Result<(), WorkerError> {
        self.control(WorkerEvent::Stop, "stop")
    }

    /// Request a cooperative pause, honored at the next pause breakpoint.
    pub fn pause(&self) -> Result<(), WorkerError> {
        self.control(WorkerEvent::Pause, "pause")
    }

    /// Withdraw a pause request, or release a paused execution thread.
    pub fn resume(&self) -> Result<(), WorkerError> {
        self.control(WorkerEvent::Resume, "resume")
    }

    /// Reset a crashed worker back to STOPPED, clearing the captured failure.
    pub fn restart(&self) -> Result<(), WorkerError> {
        self.control(WorkerEvent::Restart, "restart")
    }

    fn control(&self, event: WorkerEvent, operation: &'static str) -> Result<(), WorkerError> {
        self.inner.machine.process_event(event).map_err(|err| {
            let state = match err {
                FsmError::TransitionNotAllowed { from, .. } => from,
                FsmError::DuplicateTransition { .. } => self.inner.machine.current_state(),
            };
            WorkerError::OperationNotAllowed {
                name: self.inner.name.clone(),
                operation,
                state,
            }
        })
    }

    /// Whether [`start`](Self::start) would succeed right now
    pub fn can_start(&self) -> bool {
        self.can(WorkerEvent::Start)
    }

    /// Whether [`stop`](Self::stop) would succeed right now
    pub fn can_stop(&self) -> bool {
        self.can(WorkerEvent::Stop)
    }

    /// Whether [`pause`](Self::pause) would succeed right now
    pub fn can_pause(&self) -> bool {
        self.can(WorkerEvent::Pause)
    }

    /// Whether [`resume`](Self::resume) would succeed right now
    pub fn can_resume(&self) -> bool {
        self.can(WorkerEvent::Resume)
    }

    /// Whether [`restart`](Self::restart) would succeed right now
    pub fn can_restart(&self) -> bool {
        self.can(WorkerEvent::Restart)
    }

    fn can(&self, event: WorkerEvent) -> bool {
        self.inner.machine.is_transition_existing(&event)
    }

    /// Current lifecycle state
    pub fn current_state(&self) -> WorkerState {
        self.inner.machine.current_state()
    }

    pub fn is_stopped(&self) -> bool {
        self.current_state() == WorkerState::Stopped
    }

    pub fn is_running(&self) -> bool {
        self.current_state() == WorkerState::Running
    }

    pub fn is_running_waiting_for_pause(&self) -> bool {
        self.current_state() == WorkerState::RunningWaitingForPause
    }

    pub fn is_running_waiting_for_stop(&self) -> bool {
        self.current_state() == WorkerState::RunningWaitingForStop
    }

    pub fn is_stopping(&self) -> bool {
        self.current_state() == WorkerState::Stopping
    }

    pub fn is_paused(&self) -> bool {
        self.current_state() == WorkerState::Paused
    }

    pub fn is_crashed(&self) -> bool {
        self.current_state() == WorkerState::Crashed
    }

    /// The failure captured by the last crash, until a restart clears it
    pub fn last_crash_failure(&self) -> Option<WorkFailure> {
        self.inner
            .crash
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// The worker's name; empty unless set at construction
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Identifier of the execution thread while one is alive
    pub fn id(&self) -> Option<ThreadId> {
        *self.inner.exec.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register an observer; it is notified after already-registered ones.
    pub fn add_observer(&self, observer: Arc<dyn WorkerObserver>) {
        let mut observers = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        observers.push(observer);
    }

    /// Remove a previously registered observer (matched by identity).
    pub fn remove_observer(&self, observer: &Arc<dyn WorkerObserver>) {
        let mut observers = self
            .inner
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        observers.retain(|known| !Arc::ptr_eq(known, observer));
    }
}

/// Capability handed to the work routine for declaring breakpoints.
///
/// Both breakpoints must be called from the execution thread; a call that
/// would take effect from anywhere else is a programmer error and panics.
#[derive(Clone)]
pub struct WorkerHandle {
    inner: Arc<WorkerInner>,
}

impl WorkerHandle {
    /// Declare a safe point where a pending pause request may take effect.
    ///
    /// Returns immediately unless a pause was requested, in which case the
    /// execution thread blocks here until resumed.
    pub fn set_pause_breakpoint(&self) {
        self.inner
            .machine
            .process_event_silent(WorkerEvent::PauseBreakpointEncountered);
        if self.inner.machine.current_state() == WorkerState::Paused {
            self.assert_execution_thread("set_pause_breakpoint");
            self.inner.pause.wait_while_blocked();
        }
    }

    /// Declare a safe point where a pending stop request may take effect.
    ///
    /// Returns `Ok(())` unless a stop was requested, in which case the stop
    /// sentinel is raised so the stack unwinds through any cleanup. The work
    /// routine may catch the sentinel to release resources, as long as it
    /// then returns.
    pub fn set_stop_breakpoint(&self) -> Result<(), WorkError> {
        self.inner
            .machine
            .process_event_silent(WorkerEvent::StopBreakpointEncountered);
        if self.inner.machine.current_state() == WorkerState::Stopping {
            self.assert_execution_thread("set_stop_breakpoint");
            return Err(WorkError::Stopped);
        }
        Ok(())
    }

    fn assert_execution_thread(&self, operation: &str) {
        if !self.inner.is_execution_thread() {
            panic!("{operation} must only be called from inside the worker's work routine");
        }
    }
}

struct WorkerInner {
    name: String,
    machine: StateMachine<WorkerState, WorkerEvent>,
    work: Box<WorkFn>,
    observers: Mutex<Vec<Arc<dyn WorkerObserver>>>,
    pause: PauseGate,
    crash: Mutex<Option<WorkFailure>>,
    exec: Mutex<Option<ThreadId>>,
}

impl WorkerInner {
    /// Translate a lifecycle transition into worker effects.
    fn apply(inner: &Arc<Self>, from: WorkerState, to: WorkerState) {
        match to {
            WorkerState::Stopped => match from {
                WorkerState::Stopping => inner.notify(|o| o.stopped_after_stop_request()),
                WorkerState::Crashed => {
                    inner.crash.lock().unwrap_or_else(|e| e.into_inner()).take();
                    inner.notify(|o| o.restarted());
                }
                _ => inner.notify(|o| o.stopped_normally()),
            },
            WorkerState::Running => {
                if matches!(from, WorkerState::Stopped | WorkerState::Crashed) {
                    Self::spawn_execution_thread(inner);
                }
                if from == WorkerState::Paused {
                    inner.pause.release();
                }
                inner.notify(|o| o.running());
            }
            WorkerState::Paused => {
                inner.pause.arm();
                inner.notify(|o| o.paused());
            }
            WorkerState::Crashed => {
                let failure = inner
                    .crash
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .clone();
                if let Some(failure) = failure {
                    inner.notify(|o| o.crashed(&failure));
                }
            }
            WorkerState::RunningWaitingForPause => inner.notify(|o| o.running_waiting_to_pause()),
            WorkerState::RunningWaitingForStop => inner.notify(|o| o.running_waiting_to_stop()),
            WorkerState::Stopping => inner.notify(|o| o.stopping()),
        }
    }

    fn notify(&self, hook: impl Fn(&dyn WorkerObserver)) {
        let observers = self
            .observers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for observer in &observers {
            hook(observer.as_ref());
        }
    }

    fn spawn_execution_thread(inner: &Arc<Self>) {
        let mut builder = thread::Builder::new();
        if !inner.name.is_empty() {
            builder = builder.name(inner.name.clone());
        }

        let spawned = Arc::clone(inner);
        if let Err(err) = builder.spawn(move || spawned.run_work()) {
            tracing::error!(worker = %inner.name, error = %err, "failed to spawn execution thread");
            let failure: WorkFailure = Arc::new(err);
            *inner.crash.lock().unwrap_or_else(|e| e.into_inner()) = Some(failure);
            inner.machine.process_event_silent(WorkerEvent::Crash);
        }
    }

    /// Execution thread body: run the work routine, then report how it ended.
    fn run_work(self: Arc<Self>) {
        *self.exec.lock().unwrap_or_else(|e| e.into_inner()) = Some(thread::current().id());
        tracing::debug!(worker = %self.name, "execution thread started");

        let handle = WorkerHandle {
            inner: Arc::clone(&self),
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| (self.work)(&handle)));

        self.exec.lock().unwrap_or_else(|e| e.into_inner()).take();

        match outcome {
            Ok(Ok(())) | Ok(Err(WorkError::Stopped)) => {
                tracing::debug!(worker = %self.name, "work routine finished");
                self.machine.process_event_silent(WorkerEvent::Terminated);
            }
            Ok(Err(WorkError::Failed(failure))) => {
                tracing::error!(worker = %self.name, error = %failure, "work routine crashed");
                *self.crash.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::from(failure));
                self.machine.process_event_silent(WorkerEvent::Crash);
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(worker = %self.name, panic = %message, "work routine panicked");
                let failure: WorkFailure =
                    Arc::from(Box::<dyn std::error::Error + Send + Sync>::from(message));
                *self.crash.lock().unwrap_or_else(|e| e.into_inner()) = Some(failure);
                self.machine.process_event_silent(WorkerEvent::Crash);
            }
        }
    }

    fn is_execution_thread(&self) -> bool {
        *self.exec.lock().unwrap_or_else(|e| e.into_inner()) == Some(thread::current().id())
    }
}

/// Internal state machine listener translating transitions into effects
struct LifecycleListener {
    inner: Weak<WorkerInner>,
}

impl StateMachineListener<WorkerState, WorkerEvent> for LifecycleListener {
    fn state_changed(&self, from: &WorkerState, _event: &WorkerEvent, to: &WorkerState) {
        if let Some(inner) = self.inner.upgrade() {
            WorkerInner::apply(&inner, *from, *to);
        }
    }
}

/// Blocks the execution thread while paused.
///
/// Armed on PAUSED entry and released by resume; the flag is checked under
/// the mutex so a release that lands before the thread reaches `wait` is
/// never lost.
struct PauseGate {
    blocked: Mutex<bool>,
    resumed: Condvar,
}

impl PauseGate {
    fn new() -> Self {
        Self {
            blocked: Mutex::new(false),
            resumed: Condvar::new(),
        }
    }

    fn arm(&self) {
        *self.blocked.lock().unwrap_or_else(|e| e.into_inner()) = true;
    }

    fn release(&self) {
        let mut blocked = self.blocked.lock().unwrap_or_else(|e| e.into_inner());
        *blocked = false;
        self.resumed.notify_one();
    }

    fn wait_while_blocked(&self) {
        let mut blocked = self.blocked.lock().unwrap_or_else(|e| e.into_inner());
        while *blocked {
            blocked = self.resumed.wait(blocked).unwrap_or_else(|e| e.into_inner());
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
