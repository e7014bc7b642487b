use super::*;
use super::{WorkerEvent as E, WorkerState as S};

/// The complete lifecycle table; absence of a row means the transition is
/// illegal.
const TABLE: &[(S, E, S)] = &[
    (S::Stopped, E::Start, S::Running),
    (S::Running, E::Stop, S::RunningWaitingForStop),
    (S::Running, E::Pause, S::RunningWaitingForPause),
    (S::Running, E::Crash, S::Crashed),
    (S::Running, E::Terminated, S::Stopped),
    (S::RunningWaitingForStop, E::Start, S::Running),
    (S::RunningWaitingForStop, E::StopBreakpointEncountered, S::Stopping),
    (S::RunningWaitingForStop, E::Pause, S::RunningWaitingForPause),
    (S::RunningWaitingForStop, E::Crash, S::Crashed),
    (S::RunningWaitingForStop, E::Terminated, S::Stopped),
    (S::RunningWaitingForPause, E::Resume, S::Running),
    (S::RunningWaitingForPause, E::PauseBreakpointEncountered, S::Paused),
    (S::RunningWaitingForPause, E::Stop, S::RunningWaitingForStop),
    (S::RunningWaitingForPause, E::Crash, S::Crashed),
    (S::RunningWaitingForPause, E::Terminated, S::Stopped),
    (S::Paused, E::Resume, S::Running),
    (S::Stopping, E::Terminated, S::Stopped),
    (S::Stopping, E::Crash, S::Crashed),
    (S::Crashed, E::Restart, S::Stopped),
];

const ALL_STATES: &[S] = &[
    S::Stopped,
    S::Running,
    S::RunningWaitingForPause,
    S::RunningWaitingForStop,
    S::Stopping,
    S::Paused,
    S::Crashed,
];

const ALL_EVENTS: &[E] = &[
    E::Start,
    E::Stop,
    E::Pause,
    E::Resume,
    E::Restart,
    E::PauseBreakpointEncountered,
    E::StopBreakpointEncountered,
    E::Terminated,
    E::Crash,
];

/// Drive a fresh machine into `state` along a known-legal path.
fn machine_in(state: S) -> StateMachine<WorkerState, WorkerEvent> {
    let path: &[E] = match state {
        S::Stopped => &[],
        S::Running => &[E::Start],
        S::RunningWaitingForStop => &[E::Start, E::Stop],
        S::RunningWaitingForPause => &[E::Start, E::Pause],
        S::Stopping => &[E::Start, E::Stop, E::StopBreakpointEncountered],
        S::Paused => &[E::Start, E::Pause, E::PauseBreakpointEncountered],
        S::Crashed => &[E::Start, E::Crash],
    };

    let machine = lifecycle_machine();
    for event in path {
        machine.process_event(*event).unwrap();
    }
    assert_eq!(machine.current_state(), state);
    machine
}

#[test]
fn initial_state_is_stopped() {
    assert_eq!(lifecycle_machine().current_state(), S::Stopped);
}

#[test]
fn legal_transitions_follow_the_table() {
    for (from, event, to) in TABLE {
        let machine = machine_in(*from);
        machine.process_event(*event).unwrap();
        assert_eq!(
            machine.current_state(),
            *to,
            "{from} --{event}--> expected {to}"
        );
    }
}

#[test]
fn transitions_absent_from_the_table_are_rejected() {
    for from in ALL_STATES {
        for event in ALL_EVENTS {
            if TABLE.iter().any(|(f, e, _)| f == from && e == event) {
                continue;
            }
            let machine = machine_in(*from);
            machine.process_event(*event).unwrap_err();
            assert_eq!(
                machine.current_state(),
                *from,
                "{from} --{event}--> should be illegal"
            );
        }
    }
}

#[test]
fn waiting_for_pause_does_not_accept_start() {
    // The table is deliberately asymmetric: START rescinds a pending stop
    // but not a pending pause.
    let machine = machine_in(S::RunningWaitingForStop);
    machine.process_event(E::Start).unwrap();
    assert_eq!(machine.current_state(), S::Running);

    let machine = machine_in(S::RunningWaitingForPause);
    machine.process_event(E::Start).unwrap_err();
    assert_eq!(machine.current_state(), S::RunningWaitingForPause);
}

#[test]
fn state_names_match_their_debug_identifiers() {
    assert_eq!(S::Stopped.name(), "STOPPED");
    assert_eq!(
        S::RunningWaitingForPause.name(),
        "RUNNING_WAITING_FOR_PAUSE"
    );
    assert_eq!(S::Crashed.to_string(), "CRASHED");
    assert_eq!(E::PauseBreakpointEncountered.name(), "PAUSE_BREAKPOINT_ENCOUNTERED");
    assert_eq!(E::Start.to_string(), "START");
}
