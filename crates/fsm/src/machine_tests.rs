use super::*;
use crate::builder::StateMachineBuilder;
use crate::listener::FnListener;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Light {
    Red,
    Green,
    Yellow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Input {
    Go,
    Caution,
    Halt,
    Refresh,
}

fn traffic_machine() -> StateMachine<Light, Input> {
    let mut builder = StateMachineBuilder::new();
    builder
        .add_transition(Light::Red, Input::Go, Light::Green)
        .unwrap();
    builder
        .add_transition(Light::Green, Input::Caution, Light::Yellow)
        .unwrap();
    builder
        .add_transition(Light::Green, Input::Halt, Light::Red)
        .unwrap();
    builder
        .add_transition(Light::Yellow, Input::Halt, Light::Red)
        .unwrap();
    builder
        .add_transition(Light::Red, Input::Refresh, Light::Red)
        .unwrap();
    builder.create(Light::Red)
}

fn recording_listener(log: &Arc<Mutex<Vec<String>>>, tag: &str) -> Arc<FnListener<Light, Input>> {
    let tag = tag.to_string();
    let changed_log = Arc::clone(log);
    let changed_tag = tag.clone();
    let occurred_log = Arc::clone(log);
    let occurred_tag = tag.clone();
    let loop_log = Arc::clone(log);
    let loop_tag = tag.clone();
    let missing_log = Arc::clone(log);
    let missing_tag = tag;

    Arc::new(
        FnListener::new()
            .on_state_changed(move |from, _, to| {
                let mut log = changed_log.lock().unwrap();
                log.push(format!("{changed_tag}:changed {from:?}->{to:?}"));
            })
            .on_event_occurred(move |from, _, to| {
                let mut log = occurred_log.lock().unwrap();
                log.push(format!("{occurred_tag}:occurred {from:?}->{to:?}"));
            })
            .on_state_loop(move |state, _| {
                let mut log = loop_log.lock().unwrap();
                log.push(format!("{loop_tag}:loop {state:?}"));
            })
            .on_unexisting_transition(move |from, event| {
                let mut log = missing_log.lock().unwrap();
                log.push(format!("{missing_tag}:missing {from:?} {event:?}"));
            }),
    )
}

#[test]
fn process_event_advances_state() {
    let machine = traffic_machine();
    machine.process_event(Input::Go).unwrap();
    assert_eq!(machine.current_state(), Light::Green);
}

#[test]
fn strict_processing_fails_on_unknown_transition() {
    let machine = traffic_machine();
    let err = machine.process_event(Input::Caution).unwrap_err();
    assert_eq!(
        err,
        FsmError::TransitionNotAllowed {
            from: Light::Red,
            event: Input::Caution,
        }
    );
    assert_eq!(machine.current_state(), Light::Red);
}

#[test]
fn silent_processing_absorbs_unknown_transitions() {
    let machine = traffic_machine();
    let log = Arc::new(Mutex::new(Vec::new()));
    machine.add_listener(recording_listener(&log, "a"));

    machine.process_event_silent(Input::Caution);

    assert_eq!(machine.current_state(), Light::Red);
    assert!(log.lock().unwrap().is_empty());
}

#[test]
fn loop_transition_keeps_state_and_fires_state_loop() {
    let machine = traffic_machine();
    let log = Arc::new(Mutex::new(Vec::new()));
    machine.add_listener(recording_listener(&log, "a"));

    machine.process_event(Input::Refresh).unwrap();

    assert_eq!(machine.current_state(), Light::Red);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["a:loop Red", "a:occurred Red->Red"]
    );
}

#[test]
fn unexisting_transition_fires_before_the_strict_error() {
    let machine = traffic_machine();
    let log = Arc::new(Mutex::new(Vec::new()));
    machine.add_listener(recording_listener(&log, "a"));

    machine.process_event(Input::Halt).unwrap_err();

    assert_eq!(*log.lock().unwrap(), vec!["a:missing Red Halt"]);
}

#[test]
fn listeners_fire_in_registration_order() {
    let machine = traffic_machine();
    let log = Arc::new(Mutex::new(Vec::new()));
    machine.add_listener(recording_listener(&log, "a"));
    machine.add_listener(recording_listener(&log, "b"));

    machine.process_event(Input::Go).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "a:changed Red->Green",
            "b:changed Red->Green",
            "a:occurred Red->Green",
            "b:occurred Red->Green",
        ]
    );
}

#[test]
fn removed_listener_is_not_notified() {
    let machine = traffic_machine();
    let log = Arc::new(Mutex::new(Vec::new()));
    let keep = recording_listener(&log, "keep");
    let removed: Arc<dyn StateMachineListener<Light, Input>> = recording_listener(&log, "removed");
    machine.add_listener(keep);
    machine.add_listener(Arc::clone(&removed));

    machine.remove_listener(&removed);
    machine.process_event(Input::Go).unwrap();

    let log = log.lock().unwrap();
    assert!(log.iter().all(|entry| entry.starts_with("keep:")));
    assert_eq!(log.len(), 2);
}

#[test]
fn is_transition_existing_follows_the_current_state() {
    let machine = traffic_machine();
    assert!(machine.is_transition_existing(&Input::Go));
    assert!(!machine.is_transition_existing(&Input::Caution));

    machine.process_event(Input::Go).unwrap();
    assert!(!machine.is_transition_existing(&Input::Go));
    assert!(machine.is_transition_existing(&Input::Caution));
}

#[test]
fn listener_can_process_events_reentrantly() {
    let machine = Arc::new(traffic_machine());
    let log = Arc::new(Mutex::new(Vec::new()));
    machine.add_listener(recording_listener(&log, "a"));

    let reentrant = Arc::clone(&machine);
    machine.add_listener(Arc::new(FnListener::new().on_state_changed(
        move |_, _, to| {
            if *to == Light::Green {
                reentrant.process_event(Input::Caution).unwrap();
            }
        },
    )));

    machine.process_event(Input::Go).unwrap();

    assert_eq!(machine.current_state(), Light::Yellow);
    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "a:changed Red->Green",
            "a:changed Green->Yellow",
            "a:occurred Green->Yellow",
            "a:occurred Red->Green",
        ]
    );
}

#[test]
fn concurrent_events_are_linearized() {
    let machine = Arc::new(traffic_machine());
    let log = Arc::new(Mutex::new(Vec::new()));

    let transitions = Arc::clone(&log);
    machine.add_listener(Arc::new(FnListener::new().on_state_changed(
        move |from: &Light, _: &Input, to: &Light| {
            transitions.lock().unwrap().push((*from, *to));
        },
    )));

    let goer = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            for _ in 0..200 {
                machine.process_event_silent(Input::Go);
            }
        })
    };
    let halter = {
        let machine = Arc::clone(&machine);
        thread::spawn(move || {
            for _ in 0..200 {
                machine.process_event_silent(Input::Halt);
            }
        })
    };
    goer.join().unwrap();
    halter.join().unwrap();

    let log = log.lock().unwrap();
    let mut expected_from = Light::Red;
    for (from, to) in log.iter() {
        assert_eq!(*from, expected_from);
        assert!(matches!(
            (from, to),
            (Light::Red, Light::Green) | (Light::Green, Light::Red)
        ));
        expected_from = *to;
    }
}
