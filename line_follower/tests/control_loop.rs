mod common;

use common::*;
use line_follower::{
    AcquisitionError, ActuatorError, Command, ControlLoop, LinePipeline, LoopError, LoopState,
    MotorCommand, TickOutcome, stop_channel,
};
use line_follower::error::Component;
use std::time::Duration;

type TestLoop = ControlLoop<ScriptedSource, RecordingActuator>;

fn started(script: Vec<Result<line_follower::Frame, AcquisitionError>>, journal: &SharedJournal) -> TestLoop {
    let mut control = TestLoop::new(LinePipeline::default(), Duration::ZERO);
    let source = ScriptedSource::new(script, journal.clone());
    let actuator = RecordingActuator::new(journal.clone());
    control
        .start(|| Ok::<_, String>(source), || Ok::<_, String>(actuator))
        .expect("fakes always open");
    control
}

#[test]
fn new_loop_is_idle_and_refuses_to_tick() {
    let mut control = TestLoop::new(LinePipeline::default(), Duration::ZERO);
    assert_eq!(control.state(), LoopState::Idle);
    assert!(matches!(control.tick(), Err(LoopError::NotRunning)));
}

#[test]
fn start_enters_running_and_cannot_start_twice() {
    let journal = journal();
    let mut control = started(vec![], &journal);
    assert_eq!(control.state(), LoopState::Running);

    let again = control.start(
        || Ok::<_, String>(ScriptedSource::new(vec![], journal.clone())),
        || Ok::<_, String>(RecordingActuator::new(journal.clone())),
    );
    assert!(matches!(again, Err(LoopError::AlreadyStarted)));
}

#[test]
fn camera_failure_stops_the_actuator_and_never_runs() {
    let journal = journal();
    let mut control = TestLoop::new(LinePipeline::default(), Duration::ZERO);
    let actuator = RecordingActuator::new(journal.clone());

    let err = control
        .start(|| Err::<ScriptedSource, _>("could not open video source"), || Ok::<_, String>(actuator))
        .unwrap_err();

    match err {
        LoopError::Initialization { component, reason } => {
            assert_eq!(component, Component::FrameSource);
            assert_eq!(reason, "could not open video source");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(control.state(), LoopState::Stopped);
    assert_eq!(journal.borrow().commands, vec![MotorCommand::Stop]);
    assert_eq!(journal.borrow().effective_cleanups, 1);
    assert_eq!(journal.borrow().frames_read, 0);
}

#[test]
fn actuator_failure_never_opens_the_camera() {
    let journal = journal();
    let mut control = TestLoop::new(LinePipeline::default(), Duration::ZERO);
    let mut camera_opened = false;

    let err = control
        .start(
            || {
                camera_opened = true;
                Ok::<_, String>(ScriptedSource::new(vec![], journal.clone()))
            },
            || Err::<RecordingActuator, _>("gpio busy"),
        )
        .unwrap_err();

    assert!(matches!(err, LoopError::Initialization { component: Component::Actuator, .. }));
    assert!(!camera_opened);
    assert_eq!(control.state(), LoopState::Stopped);
}

#[test]
fn missing_frame_skips_the_tick_and_issues_nothing() {
    let journal = journal();
    let mut control = started(vec![Err(AcquisitionError::NoFrame), Ok(vertical_stripe(320, 20))], &journal);

    assert_eq!(control.tick().unwrap(), TickOutcome::Skipped(AcquisitionError::NoFrame));
    assert!(journal.borrow().commands.is_empty());

    let TickOutcome::Issued(perception) = control.tick().unwrap() else {
        panic!("second frame should be processed");
    };
    assert_eq!(perception.command, Command::Forward);
    assert_eq!(journal.borrow().commands, vec![MotorCommand::Forward]);
    assert_eq!(control.stats().skipped, 1);
    assert_eq!(control.stats().ticks, 1);
}

#[test]
fn intersection_turn_is_issued_after_the_steering_command() {
    let journal = journal();
    let mut control = started(vec![Ok(with_crossing(vertical_stripe(320, 20)))], &journal);

    control.tick().unwrap();
    assert_eq!(journal.borrow().commands, vec![MotorCommand::Left, MotorCommand::Right]);
    assert_eq!(control.stats().intersections, 1);
}

#[test]
fn blank_frame_commands_stop() {
    let journal = journal();
    let mut control = started(vec![Ok(black_frame())], &journal);

    control.tick().unwrap();
    assert_eq!(journal.borrow().commands, vec![MotorCommand::Stop]);
}

#[test]
fn run_exits_on_stop_signal_and_releases_once() {
    let journal = journal();
    let mut control = started(vec![Ok(vertical_stripe(320, 20))], &journal);
    let (handle, signal) = stop_channel();
    handle.raise();

    let stats = control.run(&signal).expect("clean stop");
    assert_eq!(stats.ticks, 0);
    assert_eq!(control.state(), LoopState::Stopped);

    let journal = journal.borrow();
    assert_eq!(journal.frames_read, 0);
    assert_eq!(journal.commands, vec![MotorCommand::Stop]);
    assert_eq!(journal.effective_cleanups, 1);
    assert_eq!(journal.source_releases, 1);
}

#[test]
fn actuator_error_while_running_shuts_down() {
    let journal = journal();
    let mut control = TestLoop::new(LinePipeline::default(), Duration::ZERO);
    let source = ScriptedSource::new(vec![Ok(vertical_stripe(320, 20))], journal.clone());
    let actuator = RecordingActuator::failing_on(journal.clone(), MotorCommand::Forward);
    control.start(|| Ok::<_, String>(source), || Ok::<_, String>(actuator)).unwrap();

    let (_handle, signal) = stop_channel();
    let err = control.run(&signal).unwrap_err();

    assert!(matches!(err, LoopError::Actuator(ActuatorError::Hardware(_))));
    assert_eq!(control.state(), LoopState::Stopped);
    assert_eq!(journal.borrow().commands, vec![MotorCommand::Stop]);
    assert_eq!(journal.borrow().source_releases, 1);
}

#[test]
fn shutdown_is_idempotent_and_drop_does_not_release_again() {
    let journal = journal();
    let mut control = started(vec![], &journal);

    control.shutdown();
    control.shutdown();
    drop(control);

    let journal = journal.borrow();
    assert_eq!(journal.commands, vec![MotorCommand::Stop]);
    assert_eq!(journal.cleanups, 1);
    assert_eq!(journal.source_releases, 1);
}

#[test]
fn dropping_a_running_loop_releases_everything() {
    let journal = journal();
    let control = started(vec![], &journal);
    drop(control);

    assert_eq!(journal.borrow().commands, vec![MotorCommand::Stop]);
    assert_eq!(journal.borrow().effective_cleanups, 1);
    assert_eq!(journal.borrow().source_releases, 1);
}

#[test]
fn recording_actuator_cleanup_twice_is_a_noop() {
    use line_follower::ActuatorSink;

    let journal = journal();
    let mut actuator = RecordingActuator::new(journal.clone());
    actuator.cleanup();
    actuator.cleanup();
    assert_eq!(journal.borrow().effective_cleanups, 1);
    assert_eq!(actuator.apply(MotorCommand::Stop), Ok(()));
}
