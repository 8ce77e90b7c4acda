//! Playback controller driven through the public API.

use std::time::Duration;

use algoscope::cli::play_session;
use algoscope::prelude::*;
use proptest::prelude::*;

fn bubble_buffer() -> TraceBuffer {
    TraceBuffer::materialize(
        Algorithm::BubbleSort.tracer(),
        &TraceInput::Values(vec![5, 2, 4, 1, 3]),
        &LimitsConfig::default(),
    )
    .unwrap()
}

fn attached() -> PlaybackController {
    let mut playback = PlaybackController::default();
    assert!(playback.attach(bubble_buffer()));
    playback
}

#[test]
fn play_to_completion_then_replay() {
    let mut playback = attached();
    let len = playback.len();

    assert!(playback.play());
    let mut completions = 0;
    for _ in 0..len * 2 {
        if let TickOutcome::RunComplete { position } = playback.tick() {
            assert_eq!(position, len - 1);
            completions += 1;
        }
    }
    assert_eq!(completions, 1);
    assert_eq!(playback.mode(), PlaybackMode::Paused);
    assert!(!playback.play());

    assert!(playback.reset());
    assert!(playback.play());
    while playback.is_playing() {
        playback.tick();
    }
    assert_eq!(playback.position(), len - 1);
    assert_eq!(playback.current_step().unwrap().label(), "done");
}

#[test]
fn stepping_pauses_and_stops_at_end() {
    let mut playback = attached();
    playback.play();
    assert!(playback.step());
    assert_eq!(playback.mode(), PlaybackMode::Paused);
    assert_eq!(playback.position(), 1);

    while playback.step() {}
    assert_eq!(playback.position(), playback.len() - 1);
    assert!(!playback.can_step());
}

#[test]
fn idle_controller_ignores_everything() {
    let mut playback = PlaybackController::default();
    assert_eq!(playback.mode(), PlaybackMode::Idle);
    assert!(!playback.play());
    assert!(!playback.step());
    assert!(!playback.reset());
    assert_eq!(playback.tick(), TickOutcome::Ignored);
    assert!(playback.current_step().is_none());
    assert_eq!(playback.frame_label(), "0/0");
}

#[test]
fn attaching_empty_buffer_is_refused() {
    let mut playback = attached();
    playback.step();
    assert!(!playback.attach(TraceBuffer::empty()));
    assert_eq!(playback.position(), 1);
}

#[test]
fn speed_changes_tick_interval_without_moving() {
    let mut playback = attached();
    playback.step();

    assert!((playback.set_speed(2.0) - 2.0).abs() < f64::EPSILON);
    assert_eq!(playback.tick_interval(), Duration::from_millis(250));
    assert_eq!(playback.position(), 1);

    assert!((playback.set_speed(100.0) - 16.0).abs() < f64::EPSILON);
    assert_eq!(playback.tick_interval(), Duration::from_millis(100));

    assert!((playback.set_speed(0.0) - 0.25).abs() < f64::EPSILON);
    assert_eq!(playback.tick_interval(), Duration::from_secs(2));
}

#[test]
fn configured_playback_from_yaml() {
    let config = VizConfig::from_yaml(
        "playback:\n  base_delay_ms: 200\n  min_interval_ms: 50\n  min_speed: 0.5\n  max_speed: 4.0\n  presets: [1.0, 2.0]\n",
    )
    .unwrap();
    let mut playback = PlaybackController::new(config.playback);
    playback.attach(bubble_buffer());
    assert_eq!(playback.tick_interval(), Duration::from_millis(200));
    assert!(playback.apply_preset(1));
    assert_eq!(playback.tick_interval(), Duration::from_millis(100));
    assert!(!playback.apply_preset(2));
}

#[test]
fn headless_play_reports_completion_once() {
    let buffer = bubble_buffer();
    let mut out = Vec::new();
    let summary =
        play_session(buffer.clone(), &VizConfig::default(), Some(4.0), true, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(summary.frames, buffer.len());
    assert_eq!(summary.completions, 1);
    assert_eq!(summary.final_position, buffer.len() - 1);
    assert_eq!(text.matches("Run complete: done").count(), 1);
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Play,
    Pause,
    Step,
    Reset,
    Tick,
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Play),
        Just(Action::Pause),
        Just(Action::Step),
        Just(Action::Reset),
        Just(Action::Tick),
    ]
}

proptest! {
    #[test]
    fn prop_position_stays_in_bounds(actions in prop::collection::vec(action(), 0..200)) {
        let mut playback = attached();
        let len = playback.len();
        let mut completions = 0;
        let mut resets = 0;
        for a in actions {
            let before = playback.position();
            match a {
                Action::Play => { playback.play(); }
                Action::Pause => { playback.pause(); }
                Action::Step => { playback.step(); }
                Action::Reset => {
                    playback.reset();
                    resets += 1;
                }
                Action::Tick => {
                    if matches!(playback.tick(), TickOutcome::RunComplete { .. }) {
                        completions += 1;
                    }
                }
            }
            prop_assert!(playback.position() < len);
            if !matches!(a, Action::Reset) {
                prop_assert!(playback.position() >= before);
                prop_assert!(playback.position() <= before + 1);
            }
            if playback.position() == len - 1 {
                prop_assert!(!playback.is_playing());
            }
        }
        prop_assert!(completions <= resets + 1);
    }
}
