//! Timed playback over a manual host timer.

use dcviz_core::{
    Algorithm, FrameEffect, Highlights, Locals, ManualTimer, PlaybackConfig, PlaybackState,
    Player, ReplayState, TimerId, TraceAction,
};
use proptest::prelude::*;
use std::time::Duration;

/// A flat log of `n` numbered ticks; enough to observe cursor movement.
#[derive(Clone, Debug)]
struct Mark(usize);

impl TraceAction for Mark {
    fn kind(&self) -> &'static str {
        "mark"
    }

    fn frame(&self) -> FrameEffect {
        FrameEffect::Inline
    }
}

#[derive(Default)]
struct Seen(Vec<usize>);

impl ReplayState for Seen {
    type Action = Mark;

    fn apply(&mut self, action: &Mark) {
        self.0.push(action.0);
    }

    fn highlights(&self) -> Highlights {
        Highlights::default()
    }

    fn locals(&self) -> Locals {
        Locals::default()
    }

    fn result_text(&self) -> String {
        self.0.len().to_string()
    }
}

struct Marks;

impl Algorithm for Marks {
    const NAME: &'static str = "marks";
    type Input = usize;
    type Action = Mark;
    type State = Seen;

    fn build_trace(n: &usize) -> Vec<Mark> {
        (0..*n).map(Mark).collect()
    }

    fn initial_state(_n: &usize) -> Seen {
        Seen::default()
    }
}

fn fire(p: &mut Player<Marks, ManualTimer>) -> bool {
    match p.timer().fire() {
        Some(id) => p.tick(id),
        None => false,
    }
}

#[test]
fn run_is_idempotent_and_clamped() {
    let mut p = Player::<Marks, _>::new(5, ManualTimer::new());
    assert_eq!(p.state(), PlaybackState::Paused);
    assert!(p.run(20));
    assert!(!p.run(900));
    assert_eq!(p.timer().active_count(), 1);
    assert_eq!(p.interval(), Duration::from_millis(100));
    assert_eq!(p.state(), PlaybackState::Playing);
}

#[test]
fn reaching_the_end_auto_pauses() {
    let mut p = Player::<Marks, _>::new(3, ManualTimer::new());
    p.run(100);
    assert!(fire(&mut p));
    assert!(fire(&mut p));
    assert!(fire(&mut p));
    assert!(!p.is_running());
    assert_eq!(p.timer().active_count(), 0);
    assert!(!fire(&mut p));
    assert_eq!(p.replay().cursor(), 3);
    // Nothing left to play.
    assert!(!p.run(100));
}

#[test]
fn pause_is_safe_and_stale_ticks_are_ignored() {
    let mut p = Player::<Marks, _>::new(10, ManualTimer::new());
    p.pause();
    assert!(p.run(100));
    let first = p.timer().fire().unwrap();
    assert!(p.tick(first));
    p.pause();
    p.pause();
    assert!(!p.tick(first));
    assert_eq!(p.replay().cursor(), 1);
    assert!(!p.tick(TimerId(12345)));
}

#[test]
fn interval_change_restarts_timer_without_moving_cursor() {
    let mut p = Player::<Marks, _>::with_config(
        10,
        ManualTimer::new(),
        PlaybackConfig { interval_ms: 400, seed: None },
    );
    assert_eq!(p.interval(), Duration::from_millis(400));
    p.set_interval(200); // not running: only remembered
    assert!(p.timer().history().is_empty());
    p.run(300);
    fire(&mut p);
    fire(&mut p);
    let old = p.timer().fire().unwrap();
    p.set_interval(5_000);
    assert_eq!(p.replay().cursor(), 2);
    assert_eq!(p.timer().active_count(), 1);
    assert_eq!(p.timer().active().unwrap().1, Duration::from_millis(1500));
    assert!(!p.tick(old));
    assert!(fire(&mut p));
    assert_eq!(p.replay().cursor(), 3);
}

#[test]
fn step_over_and_reset_pause_playback() {
    let mut p = Player::<Marks, _>::new(4, ManualTimer::new());
    p.run(100);
    p.reset(2);
    assert!(!p.is_running());
    assert_eq!(p.replay().len(), 2);
    assert_eq!(p.replay().cursor(), 0);
    p.run(100);
    p.rewind();
    assert!(!p.is_running());
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    // Any interleaving of ticks, pauses and resumes applies each action once, in order.
    #[test]
    fn pause_resume_never_skips_or_repeats(
        n in 1usize..=40,
        ops in prop::collection::vec(0u8..=3, 0..120),
    ) {
        let mut p = Player::<Marks, _>::new(n, ManualTimer::new());
        for op in ops {
            match op {
                0 => { p.run(100); }
                1 => p.pause(),
                2 => { p.step_once(); }
                _ => { fire(&mut p); }
            }
            prop_assert!(p.timer().active_count() <= 1);
        }
        p.replay().state().0.iter().enumerate().for_each(|(i, v)| assert_eq!(i, *v));
        prop_assert_eq!(p.replay().state().0.len(), p.replay().cursor());
    }
}
