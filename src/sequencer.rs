//! StepSequencer: turns frame time into discrete stepper calls.
//!
//! The host calls [`StepSequencer::tick`] once per frame with the elapsed
//! time. Time accumulates only while running; once a full interval has
//! built up, exactly one step runs and the interval is consumed. Pausing
//! stops accumulation, so resuming never releases a burst of catch-up steps.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::StepEvent;
use crate::stepper::AlgorithmStepper;

pub const MIN_SPEED: u8 = 1;
pub const MAX_SPEED: u8 = 100;

/// Maps a speed percentage to the time between steps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpeedCurve {
    /// `base_ms · 10 · 0.1^(2·speed/100)`: 10× slower at 0 %, `base_ms` at
    /// 50 %, 10× faster at 100 %. Never below 1 ms.
    Exponential { base_ms: f64 },
    /// One step every `round(100 / speed)` frames of `frame_ms`.
    Frames { frame_ms: f64 },
}

impl Default for SpeedCurve {
    fn default() -> Self {
        SpeedCurve::Exponential { base_ms: 20.0 }
    }
}

impl SpeedCurve {
    /// Milliseconds between steps at `speed` percent.
    pub fn interval_ms(&self, speed: u8) -> f64 {
        let speed = speed.clamp(MIN_SPEED, MAX_SPEED) as f64;
        match *self {
            SpeedCurve::Exponential { base_ms } => {
                let factor = 10.0 * 0.1_f64.powf(2.0 * speed / 100.0);
                (base_ms * factor).max(1.0)
            }
            SpeedCurve::Frames { frame_ms } => (100.0 / speed).round() * frame_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencerState {
    /// No stepper loaded.
    Idle,
    /// Loaded, waiting for `resume`.
    Ready,
    Running,
    Paused,
    /// The stepper reported completion.
    Finished,
}

#[derive(Debug, Clone)]
pub struct StepSequencer<S> {
    stepper: Option<S>,
    state: SequencerState,
    speed: u8,
    curve: SpeedCurve,
    accumulated_ms: f64,
    last_event: Option<StepEvent>,
    steps: u64,
}

impl<S: AlgorithmStepper> StepSequencer<S> {
    pub fn new(curve: SpeedCurve) -> Self {
        StepSequencer {
            stepper: None,
            state: SequencerState::Idle,
            speed: 50,
            curve,
            accumulated_ms: 0.0,
            last_event: None,
            steps: 0,
        }
    }

    /// Install a stepper, replacing any previous run. Starts in `Ready`.
    pub fn load(&mut self, stepper: S) {
        debug!(name = stepper.name(), "sequencer loaded stepper");
        self.stepper = Some(stepper);
        self.clear_run();
        self.state = SequencerState::Ready;
    }

    /// Set the speed percentage, clamped to `1..=100`; read on the next tick.
    pub fn configure(&mut self, speed_percent: u8) {
        self.speed = speed_percent.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn interval_ms(&self) -> f64 {
        self.curve.interval_ms(self.speed)
    }

    /// Advance by `dt_ms`; runs at most one step and returns its event.
    pub fn tick(&mut self, dt_ms: f64) -> Option<StepEvent> {
        if self.state != SequencerState::Running {
            return None;
        }
        let stepper = self.stepper.as_mut()?;

        self.accumulated_ms += dt_ms.max(0.0);
        let interval = self.curve.interval_ms(self.speed);
        if self.accumulated_ms < interval {
            return None;
        }
        // Carry at most one interval so a long frame cannot queue a burst.
        self.accumulated_ms = (self.accumulated_ms - interval).min(interval);

        let event = stepper.step();
        self.steps += 1;
        if stepper.is_done() {
            debug!(steps = self.steps, "sequencer finished");
            self.state = SequencerState::Finished;
        }
        self.last_event = Some(event.clone());
        Some(event)
    }

    /// Run one step immediately, ignoring time and pause state.
    pub fn step_once(&mut self) -> Option<StepEvent> {
        let stepper = self.stepper.as_mut()?;
        if stepper.is_done() {
            return None;
        }
        let event = stepper.step();
        self.steps += 1;
        if stepper.is_done() {
            self.state = SequencerState::Finished;
        }
        self.last_event = Some(event.clone());
        Some(event)
    }

    pub fn pause(&mut self) {
        if self.state == SequencerState::Running {
            self.state = SequencerState::Paused;
        }
    }

    /// Start a ready run or continue a paused one.
    pub fn resume(&mut self) {
        if matches!(self.state, SequencerState::Ready | SequencerState::Paused) {
            self.state = SequencerState::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.state {
            SequencerState::Running => self.pause(),
            SequencerState::Ready | SequencerState::Paused => self.resume(),
            _ => {}
        }
    }

    /// Restart the loaded stepper from `seed`, keeping it loaded and ready.
    pub fn restart(&mut self, seed: u64) {
        if let Some(stepper) = self.stepper.as_mut() {
            stepper.restart(seed);
            self.clear_run();
            self.state = SequencerState::Ready;
        }
    }

    /// Drop the stepper and all run history; back to `Idle`.
    pub fn reset(&mut self) {
        debug!("sequencer reset");
        self.stepper = None;
        self.clear_run();
        self.state = SequencerState::Idle;
    }

    fn clear_run(&mut self) {
        self.accumulated_ms = 0.0;
        self.last_event = None;
        self.steps = 0;
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == SequencerState::Paused
    }

    pub fn stepper(&self) -> Option<&S> {
        self.stepper.as_ref()
    }

    /// Most recent step event, kept until the next step for redraws.
    pub fn last_event(&self) -> Option<&StepEvent> {
        self.last_event.as_ref()
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Outcome;
    use crate::sequence;
    use crate::stepper::bubble::BubbleSortStepper;
    use crate::stepper::quick::QuickSortStepper;

    fn running(values: &[u32]) -> StepSequencer<BubbleSortStepper> {
        let mut seq = StepSequencer::new(SpeedCurve::Exponential { base_ms: 20.0 });
        seq.load(BubbleSortStepper::from_values(values));
        seq.configure(50);
        seq.resume();
        seq
    }

    #[test]
    fn exponential_curve_is_monotonic() {
        let curve = SpeedCurve::default();
        let mut prev = f64::INFINITY;
        for speed in MIN_SPEED..=MAX_SPEED {
            let ms = curve.interval_ms(speed);
            assert!(ms <= prev, "interval must not grow with speed ({speed})");
            assert!(ms >= 1.0);
            prev = ms;
        }
        assert!((curve.interval_ms(50) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn frame_curve_is_monotonic() {
        let curve = SpeedCurve::Frames { frame_ms: 10.0 };
        let mut prev = f64::INFINITY;
        for speed in MIN_SPEED..=MAX_SPEED {
            let ms = curve.interval_ms(speed);
            assert!(ms <= prev);
            prev = ms;
        }
        assert_eq!(curve.interval_ms(100), 10.0);
        assert_eq!(curve.interval_ms(1), 1000.0);
    }

    #[test]
    fn steps_only_after_full_interval() {
        let mut seq = running(&[3, 2, 1]);
        assert_eq!(seq.tick(10.0), None);
        assert_eq!(seq.tick(9.0), None);
        assert_eq!(seq.tick(1.0), Some(StepEvent::Swap { i: 0, j: 1 }));
        assert_eq!(seq.steps(), 1);
        assert_eq!(seq.last_event(), Some(&StepEvent::Swap { i: 0, j: 1 }));
    }

    #[test]
    fn one_step_per_tick_even_for_long_frames() {
        let mut seq = running(&[5, 4, 3, 2, 1]);
        assert!(seq.tick(1_000.0).is_some());
        assert_eq!(seq.steps(), 1);
        // Carry is capped at one interval, so the next tick steps once more
        // and then the backlog is gone.
        assert!(seq.tick(0.0).is_some());
        assert!(seq.tick(0.0).is_none());
    }

    #[test]
    fn configure_clamps_speed() {
        let mut seq: StepSequencer<BubbleSortStepper> = StepSequencer::new(SpeedCurve::default());
        seq.configure(0);
        assert_eq!(seq.speed(), 1);
        seq.configure(250);
        assert_eq!(seq.speed(), 100);
    }

    #[test]
    fn paused_ticks_do_nothing() {
        let mut seq = running(&[2, 1]);
        seq.pause();
        for _ in 0..100 {
            assert_eq!(seq.tick(50.0), None);
        }
        assert_eq!(seq.steps(), 0);
        seq.resume();
        // No burst: the first tick after resuming still needs a full interval.
        assert_eq!(seq.tick(5.0), None);
        assert!(seq.tick(15.0).is_some());
    }

    #[test]
    fn pausing_does_not_change_result() {
        let bars = sequence::shuffled_bars(16, 8);

        let mut plain = StepSequencer::new(SpeedCurve::default());
        plain.load(QuickSortStepper::new(bars.clone()));
        plain.resume();
        let mut plain_events = Vec::new();
        while plain.state() != SequencerState::Finished {
            plain_events.extend(plain.tick(20.0));
        }

        let mut paused = StepSequencer::new(SpeedCurve::default());
        paused.load(QuickSortStepper::new(bars));
        paused.resume();
        let mut paused_events = Vec::new();
        let mut frame = 0;
        while paused.state() != SequencerState::Finished {
            if frame % 7 == 3 {
                paused.pause();
                for _ in 0..frame % 5 {
                    assert!(paused.tick(0.0).is_none());
                }
                paused.resume();
            }
            paused_events.extend(paused.tick(20.0));
            frame += 1;
        }

        assert_eq!(plain_events, paused_events);
        assert_eq!(
            plain.stepper().map(|s| s.bars().to_vec()),
            paused.stepper().map(|s| s.bars().to_vec())
        );
    }

    #[test]
    fn finishes_and_stops_stepping() {
        let mut seq = running(&[1, 2]);
        let mut events = Vec::new();
        for _ in 0..10 {
            events.extend(seq.tick(20.0));
        }
        assert_eq!(seq.state(), SequencerState::Finished);
        assert_eq!(events.last(), Some(&StepEvent::Done { outcome: Outcome::Sorted }));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn reset_returns_to_idle() {
        let mut seq = running(&[3, 1, 2]);
        seq.tick(20.0);
        seq.reset();
        assert_eq!(seq.state(), SequencerState::Idle);
        assert!(seq.stepper().is_none());
        assert!(seq.last_event().is_none());
        assert_eq!(seq.steps(), 0);
        assert_eq!(seq.tick(100.0), None);
        seq.resume();
        assert_eq!(seq.state(), SequencerState::Idle);
    }

    #[test]
    fn restart_keeps_stepper_ready() {
        let mut seq = running(&[3, 1, 2]);
        seq.tick(20.0);
        seq.restart(4);
        assert_eq!(seq.state(), SequencerState::Ready);
        assert_eq!(seq.steps(), 0);
        assert_eq!(seq.tick(20.0), None, "ready runs wait for resume");
        seq.resume();
        assert!(seq.tick(20.0).is_some());
    }

    #[test]
    fn step_once_ignores_pause() {
        let mut seq = running(&[2, 1]);
        seq.pause();
        assert_eq!(seq.step_once(), Some(StepEvent::Swap { i: 0, j: 1 }));
        assert!(seq.is_paused());
    }
}
