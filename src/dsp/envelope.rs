//! ADSR envelope generator driven by [`EnvelopeParams`].

use crate::tone::EnvelopeParams;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear attack, decay and release segments.
#[derive(Debug, Clone)]
pub struct Envelope {
    params: EnvelopeParams,
    stage: Stage,
    level: f64,
    sample_rate: f64,
    /// Length of the current stage in samples.
    stage_samples: usize,
    stage_counter: usize,
    /// Level when the current stage began.
    start_level: f64,
}

impl Envelope {
    pub fn new(params: EnvelopeParams, sample_rate: f64) -> Self {
        Envelope {
            params,
            stage: Stage::Idle,
            level: 0.0,
            sample_rate,
            stage_samples: 0,
            stage_counter: 0,
            start_level: 0.0,
        }
    }

    pub fn params(&self) -> EnvelopeParams {
        self.params
    }

    fn samples_for(&self, seconds: f64) -> usize {
        (seconds.max(0.0) * self.sample_rate) as usize
    }

    fn enter(&mut self, stage: Stage, seconds: f64) {
        self.stage = stage;
        self.stage_samples = self.samples_for(seconds);
        self.stage_counter = 0;
        self.start_level = self.level;
    }

    /// Note on; retriggers from the current level. Zero-length attack and
    /// decay stages are skipped so an immediate gate-off releases from the
    /// level they would have reached.
    pub fn gate_on(&mut self) {
        self.enter(Stage::Attack, self.params.attack);
        if self.stage_samples > 0 {
            return;
        }
        self.level = 1.0;
        self.enter(Stage::Decay, self.params.decay);
        if self.stage_samples == 0 {
            self.level = self.params.sustain;
            self.stage = Stage::Sustain;
        }
    }

    /// Note off.
    pub fn gate_off(&mut self) {
        if self.stage != Stage::Idle {
            self.enter(Stage::Release, self.params.release);
        }
    }

    /// Progress through the current stage in `[0, 1]`; advances the counter.
    fn progress(&mut self) -> Option<f64> {
        if self.stage_counter >= self.stage_samples {
            return None;
        }
        let t = self.stage_counter as f64 / self.stage_samples as f64;
        self.stage_counter += 1;
        Some(t)
    }

    /// Next gain value in `[0, 1]`.
    pub fn next_sample(&mut self) -> f64 {
        match self.stage {
            Stage::Idle => self.level = 0.0,
            Stage::Attack => match self.progress() {
                Some(t) => self.level = self.start_level + (1.0 - self.start_level) * t,
                None => {
                    self.level = 1.0;
                    self.enter(Stage::Decay, self.params.decay);
                }
            },
            Stage::Decay => match self.progress() {
                Some(t) => self.level = 1.0 - (1.0 - self.params.sustain) * t,
                None => {
                    self.level = self.params.sustain;
                    self.stage = Stage::Sustain;
                }
            },
            Stage::Sustain => self.level = self.params.sustain,
            Stage::Release => match self.progress() {
                Some(t) => self.level = self.start_level * (1.0 - t),
                None => {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            },
        }
        self.level
    }

    /// Idle: never triggered, or released all the way down.
    pub fn is_finished(&self) -> bool {
        self.stage == Stage::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(attack: f64, decay: f64, sustain: f64, release: f64) -> EnvelopeParams {
        EnvelopeParams {
            attack,
            decay,
            sustain,
            release,
        }
    }

    #[test]
    fn starts_idle() {
        let env = Envelope::new(EnvelopeParams::default(), 44100.0);
        assert!(env.is_finished());
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::new(params(0.01, 0.1, 0.5, 0.1), 44100.0);
        env.gate_on();
        let peak = (0..500).map(|_| env.next_sample()).fold(0.0, f64::max);
        assert!((peak - 1.0).abs() < 0.01, "attack should reach ~1.0, got {peak}");
    }

    #[test]
    fn zero_attack_jumps_to_peak() {
        let mut env = Envelope::new(EnvelopeParams::default(), 44100.0);
        env.gate_on();
        assert_eq!(env.next_sample(), 1.0);
    }

    #[test]
    fn zero_attack_and_decay_start_at_sustain() {
        let mut env = Envelope::new(params(0.0, 0.0, 0.8, 0.1), 44100.0);
        env.gate_on();
        assert_eq!(env.next_sample(), 0.8);

        // Released before the first sample: ramps down from sustain.
        let mut env = Envelope::new(params(0.0, 0.0, 0.8, 0.1), 44100.0);
        env.gate_on();
        env.gate_off();
        let first = env.next_sample();
        assert!((first - 0.8).abs() < 1e-9, "release should start at 0.8, got {first}");
    }

    #[test]
    fn sustain_holds() {
        let mut env = Envelope::new(params(0.001, 0.001, 0.6, 0.1), 44100.0);
        env.gate_on();
        for _ in 0..500 {
            env.next_sample();
        }
        let s = env.next_sample();
        assert!((s - 0.6).abs() < 1e-9, "should sustain at 0.6, got {s}");
    }

    #[test]
    fn release_to_silence() {
        let mut env = Envelope::new(params(0.001, 0.001, 0.7, 0.01), 44100.0);
        env.gate_on();
        for _ in 0..500 {
            env.next_sample();
        }
        env.gate_off();
        for _ in 0..1000 {
            env.next_sample();
        }
        assert!(env.is_finished(), "should be idle after release");
        assert_eq!(env.next_sample(), 0.0);
    }

    #[test]
    fn output_stays_in_unit_range() {
        let mut env = Envelope::new(params(0.01, 0.05, 0.5, 0.1), 44100.0);
        env.gate_on();
        for _ in 0..10_000 {
            let s = env.next_sample();
            assert!((0.0..=1.0).contains(&s), "envelope out of range: {s}");
        }
        env.gate_off();
        for _ in 0..10_000 {
            let s = env.next_sample();
            assert!((0.0..=1.0).contains(&s), "out of range after release: {s}");
        }
        assert!(env.is_finished());
    }
}
