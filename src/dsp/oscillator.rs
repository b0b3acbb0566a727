//! Band-limited oscillators for tone playback (PolyBLEP on the hard edges).

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Oscillator shape requested by a tone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

impl Waveform {
    /// Parse a host waveform name; unknown names fall back to sine.
    pub fn from_name(name: &str) -> Waveform {
        match name {
            "square" => Waveform::Square,
            "sawtooth" | "saw" => Waveform::Sawtooth,
            "triangle" => Waveform::Triangle,
            _ => Waveform::Sine,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f64,
    /// Normalized phase in `[0, 1)`.
    phase: f64,
    sample_rate: f64,
}

impl Oscillator {
    pub fn new(waveform: Waveform, frequency: f64, sample_rate: f64) -> Self {
        Oscillator {
            waveform,
            frequency,
            phase: 0.0,
            sample_rate,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    fn phase_inc(&self) -> f64 {
        if self.sample_rate > 0.0 {
            self.frequency / self.sample_rate
        } else {
            0.0
        }
    }

    pub fn next_sample(&mut self) -> f64 {
        let inc = self.phase_inc();
        let t = self.phase;
        let sample = match self.waveform {
            Waveform::Sine => (2.0 * PI * t).sin(),
            Waveform::Sawtooth => 2.0 * t - 1.0 - poly_blep(t, inc),
            Waveform::Square => {
                let naive = if t < 0.5 { 1.0 } else { -1.0 };
                naive + poly_blep(t, inc) - poly_blep((t + 0.5) % 1.0, inc)
            }
            // Piecewise linear: -1 → +1 over the first half, back down after.
            Waveform::Triangle => {
                if t < 0.5 {
                    4.0 * t - 1.0
                } else {
                    3.0 - 4.0 * t
                }
            }
        };

        self.phase += inc;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }
        sample
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Polynomial band-limited step correction around a discontinuity.
///
/// `t` is the phase in `[0, 1)`, `dt` the per-sample increment.
fn poly_blep(t: f64, dt: f64) -> f64 {
    if dt <= 0.0 {
        0.0
    } else if t < dt {
        let t = t / dt;
        2.0 * t - t * t - 1.0
    } else if t > 1.0 - dt {
        let t = (t - 1.0) / dt;
        t * t + 2.0 * t + 1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak(waveform: Waveform, frequency: f64) -> f64 {
        let mut osc = Oscillator::new(waveform, frequency, 44100.0);
        (0..44100).map(|_| osc.next_sample().abs()).fold(0.0, f64::max)
    }

    #[test]
    fn sine_starts_at_zero() {
        let mut osc = Oscillator::new(Waveform::Sine, 440.0, 44100.0);
        let s = osc.next_sample();
        assert!(s.abs() < 1e-10, "sine should start near 0, got {s}");
    }

    #[test]
    fn waveforms_stay_in_range() {
        assert!(peak(Waveform::Sine, 440.0) <= 1.0);
        assert!(peak(Waveform::Triangle, 440.0) <= 1.0);
        assert!(peak(Waveform::Sawtooth, 1200.0) <= 1.5, "saw overshoot bounded");
        assert!(peak(Waveform::Square, 1200.0) <= 1.5, "square overshoot bounded");
    }

    #[test]
    fn frequency_sets_cycle_length() {
        // 441 Hz at 44.1 kHz: a full cycle every 100 samples.
        let mut osc = Oscillator::new(Waveform::Sine, 441.0, 44100.0);
        let first: Vec<f64> = (0..100).map(|_| osc.next_sample()).collect();
        let second: Vec<f64> = (0..100).map(|_| osc.next_sample()).collect();
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1e-6, "cycles should repeat");
        }
    }

    #[test]
    fn zero_sample_rate_is_silent_not_nan() {
        let mut osc = Oscillator::new(Waveform::Square, 440.0, 0.0);
        assert!(osc.next_sample().is_finite());
    }

    #[test]
    fn waveform_names() {
        assert_eq!(Waveform::from_name("saw"), Waveform::Sawtooth);
        assert_eq!(Waveform::from_name("triangle"), Waveform::Triangle);
        assert_eq!(Waveform::from_name("organ"), Waveform::Sine);
        let json = serde_json::to_string(&Waveform::Square).unwrap();
        assert_eq!(json, "\"square\"");
    }
}
