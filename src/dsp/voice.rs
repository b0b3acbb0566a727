//! Voice: one sounding tone: oscillator shaped by its envelope.

use crate::tone::Tone;

use super::envelope::Envelope;
use super::oscillator::Oscillator;

#[derive(Debug, Clone)]
pub struct Voice {
    oscillator: Oscillator,
    envelope: Envelope,
    volume: f64,
    /// Absolute sample at which the gate closes.
    release_sample: usize,
    finished: bool,
}

impl Voice {
    /// A voice for `tone`, gated on immediately; it releases at
    /// `release_sample` on the synth clock.
    pub fn for_tone(tone: &Tone, release_sample: usize, sample_rate: f64) -> Self {
        let mut envelope = Envelope::new(tone.envelope, sample_rate);
        envelope.gate_on();
        Voice {
            oscillator: Oscillator::new(tone.waveform, tone.frequency_hz, sample_rate),
            envelope,
            volume: tone.volume,
            release_sample,
            finished: false,
        }
    }

    pub fn release_sample(&self) -> usize {
        self.release_sample
    }

    pub fn note_off(&mut self) {
        self.envelope.gate_off();
    }

    pub fn next_sample(&mut self) -> f64 {
        if self.finished {
            return 0.0;
        }
        let osc = self.oscillator.next_sample();
        let env = self.envelope.next_sample();
        if self.envelope.is_finished() {
            self.finished = true;
        }
        osc * env * self.volume
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
