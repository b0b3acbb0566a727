//! Synth: a [`ToneSink`] that schedules tones on its own clock and
//! renders them offline.
//!
//! The host advances the clock as frames pass; each tone is placed at the
//! current clock plus its delay, so a phrase sent in one frame keeps its
//! rhythm. Rendering runs every scheduled tone through voice + mixer in
//! fixed blocks.

use tracing::debug;

use crate::tone::{Tone, ToneSink};

use super::mixer::Mixer;
use super::voice::Voice;

const BLOCK_SIZE: usize = 128;
const MAX_VOICES: usize = 64;

#[derive(Debug, Clone, PartialEq)]
struct ScheduledTone {
    start_sample: usize,
    release_sample: usize,
    tone: Tone,
}

#[derive(Debug, Clone)]
pub struct Synth {
    sample_rate: f64,
    clock_ms: f64,
    scheduled: Vec<ScheduledTone>,
}

impl Synth {
    pub fn new(sample_rate: f64) -> Self {
        Synth {
            sample_rate,
            clock_ms: 0.0,
            scheduled: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Move the schedule clock forward by one frame.
    pub fn advance(&mut self, dt_ms: f64) {
        self.clock_ms += dt_ms.max(0.0);
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    /// Number of tones scheduled so far.
    pub fn len(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
    }

    fn ms_to_samples(&self, ms: f64) -> usize {
        (ms.max(0.0) / 1000.0 * self.sample_rate) as usize
    }

    /// Sample count covering the clock and every tone's tail.
    pub fn total_samples(&self) -> usize {
        let clock = self.ms_to_samples(self.clock_ms);
        self.scheduled
            .iter()
            .map(|s| s.start_sample + self.ms_to_samples(s.tone.duration_ms) + 1)
            .fold(clock, usize::max)
    }

    /// Render everything scheduled to mono samples in `[-1, 1]`.
    pub fn render(&self) -> Vec<f64> {
        let total = self.total_samples();
        let mut scheduled: Vec<&ScheduledTone> = self.scheduled.iter().collect();
        scheduled.sort_by_key(|s| s.start_sample);
        debug!(tones = scheduled.len(), samples = total, "rendering tones");

        let mut mixer = Mixer::default();
        // (start sample, voice)
        let mut voices: Vec<(usize, Voice)> = Vec::new();
        let mut output = Vec::with_capacity(total);
        let mut next = 0;

        let mut block_start = 0;
        while block_start < total {
            let block_end = (block_start + BLOCK_SIZE).min(total);
            mixer.clear(block_end - block_start);

            while next < scheduled.len() && scheduled[next].start_sample < block_end {
                let s = scheduled[next];
                if voices.len() < MAX_VOICES {
                    let voice = Voice::for_tone(&s.tone, s.release_sample, self.sample_rate);
                    voices.push((s.start_sample, voice));
                }
                next += 1;
            }

            // Sample-accurate onset and gate-off inside the block.
            for (start, voice) in voices.iter_mut() {
                for offset in 0..block_end - block_start {
                    let at = block_start + offset;
                    if at < *start {
                        continue;
                    }
                    if at == voice.release_sample() {
                        voice.note_off();
                    }
                    mixer.add(offset, voice.next_sample());
                }
            }
            mixer.drain_into(&mut output);
            voices.retain(|(_, v)| !v.is_finished());
            block_start = block_end;
        }
        output
    }

    /// Interleaved 16-bit stereo, both channels identical.
    pub fn render_pcm_i16(&self) -> Vec<i16> {
        let mono = self.render();
        let mut stereo = Vec::with_capacity(mono.len() * 2);
        for s in mono {
            let sample = (s * 32767.0).round().clamp(-32768.0, 32767.0) as i16;
            stereo.push(sample);
            stereo.push(sample);
        }
        stereo
    }
}

impl ToneSink for Synth {
    fn play_tone(&mut self, tone: Tone) {
        let onset_ms = self.clock_ms + tone.delay_ms.max(0.0);
        let start_sample = self.ms_to_samples(onset_ms);
        let release_sample = start_sample + self.ms_to_samples(tone.release_at_ms());
        self.scheduled.push(ScheduledTone {
            start_sample,
            release_sample,
            tone,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::EnvelopeParams;

    fn peak(samples: &[f64]) -> f64 {
        samples.iter().fold(0.0, |m, &s| m.max(s.abs()))
    }

    #[test]
    fn empty_synth_renders_clock_length_silence() {
        let mut synth = Synth::new(1000.0);
        synth.advance(250.0);
        let out = synth.render();
        assert_eq!(out.len(), 250);
        assert!(out.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn tone_lands_at_clock_plus_delay() {
        let mut synth = Synth::new(8000.0);
        synth.advance(100.0);
        synth.play_tone(Tone::blip(440.0, 50.0, 0.5).delayed(50.0));
        let out = synth.render();
        let onset = 8000 * 150 / 1000;
        assert!(peak(&out[..onset]) == 0.0, "silent before onset");
        assert!(peak(&out[onset..]) > 0.01, "sound after onset");
    }

    #[test]
    fn tone_ends_after_duration() {
        let mut synth = Synth::new(8000.0);
        synth.play_tone(Tone::blip(440.0, 100.0, 0.5));
        synth.advance(500.0);
        let out = synth.render();
        assert_eq!(out.len(), 4000);
        let tail_start = 8000 * 110 / 1000;
        assert!(peak(&out[tail_start..]) < 1e-9, "silent after the tone");
    }

    #[test]
    fn release_only_envelope_is_audible() {
        let envelope = EnvelopeParams {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.2,
        };
        let mut synth = Synth::new(8000.0);
        synth.play_tone(Tone::enveloped(440.0, envelope, 0.5));
        let out = synth.render();
        assert!(peak(&out) > 0.2, "releases from sustain, got peak {}", peak(&out));
    }

    #[test]
    fn overlapping_tones_stay_bounded() {
        let mut synth = Synth::new(8000.0);
        for k in 0..20 {
            synth.play_tone(Tone::blip(200.0 + 50.0 * k as f64, 300.0, 0.9));
        }
        let out = synth.render();
        assert!(peak(&out) <= 1.0, "soft clip keeps the mix in range");
    }

    #[test]
    fn pcm_is_interleaved_stereo() {
        let mut synth = Synth::new(8000.0);
        synth.play_tone(Tone::blip(440.0, 20.0, 0.5));
        let mono = synth.render();
        let pcm = synth.render_pcm_i16();
        assert_eq!(pcm.len(), mono.len() * 2);
        assert!(pcm.chunks(2).all(|lr| lr[0] == lr[1]));
        assert!(pcm.iter().any(|&s| s != 0));
    }
}
