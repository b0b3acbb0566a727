//! ToneMapper: turns step events into short tone requests.
//!
//! Pitches come either from a linear map over bar height or from
//! `base · 2^(semitone/12)` over a fixed scale. Tones are fire-and-forget:
//! they are handed to a [`ToneSink`] and nothing waits on them.

use serde::{Deserialize, Serialize};

use crate::dsp::oscillator::Waveform;
use crate::event::StepEvent;
use crate::grid::CellPos;
use crate::sequence::{self, Bar};
use crate::stepper::Stepper;

// ── Scales ──────────────────────────────────────────────────

/// Semitone offsets above a base frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scale(&'static [u32]);

impl Scale {
    pub const PENTATONIC: Scale = Scale(&[0, 2, 4, 7, 9]);
    pub const EXTENDED_PENTATONIC: Scale = Scale(&[0, 2, 4, 7, 9, 12, 14]);
    pub const MAJOR: Scale = Scale(&[0, 2, 4, 5, 7, 9, 11]);

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Semitone offset for `degree`, wrapping around the scale.
    pub fn semitone(&self, degree: usize) -> u32 {
        if self.0.is_empty() {
            0
        } else {
            self.0[degree % self.0.len()]
        }
    }

    /// Frequency of `degree` above `base_hz`, wrapping without changing octave.
    pub fn frequency(&self, base_hz: f64, degree: usize) -> f64 {
        frequency(base_hz, self.semitone(degree) as f64)
    }
}

/// Equal-temperament pitch `semitones` above `base_hz`.
pub fn frequency(base_hz: f64, semitones: f64) -> f64 {
    base_hz * 2f64.powf(semitones / 12.0)
}

/// Linear map of `value` from `0..=max` onto `min_hz..=max_hz`.
pub fn linear_frequency(value: f64, max: f64, min_hz: f64, max_hz: f64) -> f64 {
    if max <= 0.0 {
        return min_hz;
    }
    min_hz + (max_hz - min_hz) * (value / max)
}

// ── Tone requests ───────────────────────────────────────────

/// ADSR shape. Times are seconds, sustain is a level; all within `0..=1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvelopeParams {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl Default for EnvelopeParams {
    fn default() -> Self {
        EnvelopeParams {
            attack: 0.0,
            decay: 0.05,
            sustain: 0.03,
            release: 0.05,
        }
    }
}

impl EnvelopeParams {
    /// Short fade in, full level, then a linear ramp to silence at `duration_ms`.
    pub fn ramp(duration_ms: f64) -> Self {
        let attack = 0.01_f64.min(duration_ms / 1000.0);
        EnvelopeParams {
            attack,
            decay: 0.0,
            sustain: 1.0,
            release: (duration_ms / 1000.0 - attack).max(0.0),
        }
    }

    /// Parameter values outside `0..=1`, by name.
    pub fn out_of_range(&self) -> Option<(&'static str, f64)> {
        [
            ("attack", self.attack),
            ("decay", self.decay),
            ("sustain", self.sustain),
            ("release", self.release),
        ]
        .into_iter()
        .find(|&(_, v)| !(0.0..=1.0).contains(&v))
    }
}

/// One requested tone. `delay_ms` offsets it from the moment it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tone {
    pub waveform: Waveform,
    pub frequency_hz: f64,
    pub envelope: EnvelopeParams,
    /// Peak gain.
    pub volume: f64,
    /// Total audible length, release included.
    pub duration_ms: f64,
    pub delay_ms: f64,
}

impl Tone {
    /// Sine blip with a click-free ramp, the shape of the cue sounds.
    pub fn blip(frequency_hz: f64, duration_ms: f64, volume: f64) -> Self {
        Tone {
            waveform: Waveform::Sine,
            frequency_hz,
            envelope: EnvelopeParams::ramp(duration_ms),
            volume,
            duration_ms,
            delay_ms: 0.0,
        }
    }

    /// Enveloped tone whose length is attack + decay + release.
    pub fn enveloped(frequency_hz: f64, envelope: EnvelopeParams, volume: f64) -> Self {
        Tone {
            waveform: Waveform::Sine,
            frequency_hz,
            envelope,
            volume,
            duration_ms: (envelope.attack + envelope.decay + envelope.release) * 1000.0,
            delay_ms: 0.0,
        }
    }

    pub fn delayed(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Milliseconds after onset at which the release stage begins.
    pub fn release_at_ms(&self) -> f64 {
        (self.duration_ms - self.envelope.release * 1000.0).max(0.0)
    }
}

/// Receives tone requests. Must not block.
pub trait ToneSink {
    fn play_tone(&mut self, tone: Tone);
}

impl ToneSink for Vec<Tone> {
    fn play_tone(&mut self, tone: Tone) {
        self.push(tone);
    }
}

// ── Cue phrases ─────────────────────────────────────────────

const SORT_MIN_HZ: f64 = 200.0;
const SORT_MAX_HZ: f64 = 1200.0;
const SORT_VOLUME: f64 = 0.05;

/// A3; maze visits climb from here.
const MAZE_BASE_HZ: f64 = 220.0;
const BACKTRACK_HZ: f64 = MAZE_BASE_HZ * 0.75;
/// C3; final-path reveal notes.
const REVEAL_BASE_HZ: f64 = 130.81;

/// `(frequency, duration_ms, volume, delay_ms)` rows.
type Phrase = &'static [(f64, f64, f64, f64)];

const CARVED_PHRASE: Phrase = &[
    (220.0, 200.0, 0.2, 0.0),
    (277.18, 200.0, 0.2, 200.0),
    (329.63, 200.0, 0.2, 400.0),
    (415.30, 300.0, 0.2, 600.0),
    (440.0, 500.0, 0.3, 900.0),
];

const VICTORY_PHRASE: Phrase = &[
    (392.00, 200.0, 0.2, 0.0),
    (440.00, 200.0, 0.2, 200.0),
    (493.88, 200.0, 0.2, 400.0),
    (523.25, 400.0, 0.3, 600.0),
    (783.99, 600.0, 0.3, 1000.0),
];

/// Ascending run then a C major chord, played once the final path is shown.
const FANFARE_PHRASE: Phrase = &[
    (246.94, 80.0, 0.05, 0.0),
    (261.63, 80.0, 0.05, 70.0),
    (293.66, 80.0, 0.05, 140.0),
    (329.63, 80.0, 0.05, 210.0),
    (349.23, 80.0, 0.05, 280.0),
    (392.00, 80.0, 0.05, 350.0),
    (440.00, 80.0, 0.05, 420.0),
    (493.88, 80.0, 0.05, 490.0),
    (261.63, 500.0, 0.05, 560.0),
    (329.63, 500.0, 0.05, 560.0),
    (392.00, 500.0, 0.05, 560.0),
    (523.25, 500.0, 0.05, 560.0),
];

fn play_phrase(phrase: Phrase, sink: &mut dyn ToneSink) {
    for &(hz, duration_ms, volume, delay_ms) in phrase {
        sink.play_tone(Tone::blip(hz, duration_ms, volume).delayed(delay_ms));
    }
}

// ── Mapper ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ToneMapper {
    envelope: EnvelopeParams,
    /// Scales every tone's volume; 1.0 leaves the phrase levels untouched.
    master: f64,
    /// Base pitch of the A* expansion notes.
    search_base_hz: f64,
    enabled: bool,
}

impl Default for ToneMapper {
    fn default() -> Self {
        ToneMapper {
            envelope: EnvelopeParams::default(),
            master: 1.0,
            search_base_hz: 261.63,
            enabled: true,
        }
    }
}

impl ToneMapper {
    pub fn new(envelope: EnvelopeParams, master: f64) -> Self {
        ToneMapper {
            envelope,
            master,
            ..ToneMapper::default()
        }
    }

    pub fn envelope(&self) -> EnvelopeParams {
        self.envelope
    }

    /// Applies to tones produced after this call.
    pub fn set_envelope(&mut self, envelope: EnvelopeParams) {
        self.envelope = envelope;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn set_search_base(&mut self, base_hz: f64) {
        self.search_base_hz = base_hz;
    }

    fn emit(&self, mut tone: Tone, sink: &mut dyn ToneSink) {
        if self.enabled {
            tone.volume *= self.master;
            sink.play_tone(tone);
        }
    }

    /// Bar height mapped linearly onto 200–1200 Hz with the slider envelope.
    pub fn bar_tone(&self, value: u32, max_value: u32) -> Tone {
        let hz = linear_frequency(value as f64, max_value as f64, SORT_MIN_HZ, SORT_MAX_HZ);
        Tone::enveloped(hz, self.envelope, SORT_VOLUME)
    }

    pub fn play_bar(&self, bars: &[Bar], index: usize, sink: &mut dyn ToneSink) {
        if let Some(bar) = bars.get(index) {
            self.emit(self.bar_tone(bar.value, sequence::max_value(bars)), sink);
        }
    }

    /// Column picks one of three octaves, row picks the note.
    pub fn maze_visit_tone(&self, cell: CellPos, cols: usize, rows: usize) -> Tone {
        let scale = Scale::EXTENDED_PENTATONIC;
        let octave = if cols == 0 { 0 } else { cell.i * 3 / cols };
        let degree = if rows == 0 { 0 } else { (cell.j * scale.len() / rows).min(scale.len() - 1) };
        let semitones = scale.semitone(degree) as f64 + 12.0 * octave as f64;
        Tone::blip(frequency(MAZE_BASE_HZ, semitones), 100.0, 0.15)
    }

    pub fn backtrack_tone(&self) -> Tone {
        Tone::blip(BACKTRACK_HZ, 50.0, 0.1)
    }

    /// Pentatonic note chosen by the length of the best path so far.
    pub fn expand_tone(&self, path_len: usize) -> Tone {
        Tone::blip(Scale::PENTATONIC.frequency(self.search_base_hz, path_len), 60.0, 0.1)
    }

    /// C-major note for every third node of the final path.
    pub fn reveal_tone(&self, index: usize) -> Option<Tone> {
        (index % 3 == 0).then(|| Tone::blip(Scale::MAJOR.frequency(REVEAL_BASE_HZ, index), 80.0, 0.05))
    }

    pub fn play_reveal(&self, index: usize, sink: &mut dyn ToneSink) {
        if let Some(tone) = self.reveal_tone(index) {
            self.emit(tone, sink);
        }
    }

    pub fn play_carved(&self, sink: &mut dyn ToneSink) {
        if self.enabled {
            play_phrase(CARVED_PHRASE, &mut Scaled { sink, gain: self.master });
        }
    }

    pub fn play_victory(&self, sink: &mut dyn ToneSink) {
        if self.enabled {
            play_phrase(VICTORY_PHRASE, &mut Scaled { sink, gain: self.master });
        }
    }

    pub fn play_fanfare(&self, sink: &mut dyn ToneSink) {
        if self.enabled {
            play_phrase(FANFARE_PHRASE, &mut Scaled { sink, gain: self.master });
        }
    }

    /// Sound the event just produced by `stepper`.
    pub fn on_event(&self, event: &StepEvent, stepper: &Stepper, sink: &mut dyn ToneSink) {
        match (stepper, event) {
            // The bar that moved right is the one that was too tall.
            (Stepper::BubbleSort(s), StepEvent::Swap { j, .. }) => self.play_bar(s.bars(), *j, sink),
            (Stepper::QuickSort(s), StepEvent::Compare { i, .. } | StepEvent::Swap { i, .. }) => {
                self.play_bar(s.bars(), *i, sink)
            }
            (Stepper::QuickSort(s), StepEvent::Pivot { index }) => self.play_bar(s.bars(), *index, sink),
            (Stepper::MazeGen(s), StepEvent::Visit { cell }) => {
                let maze = s.maze();
                self.emit(self.maze_visit_tone(*cell, maze.cols(), maze.rows()), sink);
            }
            (Stepper::MazeGen(_), StepEvent::Backtrack { .. }) => self.emit(self.backtrack_tone(), sink),
            (Stepper::MazeGen(_), StepEvent::Done { .. }) => self.play_carved(sink),
            (Stepper::AStar(s), StepEvent::Expand { .. }) => {
                self.emit(self.expand_tone(s.current_path().len()), sink)
            }
            (Stepper::AStar(_), StepEvent::FoundGoal { .. }) => self.play_victory(sink),
            _ => {}
        }
    }
}

/// Applies the master gain to phrase tones on their way to the real sink.
struct Scaled<'a> {
    sink: &'a mut dyn ToneSink,
    gain: f64,
}

impl ToneSink for Scaled<'_> {
    fn play_tone(&mut self, mut tone: Tone) {
        tone.volume *= self.gain;
        self.sink.play_tone(tone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::AlgorithmStepper;
    use crate::stepper::bubble::BubbleSortStepper;
    use crate::stepper::maze::MazeGenStepper;
    use crate::stepper::quick::QuickSortStepper;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 0.01
    }

    #[test]
    fn equal_temperament() {
        assert!(close(frequency(220.0, 12.0), 440.0));
        assert!(close(frequency(261.63, 7.0), 391.99));
        assert!(close(Scale::PENTATONIC.frequency(261.63, 5), 261.63), "degree wraps");
    }

    #[test]
    fn linear_height_map() {
        assert_eq!(linear_frequency(0.0, 10.0, 200.0, 1200.0), 200.0);
        assert_eq!(linear_frequency(10.0, 10.0, 200.0, 1200.0), 1200.0);
        assert_eq!(linear_frequency(5.0, 10.0, 200.0, 1200.0), 700.0);
        assert_eq!(linear_frequency(5.0, 0.0, 200.0, 1200.0), 200.0);
    }

    #[test]
    fn maze_visit_pitch_follows_position() {
        let mapper = ToneMapper::default();
        let origin = mapper.maze_visit_tone(CellPos::new(0, 0), 9, 7);
        assert!(close(origin.frequency_hz, 220.0));
        // Column 3 of 9 is the second octave; row 3 of 7 is degree 3 (7 semitones).
        let t = mapper.maze_visit_tone(CellPos::new(3, 3), 9, 7);
        assert!(close(t.frequency_hz, frequency(220.0, 19.0)));
        assert_eq!(t.duration_ms, 100.0);
    }

    #[test]
    fn reveal_every_third_node() {
        let mapper = ToneMapper::default();
        assert!(mapper.reveal_tone(0).is_some());
        assert!(mapper.reveal_tone(1).is_none());
        assert!(mapper.reveal_tone(2).is_none());
        let t = mapper.reveal_tone(3).unwrap();
        assert!(close(t.frequency_hz, frequency(130.81, 5.0)));
        assert_eq!(t.duration_ms, 80.0);
    }

    #[test]
    fn envelope_ramp_fits_duration() {
        let tone = Tone::blip(440.0, 60.0, 0.1);
        assert!((tone.release_at_ms() - 10.0).abs() < 1e-9);
        let sort = Tone::enveloped(440.0, EnvelopeParams::default(), 0.05);
        assert!((sort.duration_ms - 100.0).abs() < 1e-9);
        assert!((sort.release_at_ms() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn envelope_range_check() {
        assert_eq!(EnvelopeParams::default().out_of_range(), None);
        let bad = EnvelopeParams {
            sustain: 1.5,
            ..EnvelopeParams::default()
        };
        assert_eq!(bad.out_of_range(), Some(("sustain", 1.5)));
    }

    #[test]
    fn bubble_sounds_only_on_swap() {
        let mapper = ToneMapper::default();
        let mut stepper = Stepper::BubbleSort(BubbleSortStepper::from_values(&[1, 3, 2]));
        let mut tones = Vec::new();
        let first = stepper.step();
        assert!(matches!(first, StepEvent::Compare { .. }));
        mapper.on_event(&first, &stepper, &mut tones);
        assert!(tones.is_empty());
        let second = stepper.step();
        assert_eq!(second, StepEvent::Swap { i: 1, j: 2 });
        mapper.on_event(&second, &stepper, &mut tones);
        assert_eq!(tones.len(), 1);
        assert!(close(tones[0].frequency_hz, 1200.0), "tallest bar maps to the top");
    }

    #[test]
    fn quick_sounds_every_operation() {
        let mapper = ToneMapper::default();
        let mut stepper = Stepper::QuickSort(QuickSortStepper::from_values(&[3, 1, 2]));
        let mut tones = Vec::new();
        while !stepper.is_done() {
            let event = stepper.step();
            mapper.on_event(&event, &stepper, &mut tones);
        }
        let Stepper::QuickSort(sorted) = &stepper else {
            panic!("stepper changed kind");
        };
        assert!(
            tones.len() >= sorted.comparisons(),
            "at least one tone per comparison"
        );
    }

    #[test]
    fn maze_completion_plays_phrase() {
        let mapper = ToneMapper::default();
        let mut stepper = Stepper::MazeGen(MazeGenStepper::new(1, 1, 0));
        let event = stepper.step();
        let mut tones = Vec::new();
        mapper.on_event(&event, &stepper, &mut tones);
        assert_eq!(tones.len(), CARVED_PHRASE.len());
        assert_eq!(tones[4].delay_ms, 900.0);
    }

    #[test]
    fn disabled_mapper_is_silent() {
        let mut mapper = ToneMapper::default();
        mapper.set_enabled(false);
        let mut tones = Vec::new();
        mapper.play_victory(&mut tones);
        mapper.play_reveal(0, &mut tones);
        assert!(tones.is_empty());
    }

    #[test]
    fn master_gain_scales_phrases() {
        let mapper = ToneMapper::new(EnvelopeParams::default(), 0.5);
        let mut tones = Vec::new();
        mapper.play_victory(&mut tones);
        assert!((tones[0].volume - 0.1).abs() < 1e-12);
    }
}
