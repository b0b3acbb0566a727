//! DSP: turns tone requests into audio samples.
//!
//! The same code serves the browser host (samples handed to an
//! AudioWorklet through WASM) and offline soundtrack export (WAV).

pub mod envelope;
pub mod mixer;
pub mod oscillator;
pub mod renderer;
pub mod synth;
pub mod voice;
