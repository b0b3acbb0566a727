pub mod config;
pub mod dsp;
pub mod error;
pub mod event;
pub mod grid;
pub mod render;
pub mod rng;
pub mod sequence;
pub mod sequencer;
pub mod sketch;
pub mod stepper;
pub mod tone;

use crate::config::SketchConfig;
use crate::dsp::synth::Synth;
use crate::error::VizError;
use crate::sketch::{FrameInput, Sketch};
use crate::tone::{EnvelopeParams, Tone, ToneSink};
use wasm_bindgen::prelude::*;

/// The crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frame time used when a sketch runs offline.
pub const SOUNDTRACK_FRAME_MS: f64 = 1000.0 / 60.0;

/// WASM-exposed: return the algoviz-core version string.
#[wasm_bindgen]
pub fn core_version() -> String {
    VERSION.to_string()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{e}"))
}

/// Run the configured sketch to completion and encode its tones as WAV.
pub fn render_soundtrack(config: SketchConfig, sample_rate: u32) -> Result<Vec<u8>, VizError> {
    let synth = sketch::run_soundtrack(config, sample_rate as f64, SOUNDTRACK_FRAME_MS)?;
    Ok(dsp::renderer::render_wav(&synth))
}

/// WASM-exposed: render a whole sketch run from JSON config to a WAV byte array.
#[wasm_bindgen]
pub fn render_soundtrack_wav(config_json: &str, sample_rate: u32) -> Result<Vec<u8>, JsValue> {
    let config = SketchConfig::from_json(config_json).map_err(js_error)?;
    render_soundtrack(config, sample_rate).map_err(js_error)
}

/// WASM-exposed: render one frame's tones to mono f32 samples.
/// Returns the raw audio buffer for AudioWorklet playback.
#[wasm_bindgen]
pub fn render_tones(tones: JsValue, sample_rate: u32) -> Result<Vec<f32>, JsValue> {
    let tones: Vec<Tone> = serde_wasm_bindgen::from_value(tones).map_err(js_error)?;
    let mut synth = Synth::new(sample_rate as f64);
    for tone in tones {
        synth.play_tone(tone);
    }
    Ok(synth.render().iter().map(|&s| s as f32).collect())
}

/// WASM-exposed handle owning one sketch. The host drives it once per
/// display refresh with [`SketchHandle::frame`].
#[wasm_bindgen]
pub struct SketchHandle {
    sketch: Sketch,
}

#[wasm_bindgen]
impl SketchHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> Result<SketchHandle, JsValue> {
        let sketch = Sketch::from_json(config_json).map_err(js_error)?;
        Ok(SketchHandle { sketch })
    }

    /// Advance by `dt_ms` and return `{ commands, tones, state, complete }`.
    /// `input` may be `undefined` when no control changed.
    pub fn frame(&mut self, dt_ms: f64, input: JsValue) -> Result<JsValue, JsValue> {
        let input: FrameInput = if input.is_undefined() || input.is_null() {
            FrameInput::default()
        } else {
            serde_wasm_bindgen::from_value(input).map_err(js_error)?
        };
        let frame = self.sketch.frame(dt_ms, &input);
        serde_wasm_bindgen::to_value(&frame).map_err(js_error)
    }

    pub fn start(&mut self) {
        self.sketch.start();
    }

    pub fn pause(&mut self) {
        self.sketch.pause();
    }

    pub fn resume(&mut self) {
        self.sketch.resume();
    }

    #[wasm_bindgen(js_name = togglePause)]
    pub fn toggle_pause(&mut self) {
        self.sketch.toggle_pause();
    }

    pub fn reset(&mut self, seed: u64) {
        self.sketch.reset(seed);
    }

    #[wasm_bindgen(js_name = toggleDebug)]
    pub fn toggle_debug(&mut self) {
        self.sketch.toggle_debug();
    }

    pub fn solve(&mut self) {
        self.sketch.solve();
    }

    pub fn resolve(&mut self) {
        self.sketch.resolve();
    }

    #[wasm_bindgen(js_name = setDiagonal)]
    pub fn set_diagonal(&mut self, diagonal: bool) {
        self.sketch.set_diagonal(diagonal);
    }

    #[wasm_bindgen(js_name = setSpeed)]
    pub fn set_speed(&mut self, speed: u8) {
        self.sketch.set_speed(speed);
    }

    #[wasm_bindgen(js_name = setEnvelope)]
    pub fn set_envelope(&mut self, attack: f64, decay: f64, sustain: f64, release: f64) -> Result<(), JsValue> {
        let envelope = EnvelopeParams {
            attack,
            decay,
            sustain,
            release,
        };
        if let Some((name, value)) = envelope.out_of_range() {
            return Err(js_error(error::ConfigError::EnvelopeParam { name, value }));
        }
        self.sketch.set_envelope(envelope);
        Ok(())
    }

    #[wasm_bindgen(js_name = isComplete)]
    pub fn is_complete(&self) -> bool {
        self.sketch.is_complete()
    }
}
