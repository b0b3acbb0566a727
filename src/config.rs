//! Sketch configuration: what to run and how, parsed from JSON.
//!
//! Every field has a default, so `{}` is a valid configuration and hosts
//! only send what they change.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, VizError};
use crate::sequencer::SpeedCurve;
use crate::tone::EnvelopeParams;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SketchKind {
    #[default]
    BubbleSort,
    QuickSort,
    /// Quicksort and bubble sort side by side on the same input.
    Comparison,
    /// Carve a maze, then solve it.
    Maze,
    /// A* across a board of random obstacles.
    Pathfinding,
}

/// Drawing area in host units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Final path animation: revealed in chunks, then blinked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Maximum number of chunks the path is split into.
    pub chunks: usize,
    pub chunk_ms: f64,
    pub blink_count: usize,
    /// Length of each hidden or shown phase of a blink.
    pub blink_ms: f64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            chunks: 20,
            chunk_ms: 50.0,
            blink_count: 5,
            blink_ms: 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub kind: SketchKind,
    pub seed: u64,
    /// Speed percentage, `1..=100`.
    pub speed: u8,
    pub speed_curve: SpeedCurve,
    pub bar_count: usize,
    pub cols: usize,
    pub rows: usize,
    pub wall_density: f64,
    pub allow_diagonals: bool,
    /// Start solving as soon as the maze is carved.
    pub auto_solve: bool,
    pub envelope: EnvelopeParams,
    /// Master volume applied to every tone.
    pub volume: f64,
    pub audio_enabled: bool,
    pub debug: bool,
    pub viewport: Viewport,
    pub reveal: RevealConfig,
    /// Frame cap for headless runs.
    pub max_frames: usize,
}

impl Default for SketchConfig {
    fn default() -> Self {
        SketchConfig {
            kind: SketchKind::default(),
            seed: 0,
            speed: 50,
            speed_curve: SpeedCurve::default(),
            bar_count: 40,
            cols: 30,
            rows: 20,
            wall_density: 0.3,
            allow_diagonals: true,
            auto_solve: true,
            envelope: EnvelopeParams::default(),
            volume: 1.0,
            audio_enabled: true,
            debug: false,
            viewport: Viewport::default(),
            reveal: RevealConfig::default(),
            max_frames: 100_000,
        }
    }
}

impl SketchConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, VizError> {
        let config: SketchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, VizError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Viewport { width, height } = self.viewport;
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Viewport { width, height });
        }
        if matches!(self.kind, SketchKind::Maze | SketchKind::Pathfinding)
            && (self.cols == 0 || self.rows == 0)
        {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        if !(0.0..1.0).contains(&self.wall_density) {
            return Err(ConfigError::WallDensity {
                value: self.wall_density,
            });
        }
        if let Some((name, value)) = self.envelope.out_of_range() {
            return Err(ConfigError::EnvelopeParam { name, value });
        }
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::Volume { value: self.volume });
        }
        let step_ms = match self.speed_curve {
            SpeedCurve::Exponential { base_ms } => base_ms,
            SpeedCurve::Frames { frame_ms } => frame_ms,
        };
        if !(step_ms > 0.0 && step_ms.is_finite()) {
            return Err(ConfigError::SpeedCurve {
                reason: format!("step time must be positive, got {step_ms}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_defaults() {
        let config = SketchConfig::from_json("{}").unwrap();
        assert_eq!(config, SketchConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let json = r#"{
            "kind": "pathfinding",
            "seed": 7,
            "wall_density": 0.5,
            "allow_diagonals": false,
            "envelope": { "attack": 0.2 },
            "speed_curve": { "type": "frames", "frame_ms": 16.0 }
        }"#;
        let config = SketchConfig::from_json(json).unwrap();
        assert_eq!(config.kind, SketchKind::Pathfinding);
        assert_eq!(config.seed, 7);
        assert!(!config.allow_diagonals);
        assert_eq!(config.envelope.attack, 0.2);
        assert_eq!(config.envelope.decay, 0.05, "unset envelope fields keep defaults");
        assert_eq!(config.speed_curve, SpeedCurve::Frames { frame_ms: 16.0 });
    }

    #[test]
    fn rejects_bad_density() {
        let err = SketchConfig::from_json(r#"{"wall_density": 1.0}"#).unwrap_err();
        assert!(matches!(err, VizError::Config(ConfigError::WallDensity { .. })));
    }

    #[test]
    fn rejects_empty_grid_for_grid_sketches() {
        let err = SketchConfig::from_json(r#"{"kind": "maze", "cols": 0}"#).unwrap_err();
        assert_eq!(err.to_string(), "Config error: Grid must have at least one cell, got 0x20");
        // Sorting sketches ignore the grid size.
        assert!(SketchConfig::from_json(r#"{"kind": "quick_sort", "cols": 0}"#).is_ok());
    }

    #[test]
    fn rejects_bad_envelope_and_volume() {
        let err = SketchConfig::from_json(r#"{"envelope": {"release": -0.1}}"#).unwrap_err();
        assert!(matches!(
            err,
            VizError::Config(ConfigError::EnvelopeParam { name: "release", .. })
        ));
        let err = SketchConfig::from_json(r#"{"volume": 2.0}"#).unwrap_err();
        assert!(matches!(err, VizError::Config(ConfigError::Volume { .. })));
    }

    #[test]
    fn rejects_bad_viewport_and_curve() {
        let err = SketchConfig::from_json(r#"{"viewport": {"width": 0, "height": 10}}"#).unwrap_err();
        assert!(matches!(err, VizError::Config(ConfigError::Viewport { .. })));
        let err = SketchConfig::from_json(r#"{"speed_curve": {"type": "exponential", "base_ms": 0}}"#)
            .unwrap_err();
        assert!(matches!(err, VizError::Config(ConfigError::SpeedCurve { .. })));
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = SketchConfig::from_json("{").unwrap_err();
        assert!(matches!(err, VizError::Json(_)));
    }

    #[test]
    fn round_trips_through_json() {
        let config = SketchConfig {
            kind: SketchKind::Comparison,
            seed: 99,
            ..SketchConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(SketchConfig::from_json(&json).unwrap(), config);
    }
}
