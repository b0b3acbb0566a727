use std::fmt;

#[derive(Debug)]
pub enum VizError {
    Config(ConfigError),
    Json(serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyGrid { cols: usize, rows: usize },
    WallDensity { value: f64 },
    EnvelopeParam { name: &'static str, value: f64 },
    Volume { value: f64 },
    Viewport { width: f64, height: f64 },
    SpeedCurve { reason: String },
}

impl fmt::Display for VizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VizError::Config(e) => write!(f, "Config error: {e}"),
            VizError::Json(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl std::error::Error for VizError {}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyGrid { cols, rows } => {
                write!(f, "Grid must have at least one cell, got {cols}x{rows}")
            }
            ConfigError::WallDensity { value } => {
                write!(f, "Wall density must be in [0, 1), got {value}")
            }
            ConfigError::EnvelopeParam { name, value } => {
                write!(f, "Envelope {name} must be in [0, 1], got {value}")
            }
            ConfigError::Volume { value } => write!(f, "Volume must be in [0, 1], got {value}"),
            ConfigError::Viewport { width, height } => {
                write!(f, "Viewport must be positive, got {width}x{height}")
            }
            ConfigError::SpeedCurve { reason } => write!(f, "Invalid speed curve: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for VizError {
    fn from(e: ConfigError) -> Self {
        VizError::Config(e)
    }
}

impl From<serde_json::Error> for VizError {
    fn from(e: serde_json::Error) -> Self {
        VizError::Json(e)
    }
}
