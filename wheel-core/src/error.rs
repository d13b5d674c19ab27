//! Error taxonomy for the calculation layer.
//!
//! Domain escapes during tension conversion are *not* errors; they are
//! reported through [`crate::calibration::ConversionStatus`].

use thiserror::Error;

/// Failures raised by the wheel calculations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WheelError {
    /// Malformed or physically impossible geometry / lacing input.
    #[error("invalid geometry: `{field}` {reason}")]
    InvalidGeometry { field: &'static str, reason: String },

    /// A calibration curve needs at least two points to be usable.
    #[error("calibration curve needs at least 2 points, got {points}")]
    EmptyCurve { points: usize },

    /// Calibration readings must be strictly increasing.
    #[error("calibration reading {reading} at point {index} is not above the previous reading")]
    UnorderedCurve { index: usize, reading: f64 },

    /// A build is missing inputs required for the spoke length calculation.
    #[error("missing components: {}", .0.join(", "))]
    MissingComponents(Vec<&'static str>),
}

impl WheelError {
    /// Stable, machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidGeometry { .. } => "invalid_geometry",
            Self::EmptyCurve { .. } => "empty_curve",
            Self::UnorderedCurve { .. } => "unordered_curve",
            Self::MissingComponents(_) => "missing_components",
        }
    }

    pub(crate) fn geometry(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            field,
            reason: reason.into(),
        }
    }
}
