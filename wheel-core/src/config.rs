//! Tunable thresholds for tension batch analysis.

use serde::{Deserialize, Serialize};

/// Half-width of the acceptable band around a side's mean tension, as a
/// fraction of the mean (±20%).
pub const DEFAULT_BAND_FRACTION: f64 = 0.20;

/// Largest coefficient of variation (std dev / mean) a side may show and still
/// be considered fixable by truing.
pub const DEFAULT_MAX_COEFFICIENT_OF_VARIATION: f64 = 0.10;

/// Thresholds used to classify readings and derive the build verdict.
///
/// Every field is optional when deserializing; missing fields take the
/// defaults above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityThresholds {
    pub band_fraction: f64,
    pub max_coefficient_of_variation: f64,
    /// Optional coefficient of variation cap for `well_balanced` (e.g. 0.05).
    /// When unset, a session without violations is well balanced regardless
    /// of its dispersion.
    pub well_balanced_max_cv: Option<f64>,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            band_fraction: DEFAULT_BAND_FRACTION,
            max_coefficient_of_variation: DEFAULT_MAX_COEFFICIENT_OF_VARIATION,
            well_balanced_max_cv: None,
        }
    }
}
