// wheel-core/src/lib.rs

//! The core logic for the wheel builder.
//! This crate is responsible for spoke length geometry, tension-meter
//! conversion and tension batch analysis. It is completely headless,
//! performs no I/O and keeps no state between calls.

pub mod analysis;
pub mod calibration;
pub mod config;
pub mod error;
pub mod geometry;
pub mod readiness;
pub mod reference;
pub mod spoke_type;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

pub use analysis::{
    BatchAnalysis, ClassifiedReading, DeviationStatus, QualityVerdict, RangeStatus, SideAnalysis,
    SideStatistics, TensionBatchAnalyzer, analyze,
};
pub use calibration::{
    CalibrationCurve, CalibrationPoint, Conversion, ConversionStatus, ConvertedReading, ForceRange,
    RawReading, convert, convert_all,
};
pub use config::QualityThresholds;
pub use error::WheelError;
pub use geometry::{
    HubGeometry, LacingSpec, RimGeometry, SpokeLengths, compute_length, compute_lengths,
};
pub use readiness::WheelBuild;
pub use spoke_type::{SpokeMaterial, SpokeMetadata, SpokeShape, SpokeType};

/// Side of the wheel a spoke or reading belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

/// Rounds to one decimal place, the precision of every reported length and
/// force.
pub(crate) fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
