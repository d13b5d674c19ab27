//! # Tension Batch Analysis Module
//!
//! Summarises one tensioning session: per-side statistics over the readings
//! that produced a force, a classification of every reading against the
//! spoke type's recommended range and against the side's ±band around its
//! mean, and an overall verdict for the build.
//!
//! ## Verdict
//! Checked in order, first match wins:
//! 1. `WellBalanced` - no range and no band violations on either side
//! 2. `NeedsTruing` - only band violations, and no side's coefficient of
//!    variation exceeds the configured limit
//! 3. `UnevenTension` - everything else
//!
//! Readings that escaped the calibrated range count as range violations.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use strum_macros::{Display, EnumString};

use crate::calibration::{ConversionStatus, ConvertedReading, ForceRange};
use crate::config::QualityThresholds;
use crate::Side;

/// Descriptive statistics over the valid forces of one side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SideStatistics {
    /// Number of readings with a force estimate.
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n − 1); 0 for a single reading.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub lower_band: f64,
    pub upper_band: f64,
}

impl SideStatistics {
    fn from_forces(forces: &[f64], band_fraction: f64) -> Option<Self> {
        if forces.is_empty() {
            return None;
        }
        let mean = forces.mean();
        let std_dev = if forces.len() > 1 { forces.std_dev() } else { 0.0 };
        Some(Self {
            count: forces.len(),
            mean,
            std_dev,
            min: Statistics::min(forces),
            max: Statistics::max(forces),
            lower_band: mean * (1.0 - band_fraction),
            upper_band: mean * (1.0 + band_fraction),
        })
    }

    /// Standard deviation relative to the mean; 0 when the mean is 0.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
}

/// Force compared to the spoke type's recommended range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RangeStatus {
    InRange,
    Over,
    Under,
    BelowDomain,
    AboveDomain,
}

/// Force compared to the side's band around its mean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeviationStatus {
    InRange,
    Over,
    Under,
    /// No force estimate for this reading.
    Unknown,
}

impl DeviationStatus {
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::Over | Self::Under)
    }
}

/// Overall quality of a tensioning session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QualityVerdict {
    WellBalanced,
    NeedsTruing,
    UnevenTension,
}

/// A converted reading with both classifications.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedReading {
    #[serde(flatten)]
    pub reading: ConvertedReading,
    pub range_status: RangeStatus,
    pub deviation_status: DeviationStatus,
}

/// Analysis of one side of the wheel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideAnalysis {
    pub side: Side,
    /// `None` when no reading on this side produced a force.
    pub statistics: Option<SideStatistics>,
    /// Readings of this side, in input order.
    pub readings: Vec<ClassifiedReading>,
}

impl SideAnalysis {
    /// Readings whose range status is anything but `InRange`.
    pub fn range_violations(&self) -> usize {
        self.readings
            .iter()
            .filter(|r| r.range_status != RangeStatus::InRange)
            .count()
    }

    /// Readings that fall outside the band around the mean.
    pub fn deviation_violations(&self) -> usize {
        self.readings
            .iter()
            .filter(|r| r.deviation_status.is_violation())
            .count()
    }

    pub fn coefficient_of_variation(&self) -> f64 {
        self.statistics
            .as_ref()
            .map_or(0.0, SideStatistics::coefficient_of_variation)
    }
}

/// Result of analysing a tensioning session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysis {
    pub left: SideAnalysis,
    pub right: SideAnalysis,
    pub verdict: QualityVerdict,
}

impl BatchAnalysis {
    pub fn side(&self, side: Side) -> &SideAnalysis {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }
}

/// Stateless analyzer carrying the classification thresholds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TensionBatchAnalyzer {
    thresholds: QualityThresholds,
}

impl TensionBatchAnalyzer {
    pub fn new(thresholds: QualityThresholds) -> Self {
        Self { thresholds }
    }

    /// Analyzes a session where both sides use the same spoke type.
    pub fn analyze(&self, readings: &[ConvertedReading], range: ForceRange) -> BatchAnalysis {
        self.analyze_sides(readings, range, range)
    }

    /// Analyzes a session where each side has its own recommended range.
    pub fn analyze_sides(
        &self,
        readings: &[ConvertedReading],
        left_range: ForceRange,
        right_range: ForceRange,
    ) -> BatchAnalysis {
        let left = self.analyze_side(Side::Left, readings, left_range);
        let right = self.analyze_side(Side::Right, readings, right_range);
        let verdict = self.verdict(&left, &right);
        log::debug!(
            "tension verdict {verdict}: range violations {}/{}, band violations {}/{}, cv {:.3}/{:.3}",
            left.range_violations(),
            right.range_violations(),
            left.deviation_violations(),
            right.deviation_violations(),
            left.coefficient_of_variation(),
            right.coefficient_of_variation()
        );
        BatchAnalysis {
            left,
            right,
            verdict,
        }
    }

    fn analyze_side(&self, side: Side, readings: &[ConvertedReading], range: ForceRange) -> SideAnalysis {
        let side_readings: Vec<&ConvertedReading> =
            readings.iter().filter(|r| r.side == side).collect();
        let forces: Vec<f64> = side_readings.iter().filter_map(|r| r.force).collect();
        let statistics = SideStatistics::from_forces(&forces, self.thresholds.band_fraction);

        let readings = side_readings
            .into_iter()
            .map(|reading| ClassifiedReading {
                reading: *reading,
                range_status: classify_range(reading, range),
                deviation_status: classify_deviation(reading.force, statistics.as_ref()),
            })
            .collect();

        SideAnalysis {
            side,
            statistics,
            readings,
        }
    }

    fn verdict(&self, left: &SideAnalysis, right: &SideAnalysis) -> QualityVerdict {
        let range_violations = left.range_violations() + right.range_violations();
        let deviation_violations = left.deviation_violations() + right.deviation_violations();
        let max_cv = self.thresholds.max_coefficient_of_variation;
        let dispersed =
            left.coefficient_of_variation() > max_cv || right.coefficient_of_variation() > max_cv;
        let within_balance_cap = self.thresholds.well_balanced_max_cv.is_none_or(|cap| {
            left.coefficient_of_variation() <= cap && right.coefficient_of_variation() <= cap
        });

        if range_violations == 0 && deviation_violations == 0 && within_balance_cap {
            QualityVerdict::WellBalanced
        } else if range_violations == 0 && !dispersed {
            QualityVerdict::NeedsTruing
        } else {
            QualityVerdict::UnevenTension
        }
    }
}

/// Analyzes a session with the default thresholds.
pub fn analyze(readings: &[ConvertedReading], range: ForceRange) -> BatchAnalysis {
    TensionBatchAnalyzer::default().analyze(readings, range)
}

fn classify_range(reading: &ConvertedReading, range: ForceRange) -> RangeStatus {
    match (reading.status, reading.force) {
        (ConversionStatus::BelowDomain, _) => RangeStatus::BelowDomain,
        (ConversionStatus::AboveDomain, _) => RangeStatus::AboveDomain,
        (_, Some(force)) if range.contains(force) => RangeStatus::InRange,
        (_, Some(force)) if force < range.min => RangeStatus::Under,
        (_, Some(_)) => RangeStatus::Over,
        // No estimate without a domain escape; treat it as one.
        (_, None) => RangeStatus::BelowDomain,
    }
}

fn classify_deviation(force: Option<f64>, statistics: Option<&SideStatistics>) -> DeviationStatus {
    match (force, statistics) {
        (Some(force), Some(stats)) if force < stats.lower_band => DeviationStatus::Under,
        (Some(force), Some(stats)) if force > stats.upper_band => DeviationStatus::Over,
        (Some(_), Some(_)) => DeviationStatus::InRange,
        _ => DeviationStatus::Unknown,
    }
}
