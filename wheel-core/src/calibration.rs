//! # Tension Conversion Module
//!
//! Turns raw tension-meter readings into force estimates using a per-spoke-type
//! calibration curve. Readings that hit a calibration point return that
//! point's force; readings between two points are linearly interpolated.
//!
//! Readings outside the calibrated range never get an estimate: there is no
//! extrapolation, the result carries a `BelowDomain` / `AboveDomain` status
//! and no force instead.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum_macros::{Display, EnumString};

use crate::{Side, WheelError, round_tenth};

/// One reference point of a calibration table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPoint {
    /// Meter reading.
    pub reading: f64,
    /// Force (kgf) for that reading.
    pub force: f64,
}

impl CalibrationPoint {
    pub const fn new(reading: f64, force: f64) -> Self {
        Self { reading, force }
    }
}

/// Recommended force window for a spoke type (kgf, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForceRange {
    pub min: f64,
    pub max: f64,
}

impl ForceRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, force: f64) -> bool {
        force >= self.min && force <= self.max
    }
}

/// Calibration curve for one spoke type.
///
/// Always holds at least two points with strictly increasing readings; both
/// [`CalibrationCurve::new`] and deserialization enforce this. Forces are
/// expected to rise with the reading but that is not enforced, see
/// [`CalibrationCurve::is_monotonic`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CalibrationPoint>", into = "Vec<CalibrationPoint>")]
pub struct CalibrationCurve {
    points: Vec<CalibrationPoint>,
}

impl CalibrationCurve {
    /// Builds a curve from points already sorted by reading.
    ///
    /// # Errors
    /// * `EmptyCurve` - fewer than two points
    /// * `UnorderedCurve` - a reading is not strictly above its predecessor
    pub fn new(points: Vec<CalibrationPoint>) -> Result<Self, WheelError> {
        if points.len() < 2 {
            return Err(WheelError::EmptyCurve {
                points: points.len(),
            });
        }
        if let Some(index) = points
            .windows(2)
            .position(|pair| pair[1].reading.partial_cmp(&pair[0].reading) != Some(Ordering::Greater))
        {
            return Err(WheelError::UnorderedCurve {
                index: index + 1,
                reading: points[index + 1].reading,
            });
        }

        let curve = Self { points };
        if !curve.is_monotonic() {
            log::warn!(
                "calibration curve {}..{} has decreasing forces; interpolation follows the table as given",
                curve.min_reading(),
                curve.max_reading()
            );
        }
        Ok(curve)
    }

    /// Convenience constructor from `(reading, force)` pairs.
    pub fn from_pairs(pairs: &[(f64, f64)]) -> Result<Self, WheelError> {
        Self::new(
            pairs
                .iter()
                .map(|&(reading, force)| CalibrationPoint::new(reading, force))
                .collect(),
        )
    }

    pub fn points(&self) -> &[CalibrationPoint] {
        &self.points
    }

    fn first(&self) -> &CalibrationPoint {
        &self.points[0]
    }

    fn last(&self) -> &CalibrationPoint {
        &self.points[self.points.len() - 1]
    }

    pub fn min_reading(&self) -> f64 {
        self.first().reading
    }

    pub fn max_reading(&self) -> f64 {
        self.last().reading
    }

    pub fn min_force(&self) -> f64 {
        self.first().force
    }

    pub fn max_force(&self) -> f64 {
        self.last().force
    }

    /// Force window spanned by the curve's end points.
    pub fn recommended_range(&self) -> ForceRange {
        ForceRange::new(self.min_force(), self.max_force())
    }

    /// True when forces never decrease as the reading rises.
    pub fn is_monotonic(&self) -> bool {
        self.points.windows(2).all(|pair| pair[1].force >= pair[0].force)
    }

    /// Converts a reading with this curve. See [`convert`].
    pub fn convert(&self, reading: f64) -> Conversion {
        convert(reading, self)
    }
}

impl TryFrom<Vec<CalibrationPoint>> for CalibrationCurve {
    type Error = WheelError;

    fn try_from(points: Vec<CalibrationPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<CalibrationCurve> for Vec<CalibrationPoint> {
    fn from(curve: CalibrationCurve) -> Self {
        curve.points
    }
}

/// How a force estimate was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ConversionStatus {
    /// The reading matched a calibration point.
    Exact,
    /// Linearly interpolated between two calibration points.
    Interpolated,
    /// Reading below the calibrated range; no estimate.
    BelowDomain,
    /// Reading above the calibrated range; no estimate.
    AboveDomain,
}

impl ConversionStatus {
    pub fn is_domain_escape(&self) -> bool {
        matches!(self, Self::BelowDomain | Self::AboveDomain)
    }
}

/// Result of converting one reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub force: Option<f64>,
    pub status: ConversionStatus,
}

impl Conversion {
    fn escaped(status: ConversionStatus) -> Self {
        Self { force: None, status }
    }
}

/// Converts a meter reading to a force estimate.
///
/// Order of checks: below range, above range, exact match, interpolation.
/// A NaN reading has no estimate and reports `BelowDomain`.
pub fn convert(reading: f64, curve: &CalibrationCurve) -> Conversion {
    if reading.is_nan() || reading < curve.min_reading() {
        return Conversion::escaped(ConversionStatus::BelowDomain);
    }
    if reading > curve.max_reading() {
        return Conversion::escaped(ConversionStatus::AboveDomain);
    }

    let points = curve.points();
    // First point whose reading is >= `reading`; in range, so always found.
    let upper_index = points.partition_point(|p| p.reading < reading);
    let upper = points[upper_index];
    if upper.reading == reading {
        return Conversion {
            force: Some(upper.force),
            status: ConversionStatus::Exact,
        };
    }

    // `reading` > min_reading here, so upper_index >= 1.
    let lower = points[upper_index - 1];
    let fraction = (reading - lower.reading) / (upper.reading - lower.reading);
    let force = round_tenth(lower.force + fraction * (upper.force - lower.force));
    Conversion {
        force: Some(force),
        status: ConversionStatus::Interpolated,
    }
}

/// A reading taken on one spoke.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    pub side: Side,
    /// 1-based spoke position on that side.
    pub position: u32,
    /// Meter value.
    pub value: f64,
}

impl RawReading {
    pub fn new(side: Side, position: u32, value: f64) -> Self {
        Self {
            side,
            position,
            value,
        }
    }

    pub fn convert(&self, curve: &CalibrationCurve) -> ConvertedReading {
        let conversion = convert(self.value, curve);
        if conversion.status.is_domain_escape() {
            log::warn!(
                "{} spoke {}: reading {} outside calibrated range {}..{} ({})",
                self.side,
                self.position,
                self.value,
                curve.min_reading(),
                curve.max_reading(),
                conversion.status
            );
        }
        ConvertedReading {
            side: self.side,
            position: self.position,
            value: self.value,
            force: conversion.force,
            status: conversion.status,
        }
    }
}

/// A reading together with its force estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvertedReading {
    pub side: Side,
    pub position: u32,
    pub value: f64,
    pub force: Option<f64>,
    pub status: ConversionStatus,
}

/// Converts every reading of a session with the same curve.
pub fn convert_all(readings: &[RawReading], curve: &CalibrationCurve) -> Vec<ConvertedReading> {
    readings.iter().map(|r| r.convert(curve)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel_round_curve() -> CalibrationCurve {
        CalibrationCurve::from_pairs(&[
            (17.0, 53.0),
            (18.0, 58.0),
            (19.0, 63.0),
            (20.0, 70.0),
            (21.0, 77.0),
            (22.0, 85.0),
            (23.0, 94.0),
            (24.0, 105.0),
            (25.0, 117.0),
            (26.0, 132.0),
            (27.0, 150.0),
            (28.0, 173.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_every_point_converts_exactly() {
        let curve = steel_round_curve();
        for point in curve.points() {
            assert_eq!(
                convert(point.reading, &curve),
                Conversion {
                    force: Some(point.force),
                    status: ConversionStatus::Exact
                }
            );
        }
    }

    #[test]
    fn test_interpolation_between_points() {
        let curve = steel_round_curve();
        let result = convert(20.5, &curve);
        assert_eq!(result.status, ConversionStatus::Interpolated);
        assert_eq!(result.force, Some(73.5));
    }

    #[test]
    fn test_interpolation_rounds_to_one_decimal() {
        let curve = steel_round_curve();
        // 94 + (1/3)·11 = 97.666...
        let result = convert(23.0 + 1.0 / 3.0, &curve);
        assert_eq!(result.force, Some(97.7));
    }

    #[test]
    fn test_domain_escape_has_no_force() {
        let curve = steel_round_curve();
        for reading in [16.999, 0.0, -5.0, f64::NEG_INFINITY, f64::NAN] {
            let result = convert(reading, &curve);
            assert_eq!(result.force, None);
            assert_eq!(result.status, ConversionStatus::BelowDomain);
        }
        for reading in [28.001, 50.0, f64::INFINITY] {
            let result = convert(reading, &curve);
            assert_eq!(result.force, None);
            assert_eq!(result.status, ConversionStatus::AboveDomain);
        }
        // Repeated calls give the same answer.
        assert_eq!(convert(30.0, &curve), convert(30.0, &curve));
    }

    #[test]
    fn test_boundaries_are_exact() {
        let curve = steel_round_curve();
        assert_eq!(convert(17.0, &curve).status, ConversionStatus::Exact);
        assert_eq!(convert(28.0, &curve).force, Some(173.0));
    }

    #[test]
    fn test_too_few_points_is_empty_curve() {
        assert_eq!(
            CalibrationCurve::new(vec![]),
            Err(WheelError::EmptyCurve { points: 0 })
        );
        assert_eq!(
            CalibrationCurve::from_pairs(&[(17.0, 53.0)]),
            Err(WheelError::EmptyCurve { points: 1 })
        );
    }

    #[test]
    fn test_unsorted_readings_rejected() {
        let result = CalibrationCurve::from_pairs(&[(17.0, 53.0), (19.0, 63.0), (18.0, 58.0)]);
        assert_eq!(
            result,
            Err(WheelError::UnorderedCurve {
                index: 2,
                reading: 18.0
            })
        );
        let duplicate = CalibrationCurve::from_pairs(&[(17.0, 53.0), (17.0, 54.0)]);
        assert!(matches!(duplicate, Err(WheelError::UnorderedCurve { index: 1, .. })));
    }

    #[test]
    fn test_non_monotonic_curve_is_accepted() {
        let curve =
            CalibrationCurve::from_pairs(&[(10.0, 50.0), (11.0, 70.0), (12.0, 60.0), (13.0, 90.0)])
                .unwrap();
        assert!(!curve.is_monotonic());
        // Interpolation follows the dip as tabulated.
        assert_eq!(convert(11.5, &curve).force, Some(65.0));
        assert_eq!(curve.recommended_range(), ForceRange::new(50.0, 90.0));
    }

    #[test]
    fn test_derived_extremes() {
        let curve = steel_round_curve();
        assert!(curve.is_monotonic());
        assert_eq!(curve.min_reading(), 17.0);
        assert_eq!(curve.max_reading(), 28.0);
        assert_eq!(curve.recommended_range(), ForceRange::new(53.0, 173.0));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: CalibrationCurve =
            serde_json::from_str(r#"[{"reading": 1, "force": 10}, {"reading": 2, "force": 20}]"#)
                .unwrap();
        assert_eq!(ok.points().len(), 2);

        let short = serde_json::from_str::<CalibrationCurve>(r#"[{"reading": 1, "force": 10}]"#);
        assert!(short.is_err());
    }

    #[test]
    fn test_raw_reading_conversion_keeps_identity() {
        let curve = steel_round_curve();
        let readings = [
            RawReading::new(Side::Left, 1, 20.0),
            RawReading::new(Side::Right, 4, 40.0),
        ];
        let converted = convert_all(&readings, &curve);
        assert_eq!(converted[0].side, Side::Left);
        assert_eq!(converted[0].force, Some(70.0));
        assert_eq!(converted[1].position, 4);
        assert_eq!(converted[1].force, None);
        assert_eq!(converted[1].status, ConversionStatus::AboveDomain);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(ConversionStatus::BelowDomain.to_string(), "below_domain");
        assert_eq!(
            serde_json::to_string(&ConversionStatus::Interpolated).unwrap(),
            "\"interpolated\""
        );
    }
}
