//! # Reference Calibration Tables
//!
//! A small built-in set of tension-meter conversion tables for common spoke
//! types. Orchestrators normally supply their own tables; these serve as a
//! fallback and as fixtures.

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::calibration::CalibrationCurve;
use crate::spoke_type::SpokeType;

/// `(name, first meter reading, kgf for consecutive readings)`.
const TABLES: [(&str, u32, &[f64]); 3] = [
    (
        "Steel Round 2.0mm",
        17,
        &[53.0, 58.0, 63.0, 70.0, 77.0, 85.0, 94.0, 105.0, 117.0, 132.0, 150.0, 173.0],
    ),
    (
        "Steel Round 1.8mm",
        19,
        &[53.0, 59.0, 64.0, 71.0, 79.0, 87.0, 96.0, 107.0, 120.0, 135.0, 154.0],
    ),
    (
        "Steel Blade 1.4 x 2.6mm",
        22,
        &[52.0, 57.0, 62.0, 68.0, 74.0, 82.0, 90.0, 99.0, 110.0, 122.0, 136.0],
    ),
];

/// Reference spoke types keyed by name, built once on first use.
static REFERENCE_SPOKE_TYPES: Lazy<BTreeMap<&'static str, SpokeType>> = Lazy::new(|| {
    TABLES
        .iter()
        .filter_map(|&(name, first_reading, forces)| {
            let pairs: Vec<(f64, f64)> = forces
                .iter()
                .enumerate()
                .map(|(i, &force)| ((first_reading + i as u32) as f64, force))
                .collect();
            match CalibrationCurve::from_pairs(&pairs) {
                Ok(curve) => Some((name, SpokeType::new(name, curve))),
                Err(e) => {
                    log::error!("reference table `{name}` is unusable: {e}");
                    None
                }
            }
        })
        .collect()
});

/// Looks up a built-in spoke type by its exact name.
pub fn reference_spoke_type(name: &str) -> Option<&'static SpokeType> {
    REFERENCE_SPOKE_TYPES.get(name)
}

/// All built-in spoke types, ordered by name.
pub fn reference_spoke_types() -> impl Iterator<Item = &'static SpokeType> {
    REFERENCE_SPOKE_TYPES.values()
}
