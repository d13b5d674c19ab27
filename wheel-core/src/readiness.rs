//! Build readiness: whether a wheel build record carries everything the spoke
//! length calculation needs.

use serde::{Deserialize, Serialize};

use crate::WheelError;
use crate::geometry::{HubGeometry, LacingSpec, RimGeometry, SpokeLengths, compute_lengths};

/// The calculation inputs of a wheel build, any of which may still be unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelBuild {
    pub name: Option<String>,
    pub hub: Option<HubGeometry>,
    pub rim: Option<RimGeometry>,
    /// Name of the spoke type in use.
    pub spoke_type: Option<String>,
    /// Length the nipple adds inside the rim (mm).
    pub nipple_seat_length: Option<f64>,
    /// Stored lacing label, e.g. `"3x"` or `"radial"`.
    pub lacing_pattern: Option<String>,
    pub spoke_count: Option<u32>,
}

impl WheelBuild {
    /// Labels of the inputs that are still missing, in a fixed order.
    pub fn missing_components(&self) -> Vec<&'static str> {
        let lacing_pattern_set = self
            .lacing_pattern
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        [
            ("hub", self.hub.is_some()),
            ("rim", self.rim.is_some()),
            ("spoke", self.spoke_type.is_some()),
            ("nipple", self.nipple_seat_length.is_some()),
            ("lacing pattern", lacing_pattern_set),
            ("spoke count", self.spoke_count.is_some_and(|n| n > 0)),
        ]
        .into_iter()
        .filter_map(|(label, present)| (!present).then_some(label))
        .collect()
    }

    pub fn can_calculate_spoke_length(&self) -> bool {
        self.missing_components().is_empty()
    }

    /// Computes both spoke lengths once every input is present.
    ///
    /// # Errors
    /// `MissingComponents` listing the absent inputs, or any geometry error.
    pub fn spoke_lengths(&self) -> Result<SpokeLengths, WheelError> {
        match (
            &self.hub,
            &self.rim,
            self.nipple_seat_length,
            self.lacing_pattern.as_deref(),
            self.spoke_count,
        ) {
            (Some(hub), Some(rim), Some(nipple), Some(pattern), Some(spoke_count))
                if self.can_calculate_spoke_length() =>
            {
                let lacing = LacingSpec::from_pattern(pattern, spoke_count)?;
                compute_lengths(hub, rim, &lacing, nipple)
            }
            _ => Err(WheelError::MissingComponents(self.missing_components())),
        }
    }
}
