//! # Spoke Length Module
//!
//! Computes the recommended spoke length for each side of a wheel from the
//! hub flange geometry, the rim's effective diameter (ERD) and the lacing
//! pattern.
//!
//! ## Method
//! The spoke runs from a flange hole to the nipple seat on the rim. Looking
//! along the axle, the flange hole sits at radius `r` and the nipple seat at
//! radius `R`, separated by the lacing angle `α`; axially they are `d` apart
//! (the flange offset). The law of cosines gives
//!
//! ```text
//! L = sqrt(R² + r² + d² − 2·R·r·cos α) − nipple_seat_length
//! α = 2π · crossings / (spoke_count / 2)
//! ```
//!
//! Radial lacing (`crossings = 0`) collapses to `sqrt((R − r)² + d²)`.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::{Side, WheelError, round_tenth};

/// Hub dimensions relevant to spoke length, all in millimetres.
///
/// Left and right values may differ (asymmetric hubs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HubGeometry {
    pub left_flange_diameter: f64,
    pub right_flange_diameter: f64,
    /// Axial distance from the hub centre to the left flange.
    pub left_flange_offset: f64,
    /// Axial distance from the hub centre to the right flange.
    pub right_flange_offset: f64,
    pub over_locknut_distance: f64,
    pub spoke_hole_diameter: f64,
}

impl HubGeometry {
    pub fn flange_diameter(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_flange_diameter,
            Side::Right => self.right_flange_diameter,
        }
    }

    pub fn flange_offset(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left_flange_offset,
            Side::Right => self.right_flange_offset,
        }
    }

    fn validate(&self) -> Result<(), WheelError> {
        positive("left_flange_diameter", self.left_flange_diameter)?;
        positive("right_flange_diameter", self.right_flange_diameter)?;
        positive("left_flange_offset", self.left_flange_offset)?;
        positive("right_flange_offset", self.right_flange_offset)?;
        positive("over_locknut_distance", self.over_locknut_distance)?;
        positive("spoke_hole_diameter", self.spoke_hole_diameter)
    }
}

/// Rim dimensions relevant to spoke length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RimGeometry {
    /// Effective rim diameter, measured at the nipple seats (mm).
    pub effective_diameter: f64,
    pub holes: u32,
}

impl RimGeometry {
    fn validate(&self) -> Result<(), WheelError> {
        positive("effective_diameter", self.effective_diameter)?;
        if self.holes == 0 || self.holes % 2 != 0 {
            return Err(WheelError::geometry(
                "holes",
                format!("must be even and > 0, got {}", self.holes),
            ));
        }
        Ok(())
    }
}

/// Crossing number and spoke count of a lacing pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LacingSpec {
    /// Spoke-to-spoke crossings; 0 is radial.
    pub crossings: u32,
    pub spoke_count: u32,
}

impl LacingSpec {
    pub fn new(crossings: u32, spoke_count: u32) -> Self {
        Self {
            crossings,
            spoke_count,
        }
    }

    /// Builds a lacing spec from a stored pattern label such as `"radial"`,
    /// `"3x"`, `"2-cross"`, `"1 cross"` or a bare `"3"`.
    pub fn from_pattern(pattern: &str, spoke_count: u32) -> Result<Self, WheelError> {
        let normalized = pattern.trim().to_ascii_lowercase();
        if normalized == "radial" {
            return Ok(Self::new(0, spoke_count));
        }

        let digits = normalized
            .trim_end_matches("cross")
            .trim_end_matches('x')
            .trim_end_matches(['-', ' ']);
        digits
            .parse::<u32>()
            .map(|crossings| Self::new(crossings, spoke_count))
            .map_err(|_| {
                WheelError::geometry("lacing_pattern", format!("unrecognised pattern `{pattern}`"))
            })
    }

    /// Spokes on one side of the wheel.
    pub fn spokes_per_side(&self) -> u32 {
        self.spoke_count / 2
    }

    /// Angle between the flange hole and the nipple seat, seen along the axle.
    pub fn lacing_angle(&self) -> f64 {
        2.0 * PI * self.crossings as f64 / self.spokes_per_side() as f64
    }

    fn validate(&self) -> Result<(), WheelError> {
        if self.spoke_count == 0 || self.spoke_count % 2 != 0 {
            return Err(WheelError::geometry(
                "spoke_count",
                format!("must be even and > 0, got {}", self.spoke_count),
            ));
        }
        if self.crossings >= self.spokes_per_side() {
            return Err(WheelError::geometry(
                "crossings",
                format!(
                    "{} crossings is degenerate for {} spokes",
                    self.crossings, self.spoke_count
                ),
            ));
        }
        Ok(())
    }
}

/// Recommended spoke length for both sides of a wheel (mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpokeLengths {
    pub left: f64,
    pub right: f64,
}

impl SpokeLengths {
    pub fn get(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Computes the spoke length for one side, rounded to 0.1 mm.
///
/// # Errors
/// `WheelError::InvalidGeometry` when any dimension is non-positive, the
/// hole/spoke counts are odd, the spoke count differs from the rim's hole
/// count, the crossing number is degenerate, or the nipple seat length is
/// negative.
pub fn compute_length(
    hub: &HubGeometry,
    rim: &RimGeometry,
    lacing: &LacingSpec,
    nipple_seat_length: f64,
    side: Side,
) -> Result<f64, WheelError> {
    hub.validate()?;
    rim.validate()?;
    lacing.validate()?;
    if !nipple_seat_length.is_finite() || nipple_seat_length < 0.0 {
        return Err(WheelError::geometry(
            "nipple_seat_length",
            format!("must be >= 0, got {nipple_seat_length}"),
        ));
    }
    if lacing.spoke_count != rim.holes {
        return Err(WheelError::geometry(
            "spoke_count",
            format!(
                "{} spokes do not fit a {}-hole rim",
                lacing.spoke_count, rim.holes
            ),
        ));
    }

    let rim_radius = rim.effective_diameter / 2.0;
    let flange_radius = hub.flange_diameter(side) / 2.0;
    let offset = hub.flange_offset(side);

    // Squared distance from the wheel centre to the flange hole.
    let hole_distance_sq = flange_radius * flange_radius + offset * offset;
    let chord_sq = rim_radius * rim_radius + hole_distance_sq
        - 2.0 * rim_radius * flange_radius * lacing.lacing_angle().cos();

    let length = chord_sq.sqrt() - nipple_seat_length;
    if !length.is_finite() || length <= 0.0 {
        return Err(WheelError::geometry(
            "nipple_seat_length",
            format!("leaves no spoke ({length:.1} mm)"),
        ));
    }

    let length = round_tenth(length);
    log::debug!(
        "spoke length {side}: {length} mm ({}x, {} spokes, ERD {})",
        lacing.crossings,
        lacing.spoke_count,
        rim.effective_diameter
    );
    Ok(length)
}

/// Computes the spoke length for both sides.
pub fn compute_lengths(
    hub: &HubGeometry,
    rim: &RimGeometry,
    lacing: &LacingSpec,
    nipple_seat_length: f64,
) -> Result<SpokeLengths, WheelError> {
    Ok(SpokeLengths {
        left: compute_length(hub, rim, lacing, nipple_seat_length, Side::Left)?,
        right: compute_length(hub, rim, lacing, nipple_seat_length, Side::Right)?,
    })
}

fn positive(field: &'static str, value: f64) -> Result<(), WheelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(WheelError::geometry(field, format!("must be > 0, got {value}")))
    }
}
