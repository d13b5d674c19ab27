//! Spoke types: a named calibration curve plus the material, cross-section
//! and dimensions read from the type's name (e.g. `"Steel Round 2.0mm"`,
//! `"Steel Blade 1.4 x 2.6mm"`).

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::calibration::{CalibrationCurve, ForceRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum SpokeMaterial {
    Steel,
    Aluminum,
    Titanium,
    Carbon,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum SpokeShape {
    Round,
    Blade,
    Unknown,
}

/// Metadata derived from a spoke type name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpokeMetadata {
    pub material: SpokeMaterial,
    pub shape: SpokeShape,
    pub dimensions: String,
}

impl SpokeMetadata {
    pub fn parse(name: &str) -> Self {
        Self {
            material: parse_material(name),
            shape: parse_shape(name),
            dimensions: parse_dimensions(name),
        }
    }
}

/// A spoke type with its calibration curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpokeType {
    pub name: String,
    #[serde(flatten)]
    pub metadata: SpokeMetadata,
    pub curve: CalibrationCurve,
}

impl SpokeType {
    pub fn new(name: impl Into<String>, curve: CalibrationCurve) -> Self {
        let name = name.into();
        let metadata = SpokeMetadata::parse(&name);
        Self {
            name,
            metadata,
            curve,
        }
    }

    /// Recommended tension window, taken from the calibration table's ends.
    pub fn recommended_range(&self) -> ForceRange {
        self.curve.recommended_range()
    }
}

fn parse_material(name: &str) -> SpokeMaterial {
    if name.starts_with("Steel") {
        SpokeMaterial::Steel
    } else if name.starts_with("Aluminum") {
        SpokeMaterial::Aluminum
    } else if name.starts_with("Titanium") {
        SpokeMaterial::Titanium
    } else if name.to_lowercase().contains("carbon") {
        SpokeMaterial::Carbon
    } else if name.contains("SPO") || name.contains("Spinergy") || name.contains("Spinnergy") {
        // Spinergy PBO spokes are tabulated with steel.
        SpokeMaterial::Steel
    } else {
        SpokeMaterial::Unknown
    }
}

fn parse_shape(name: &str) -> SpokeShape {
    if name.contains("Round") {
        SpokeShape::Round
    } else if name.contains("Blade") || name.contains("blade") {
        SpokeShape::Blade
    } else {
        SpokeShape::Unknown
    }
}

/// Last word of the name, or the first `N.Nmm` / `N.N x N.Nmm` group when
/// the last word is unusable, or the whole name.
fn parse_dimensions(name: &str) -> String {
    match name.split_whitespace().last() {
        Some(last) if last.len() <= 20 => last.to_string(),
        _ => find_mm_group(name).unwrap_or(name).to_string(),
    }
}

fn find_mm_group(name: &str) -> Option<&str> {
    name.match_indices("mm").find_map(|(end, _)| {
        let start = name[..end]
            .char_indices()
            .rev()
            .take_while(|(_, c)| c.is_ascii_digit() || matches!(c, '.' | 'x' | ' '))
            .last()
            .map_or(end, |(i, _)| i);
        let group = name[start..end + 2].trim_start_matches(['x', ' ']);
        group
            .starts_with(|c: char| c.is_ascii_digit())
            .then_some(group)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_steel() {
        let meta = SpokeMetadata::parse("Steel Round 2.0mm");
        assert_eq!(meta.material, SpokeMaterial::Steel);
        assert_eq!(meta.shape, SpokeShape::Round);
        assert_eq!(meta.dimensions, "2.0mm");
    }

    #[test]
    fn test_parse_blade() {
        let meta = SpokeMetadata::parse("Titanium Blade 1.4 x 2.6mm");
        assert_eq!(meta.material, SpokeMaterial::Titanium);
        assert_eq!(meta.shape, SpokeShape::Blade);
        // Only the last word is kept for short names.
        assert_eq!(meta.dimensions, "2.6mm");
    }

    #[test]
    fn test_parse_special_cases() {
        let mavic = SpokeMetadata::parse("Mavic R2R carbon blade");
        assert_eq!(mavic.material, SpokeMaterial::Carbon);
        assert_eq!(mavic.shape, SpokeShape::Blade);

        let spinergy = SpokeMetadata::parse("SPO Spinergy");
        assert_eq!(spinergy.material, SpokeMaterial::Steel);
        assert_eq!(spinergy.shape, SpokeShape::Unknown);

        assert_eq!(SpokeMetadata::parse("Mystery").material, SpokeMaterial::Unknown);
    }

    #[test]
    fn test_long_last_word_falls_back_to_mm_group() {
        let meta = SpokeMetadata::parse("Aluminum Blade 2.0x2.6mm-flattened-special-edition");
        assert_eq!(meta.dimensions, "2.0x2.6mm");

        // "mm" inside a word is skipped.
        let meta = SpokeMetadata::parse("Hammmered Steel 2.0mm-extra-long-suffix-word");
        assert_eq!(meta.dimensions, "2.0mm");

        let meta = SpokeMetadata::parse("Aluminum averyveryverylongunbrokenword");
        assert_eq!(meta.dimensions, "Aluminum averyveryverylongunbrokenword");
    }

    #[test]
    fn test_recommended_range_from_curve_ends() {
        let curve = CalibrationCurve::from_pairs(&[(17.0, 53.0), (22.0, 85.0), (28.0, 173.0)]).unwrap();
        let spoke = SpokeType::new("Steel Round 2.0mm", curve);
        assert_eq!(spoke.recommended_range(), ForceRange::new(53.0, 173.0));
    }
}
