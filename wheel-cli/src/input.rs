//! # Input Records
//!
//! Loading of the JSON records the calculations run on: wheel builds, tension
//! sessions, threshold overrides and conversion tables. Conversion tables use
//! the layout `{ "<spoke type>": { "<meter reading>": <kgf>, ... }, ... }`.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use wheel_core::reference::reference_spoke_types;
use wheel_core::{CalibrationCurve, CalibrationPoint, RawReading, Side, SpokeType};

/// One tensioning session of a build.
#[derive(Debug, Clone, Deserialize)]
pub struct TensionSession {
    #[serde(default)]
    pub name: Option<String>,
    /// Spoke type on the left side, and on the right unless overridden.
    pub spoke_type: String,
    #[serde(default)]
    pub right_spoke_type: Option<String>,
    pub readings: Vec<RawReading>,
}

impl TensionSession {
    pub fn spoke_type_for(&self, side: Side) -> &str {
        match side {
            Side::Left => &self.spoke_type,
            Side::Right => self.right_spoke_type.as_deref().unwrap_or(&self.spoke_type),
        }
    }
}

/// Reads and deserializes a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

/// Spoke types available for conversion, keyed by name.
#[derive(Debug, Clone)]
pub struct SpokeCatalog {
    spoke_types: BTreeMap<String, SpokeType>,
}

impl SpokeCatalog {
    /// The built-in reference tables.
    pub fn reference() -> Self {
        Self {
            spoke_types: reference_spoke_types()
                .map(|spoke| (spoke.name.clone(), spoke.clone()))
                .collect(),
        }
    }

    /// Loads a conversion table file, or falls back to the reference tables.
    pub fn load(table: Option<&Path>) -> Result<Self> {
        match table {
            Some(path) => {
                let data = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let catalog = Self::parse(&data)
                    .with_context(|| format!("invalid conversion table {}", path.display()))?;
                log::info!(
                    "Loaded {} spoke types from {}",
                    catalog.spoke_types.len(),
                    path.display()
                );
                Ok(catalog)
            }
            None => {
                log::info!("No conversion table given, using reference tables");
                Ok(Self::reference())
            }
        }
    }

    /// Parses a conversion table. Readings are JSON object keys, so they are
    /// sorted numerically here before the curve is built.
    pub fn parse(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_str(json)?;

        let mut spoke_types = BTreeMap::new();
        for (name, conversions) in raw {
            let mut points = conversions
                .iter()
                .map(|(reading, &force)| {
                    reading
                        .trim()
                        .parse::<f64>()
                        .map(|reading| CalibrationPoint::new(reading, force))
                        .with_context(|| format!("`{name}`: reading `{reading}` is not a number"))
                })
                .collect::<Result<Vec<_>>>()?;
            points.sort_by(|a, b| a.reading.total_cmp(&b.reading));

            let curve = CalibrationCurve::new(points).with_context(|| format!("spoke type `{name}`"))?;
            log::debug!("{name}: {} conversion points", curve.points().len());
            spoke_types.insert(name.clone(), SpokeType::new(name, curve));
        }
        Ok(Self { spoke_types })
    }

    pub fn get(&self, name: &str) -> Result<&SpokeType> {
        self.spoke_types.get(name).ok_or_else(|| {
            anyhow!(
                "unknown spoke type `{name}` (available: {})",
                self.spoke_types.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }

    pub fn spoke_types(&self) -> impl Iterator<Item = &SpokeType> {
        self.spoke_types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheel_core::SpokeMaterial;

    const TABLE: &str = r#"{
        "Steel Round 2.0mm": {"9": 0, "17": 53, "18": 58, "10": 12},
        "Aluminum Round 2.2mm": {"20": 40, "30": 90}
    }"#;

    #[test]
    fn test_table_readings_sorted_numerically() {
        let catalog = SpokeCatalog::parse(TABLE).unwrap();
        let steel = catalog.get("Steel Round 2.0mm").unwrap();
        let readings: Vec<f64> = steel.curve.points().iter().map(|p| p.reading).collect();
        assert_eq!(readings, vec![9.0, 10.0, 17.0, 18.0]);
        assert_eq!(steel.metadata.material, SpokeMaterial::Steel);
        assert_eq!(catalog.spoke_types().count(), 2);
    }

    #[test]
    fn test_table_rejects_short_curve() {
        let err = SpokeCatalog::parse(r#"{"Steel Round 2.0mm": {"17": 53}}"#).unwrap_err();
        assert!(format!("{err:#}").contains("at least 2 points"));
    }

    #[test]
    fn test_table_rejects_non_numeric_reading() {
        let err = SpokeCatalog::parse(r#"{"Steel": {"a": 1, "2": 3}}"#).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn test_unknown_spoke_type_lists_available() {
        let catalog = SpokeCatalog::parse(TABLE).unwrap();
        let err = catalog.get("Carbon").unwrap_err().to_string();
        assert!(err.contains("Aluminum Round 2.2mm"));
    }

    #[test]
    fn test_reference_catalog_is_populated() {
        assert!(SpokeCatalog::reference().get("Steel Round 2.0mm").is_ok());
    }

    #[test]
    fn test_session_right_override() {
        let session: TensionSession = serde_json::from_str(
            r#"{
                "spoke_type": "Steel Round 2.0mm",
                "right_spoke_type": "Steel Round 1.8mm",
                "readings": [{"side": "left", "position": 1, "value": 21.0}]
            }"#,
        )
        .unwrap();
        assert_eq!(session.spoke_type_for(Side::Left), "Steel Round 2.0mm");
        assert_eq!(session.spoke_type_for(Side::Right), "Steel Round 1.8mm");
        assert_eq!(session.readings[0].side, Side::Left);
    }
}
