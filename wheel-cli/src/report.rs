//! # Report Module
//!
//! Plain-text rendering of calculation results for the terminal.

use wheel_core::{
    BatchAnalysis, Conversion, ConvertedReading, Side, SideAnalysis, SpokeLengths, SpokeType,
};

/// Spoke lengths of a build, one line per side.
pub fn lengths(build_name: Option<&str>, lengths: &SpokeLengths) -> String {
    let mut lines = vec![format!("Spoke lengths: {}", build_name.unwrap_or("unnamed build"))];
    lines.extend(
        Side::BOTH
            .iter()
            .map(|&side| format!("  {:<5} {:>6.1} mm", side.to_string(), lengths.get(side))),
    );
    lines.join("\n")
}

/// A single reading conversion.
pub fn conversion(spoke: &SpokeType, reading: f64, conversion: &Conversion) -> String {
    let curve = &spoke.curve;
    let force = match conversion.force {
        Some(force) => format!("{force:.1} kgf"),
        None => format!(
            "no estimate (calibrated for {}..{})",
            curve.min_reading(),
            curve.max_reading()
        ),
    };
    format!(
        "{}: reading {} -> {} [{}]",
        spoke.name, reading, force, conversion.status
    )
}

/// Full session analysis: per-side statistics, reading table and verdict.
pub fn analysis(session_name: Option<&str>, analysis: &BatchAnalysis) -> String {
    let mut lines = vec![format!(
        "Tension session: {}",
        session_name.unwrap_or("unnamed session")
    )];
    for side in Side::BOTH {
        lines.push(String::new());
        lines.extend(side_section(analysis.side(side)));
    }
    lines.push(String::new());
    lines.push(format!("Verdict: {}", analysis.verdict));
    lines.join("\n")
}

fn side_section(side: &SideAnalysis) -> Vec<String> {
    let mut lines = Vec::with_capacity(side.readings.len() + 3);
    match &side.statistics {
        Some(stats) => lines.push(format!(
            "{} side: n={} mean {:.1} sd {:.1} (cv {:.1}%) min {:.1} max {:.1} band {:.1}..{:.1}",
            side.side,
            stats.count,
            stats.mean,
            stats.std_dev,
            stats.coefficient_of_variation() * 100.0,
            stats.min,
            stats.max,
            stats.lower_band,
            stats.upper_band
        )),
        None => lines.push(format!("{} side: no valid readings", side.side)),
    }
    if side.readings.is_empty() {
        return lines;
    }

    lines.push(format!(
        "  {:>4} {:>7} {:>8}  {:<13} {:<12} {}",
        "#", "reading", "kgf", "conversion", "range", "deviation"
    ));
    lines.extend(side.readings.iter().map(|classified| {
        format!(
            "  {} {:<12} {}",
            reading_columns(&classified.reading),
            classified.range_status.to_string(),
            classified.deviation_status
        )
    }));
    lines
}

fn reading_columns(reading: &ConvertedReading) -> String {
    let force = reading
        .force
        .map_or_else(|| "-".to_string(), |force| format!("{force:.1}"));
    format!(
        "{:>4} {:>7} {:>8}  {:<13}",
        reading.position,
        reading.value,
        force,
        reading.status.to_string()
    )
}

/// Available spoke types with their calibrated range.
pub fn spoke_types<'a>(spoke_types: impl Iterator<Item = &'a SpokeType>) -> String {
    spoke_types
        .map(|spoke| {
            let curve = &spoke.curve;
            let range = spoke.recommended_range();
            format!(
                "{:<28} {:<9} {:<7} {:<12} readings {}..{} -> {:.0}..{:.0} kgf",
                spoke.name,
                spoke.metadata.material.to_string(),
                spoke.metadata.shape.to_string(),
                spoke.metadata.dimensions,
                curve.min_reading(),
                curve.max_reading(),
                range.min,
                range.max
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheel_core::reference::reference_spoke_type;
    use wheel_core::{RawReading, analyze, convert, convert_all};

    #[test]
    fn test_lengths_report() {
        let report = lengths(Some("Rear"), &SpokeLengths { left: 294.2, right: 292.0 });
        assert_eq!(
            report,
            "Spoke lengths: Rear\n  left   294.2 mm\n  right  292.0 mm"
        );
    }

    #[test]
    fn test_conversion_report_out_of_range() {
        let spoke = reference_spoke_type("Steel Round 2.0mm").unwrap();
        let report = conversion(spoke, 40.0, &convert(40.0, &spoke.curve));
        assert!(report.contains("no estimate"));
        assert!(report.ends_with("[above_domain]"));
    }

    #[test]
    fn test_analysis_report_mentions_every_reading() {
        let spoke = reference_spoke_type("Steel Round 2.0mm").unwrap();
        let raw = [
            RawReading::new(Side::Left, 1, 21.0),
            RawReading::new(Side::Left, 2, 16.0),
        ];
        let result = analyze(&convert_all(&raw, &spoke.curve), spoke.recommended_range());
        let report = analysis(None, &result);

        assert!(report.contains("left side: n=1"));
        assert!(report.contains("right side: no valid readings"));
        assert!(report.contains("below_domain"));
        assert!(report.ends_with("Verdict: uneven_tension"));
    }

    #[test]
    fn test_spoke_type_listing() {
        let spoke = reference_spoke_type("Steel Round 2.0mm").unwrap();
        let listing = spoke_types(std::iter::once(spoke));
        assert!(listing.starts_with("Steel Round 2.0mm"));
        assert!(listing.contains("53..173 kgf"));
    }
}
