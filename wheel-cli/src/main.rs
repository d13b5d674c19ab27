//! # Wheel Builder - Command Line Front End
//!
//! Thin orchestrator around `wheel-core`: it loads build, session and
//! conversion table records from JSON files, resolves spoke types to their
//! calibration curves and hands plain values to the core calculations.
//!
//! ## Commands
//! - **length**: recommended spoke lengths for a build
//! - **convert**: one tension-meter reading to kgf
//! - **analyze**: statistics, classifications and verdict for a session
//! - **spoke-types**: spoke types available for conversion

mod input;
mod report;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use wheel_core::{
    ConvertedReading, QualityThresholds, Side, TensionBatchAnalyzer, WheelBuild, convert,
};

use input::{SpokeCatalog, TensionSession, load_json};

#[derive(Parser, Debug)]
#[command(author, version, about = "Spoke length and tension calculations for wheel builders", long_about = None)]
struct Cli {
    /// Print JSON instead of a text report
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Recommended spoke lengths for a wheel build
    Length {
        /// Wheel build record (JSON)
        #[arg(long)]
        build: PathBuf,
    },
    /// Convert one tension meter reading to kgf
    Convert {
        #[arg(long, allow_hyphen_values = true)]
        reading: f64,
        /// Spoke type name, e.g. "Steel Round 2.0mm"
        #[arg(long)]
        spoke_type: String,
        /// Conversion table (JSON); built-in reference tables when omitted
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Analyze the readings of a tensioning session
    Analyze {
        /// Tension session record (JSON)
        #[arg(long)]
        session: PathBuf,
        /// Conversion table (JSON); built-in reference tables when omitted
        #[arg(long)]
        table: Option<PathBuf>,
        /// Threshold overrides (JSON)
        #[arg(long)]
        thresholds: Option<PathBuf>,
    },
    /// List the spoke types available for conversion
    SpokeTypes {
        #[arg(long)]
        table: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::debug!("Parsed arguments: {:?}", cli);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Length { build } => {
            let record: WheelBuild = load_json(&build)?;
            let missing = record.missing_components();
            if !missing.is_empty() {
                log::warn!("Build is missing: {}", missing.join(", "));
            }
            let lengths = record
                .spoke_lengths()
                .with_context(|| format!("cannot compute spoke lengths for {}", build.display()))?;
            emit(cli.json, &lengths, || report::lengths(record.name.as_deref(), &lengths))
        }
        Command::Convert {
            reading,
            spoke_type,
            table,
        } => {
            let catalog = SpokeCatalog::load(table.as_deref())?;
            let spoke = catalog.get(&spoke_type)?;
            let conversion = convert(reading, &spoke.curve);
            emit(cli.json, &conversion, || report::conversion(spoke, reading, &conversion))
        }
        Command::Analyze {
            session,
            table,
            thresholds,
        } => {
            let catalog = SpokeCatalog::load(table.as_deref())?;
            let record: TensionSession = load_json(&session)?;
            let thresholds = match thresholds {
                Some(path) => load_json(&path)?,
                None => QualityThresholds::default(),
            };
            log::info!(
                "Analyzing {} readings with band ±{:.0}% and cv limit {:.0}%",
                record.readings.len(),
                thresholds.band_fraction * 100.0,
                thresholds.max_coefficient_of_variation * 100.0
            );

            let left = catalog.get(record.spoke_type_for(Side::Left))?;
            let right = catalog.get(record.spoke_type_for(Side::Right))?;
            let converted: Vec<ConvertedReading> = record
                .readings
                .iter()
                .map(|reading| match reading.side {
                    Side::Left => reading.convert(&left.curve),
                    Side::Right => reading.convert(&right.curve),
                })
                .collect();

            let analysis = TensionBatchAnalyzer::new(thresholds).analyze_sides(
                &converted,
                left.recommended_range(),
                right.recommended_range(),
            );
            log::info!("Verdict: {}", analysis.verdict);
            emit(cli.json, &analysis, || report::analysis(record.name.as_deref(), &analysis))
        }
        Command::SpokeTypes { table } => {
            let catalog = SpokeCatalog::load(table.as_deref())?;
            let spoke_types: Vec<_> = catalog.spoke_types().collect();
            emit(cli.json, &spoke_types, || report::spoke_types(spoke_types.iter().copied()))
        }
    }
}

/// Prints either the JSON form of `value` or the text report.
fn emit<T: Serialize>(json: bool, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text());
    }
    Ok(())
}
