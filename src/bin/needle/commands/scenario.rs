//! Scenario command implementation
//!
//! Pins regions to win or lose and reports their joint probability.

use std::path::Path;

use needle_forecast::random::rng_from_seed;
use needle_forecast::scenario::{RegionOutcome, ScenarioCurve, ScenarioSelection};
use needle_forecast::ForecastError;
use serde::Serialize;
use tracing::info;

use super::load_forecast;
use crate::{OutputFormat, Result};

/// Curve percentiles shown in table output.
const TABLE_STEP: usize = 10;

#[derive(Serialize)]
struct ScenarioReport<'a> {
    probability: f64,
    selection: &'a ScenarioSelection,
    curve: &'a ScenarioCurve,
}

/// Applies `--win` and `--lose` on top of the file's selection.
///
/// An id named by both flags is rejected.
fn pin_regions(mut selection: ScenarioSelection, win: &[String], lose: &[String]) -> Result<ScenarioSelection> {
    if let Some(id) = win.iter().find(|id| lose.contains(id)) {
        return Err(ForecastError::InvalidConfig {
            name: "scenario",
            reason: format!("region '{id}' is pinned to both win and lose"),
        }
        .into());
    }
    for id in win {
        selection.set(id.as_str(), RegionOutcome::Win);
    }
    for id in lose {
        selection.set(id.as_str(), RegionOutcome::Lose);
    }
    Ok(selection)
}

/// Run the scenario command
pub fn run(
    path: Option<&Path>,
    win: &[String],
    lose: &[String],
    format: OutputFormat,
    seed: Option<u64>,
) -> Result<()> {
    let loaded = load_forecast(path)?;
    let engine = loaded.engine;
    let selection = pin_regions(loaded.selection, win, lose)?;
    loaded.forecast.check_selection(&selection)?;
    info!(
        "Evaluating scenario with {} pinned regions over {} samples",
        selection.determined(),
        engine.samples
    );

    let mut rng = rng_from_seed(seed.or(engine.seed));
    let probability = loaded.forecast.scenario_probability(&selection, &engine, &mut rng);
    let curve = loaded.forecast.scenario_curve(&selection);

    match format {
        OutputFormat::Json => {
            let report = ScenarioReport {
                probability,
                selection: &selection,
                curve: &curve,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            for (id, outcome) in selection.iter() {
                println!("{id:<8} {outcome}");
            }
            if selection.is_empty() {
                println!("(no regions pinned)");
            }
            println!();
            println!("Scenario probability: {probability:.2}%");
            println!();
            println!("{:<10} {:>10}", "Shock", "Joint");
            for (k, value) in curve.as_slice().iter().enumerate().step_by(TABLE_STEP) {
                println!("{:<10} {:>10.4}", format!("{k}%"), value);
            }
        }
    }

    Ok(())
}
