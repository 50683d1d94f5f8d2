//! Regions command implementation
//!
//! Lists the effective regions with their derived model parameters.

use std::path::Path;

use needle_forecast::correlation::{concentration, ShapeParameters};
use needle_forecast::forecast::percent;
use serde::Serialize;

use super::load_forecast;
use crate::{OutputFormat, Result};

#[derive(Serialize)]
struct RegionRow<'a> {
    id: &'a str,
    weight: u32,
    lean_angle: f64,
    probability: f64,
    correlation: f64,
    concentration: f64,
    alpha: f64,
    beta: f64,
}

/// Run the regions command
pub fn run(path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let loaded = load_forecast(path)?;
    let regions = loaded.forecast.effective_regions();
    let rows: Vec<RegionRow<'_>> = regions
        .iter()
        .map(|r| {
            let p = r.win_probability();
            let shapes = ShapeParameters::for_aggregation(p, r.correlation());
            RegionRow {
                id: r.id(),
                weight: r.weight(),
                lean_angle: r.lean_angle(),
                probability: p,
                correlation: r.correlation(),
                concentration: concentration(r.correlation()),
                alpha: shapes.alpha,
                beta: shapes.beta,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Table => {
            println!(
                "{:<8} {:>6} {:>8} {:>8} {:>6} {:>8} {:>8}",
                "Region", "Weight", "Lean", "P(win)", "Corr", "Alpha", "Beta"
            );
            for row in &rows {
                println!(
                    "{:<8} {:>6} {:>8.1} {:>7.1}% {:>6.2} {:>8.3} {:>8.3}",
                    row.id,
                    row.weight,
                    row.lean_angle,
                    percent(row.probability),
                    row.correlation,
                    row.alpha,
                    row.beta
                );
            }
            let forecast = &loaded.forecast;
            println!();
            println!(
                "Baselines: Dem {} / Rep {}  Total votes: {}",
                forecast.dem_baseline(),
                forecast.rep_baseline(),
                forecast.total_votes()
            );
        }
    }

    Ok(())
}
