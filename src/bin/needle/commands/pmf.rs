//! Pmf command implementation
//!
//! Aggregates the forecast into vote-total distributions and summarizes them.

use std::path::Path;

use needle_forecast::aggregate::PartyPmfs;
use needle_forecast::forecast::{percent, ExpectedVotes, ForecastSummary};
use needle_forecast::random::rng_from_seed;
use serde::Serialize;
use tracing::info;

use super::load_forecast;
use crate::{OutputFormat, Result};

#[derive(Serialize)]
struct PmfReport<'a> {
    win_threshold: usize,
    summary: &'a ForecastSummary,
    needle: ExpectedVotes,
    pmfs: &'a PartyPmfs,
}

/// Run the pmf command
pub fn run(path: Option<&Path>, format: OutputFormat, seed: Option<u64>) -> Result<()> {
    let loaded = load_forecast(path)?;
    let engine = loaded.engine;
    let seed = seed.or(engine.seed);
    info!(
        "Aggregating {} regions over {} strata",
        loaded.forecast.regions().len(),
        engine.num_strata
    );

    let mut rng = rng_from_seed(seed);
    let (pmfs, summary) = loaded.forecast.summarize(&engine, &mut rng);
    let needle = loaded.forecast.expected_votes();

    match format {
        OutputFormat::Json => {
            let report = PmfReport {
                win_threshold: engine.win_threshold,
                summary: &summary,
                needle,
                pmfs: &pmfs,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            println!("Win threshold:   {}", engine.win_threshold);
            println!("Dem win:         {:6.2}%", percent(summary.dem_win));
            println!("Rep win:         {:6.2}%", percent(summary.rep_win));
            println!("Tie:             {:6.2}%", percent(summary.tie));
            println!(
                "Expected votes:  Dem {:.1} / Rep {:.1}",
                summary.expected.dem, summary.expected.rep
            );
            println!("Needle:          Dem {:.1} / Rep {:.1}", needle.dem, needle.rep);
            println!();
            println!("{:<8} {:>8} {:>8}", "Quantile", "Dem", "Rep");
            for q in [0.05, 0.25, 0.5, 0.75, 0.95] {
                println!(
                    "{:<8} {:>8} {:>8}",
                    format!("{:.0}%", q * 100.0),
                    quantile_label(pmfs.dem.quantile(q)),
                    quantile_label(pmfs.rep.quantile(q)),
                );
            }
            if (summary.dem_mass - 1.0).abs() > 1e-9 || (summary.rep_mass - 1.0).abs() > 1e-9 {
                println!();
                println!(
                    "Retained mass:   Dem {:.6} / Rep {:.6}",
                    summary.dem_mass, summary.rep_mass
                );
            }
        }
    }

    Ok(())
}

fn quantile_label(total: Option<usize>) -> String {
    total.map_or_else(|| "-".to_string(), |t| t.to_string())
}
