//! # needle-forecast
//!
//! Correlated Monte-Carlo engine for electoral-vote outcome distributions.
//!
//! A forecast is a set of regions, each with a vote weight, a marginal win
//! probability (encoded as a lean angle) and a correlation to a shared
//! national shock. From it the crate derives the probability of every
//! possible vote total for both parties and the joint probability of any
//! combination of pinned regional outcomes.
//!
//! ## Modules
//!
//! - [`special`]: log-gamma and the regularized incomplete beta function
//! - [`correlation`]: conditional win probability given the shared shock
//! - [`aggregate`]: stratified aggregation of regions into vote-total PMFs
//! - [`scenario`]: joint probability of pinned regional outcomes
//! - [`forecast`]: regions plus baselines, summaries and the default map
//! - [`config`]: engine settings and the TOML forecast file
//! - [`region`], [`outcome`], [`random`], [`error`]: supporting types
//!
//! ## Design Philosophy
//!
//! - **Injected randomness**: every stochastic routine takes `&mut R: Rng`,
//!   so a seeded generator reproduces results exactly
//! - **Infallible engine**: validation happens once, where data enters
//!   ([`region::Region::new`], [`config::load`]); the numerical core never
//!   returns errors
//! - **Property-based testing**: probability bounds and monotonicity are
//!   verified via proptest
//!
//! ## Example
//!
//! ```
//! use needle_forecast::config::EngineConfig;
//! use needle_forecast::forecast::Forecast;
//! use needle_forecast::random::create_rng;
//!
//! let forecast = Forecast::battleground();
//! let config = EngineConfig { num_strata: 64, ..EngineConfig::default() };
//! let (_, summary) = forecast.summarize(&config, &mut create_rng(42));
//! assert!((summary.dem_win + summary.rep_win - 1.0).abs() < 1e-12);
//! ```

pub mod aggregate;
pub mod config;
pub mod correlation;
pub mod error;
pub mod forecast;
pub mod outcome;
pub mod random;
pub mod region;
pub mod scenario;
pub mod special;

pub use aggregate::{compute_pmfs, compute_pmfs_with, AggregationSettings, PartyPmfs};
pub use config::{EngineConfig, ForecastFile};
pub use error::{ForecastError, Result};
pub use forecast::{Forecast, ForecastSummary};
pub use outcome::OutcomePmf;
pub use region::Region;
pub use scenario::{scenario_curve, scenario_probability, RegionOutcome, ScenarioCurve, ScenarioSelection};
