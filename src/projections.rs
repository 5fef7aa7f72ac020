use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

use crate::acquisition::Acquisition;
use crate::sample_slate;
use crate::team_names::TeamNameMap;
use crate::valuation::ProjectionRecord;

const SIM_JITTER_RUNS: f64 = 0.25;
const DEFAULT_PROJECTIONS_PATH: &str = "projections.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectionSource {
    Sample,
    /// Sample slate with every run projection nudged on each refresh.
    Simulated,
    File(PathBuf),
}

impl ProjectionSource {
    pub fn from_env() -> Self {
        let source = env::var("PROJECTIONS_SOURCE")
            .unwrap_or_else(|_| "sample".to_string())
            .trim()
            .to_ascii_lowercase();
        match source.as_str() {
            "simulated" | "sim" => Self::Simulated,
            "file" => {
                let path = env::var("PROJECTIONS_PATH")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .unwrap_or_else(|| DEFAULT_PROJECTIONS_PATH.to_string());
                Self::File(PathBuf::from(path))
            }
            _ => Self::Sample,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Sample => "sample".to_string(),
            Self::Simulated => "simulated".to_string(),
            Self::File(path) => format!("file:{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectionLoad {
    pub acquisition: Acquisition<Vec<ProjectionRecord>>,
    /// Records dropped at the boundary, one message each.
    pub rejected: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawProjection {
    #[serde(default, alias = "Date")]
    date: Option<String>,
    #[serde(alias = "awayTeam", alias = "Away Team")]
    away_team: String,
    #[serde(alias = "homeTeam", alias = "Home Team")]
    home_team: String,
    #[serde(alias = "awayRuns", alias = "Away Runs")]
    away_runs: f64,
    #[serde(alias = "homeRuns", alias = "Home Runs")]
    home_runs: f64,
    #[serde(default, alias = "awayPitcher", alias = "Away SP")]
    away_pitcher: Option<String>,
    #[serde(default, alias = "homePitcher", alias = "Home SP")]
    home_pitcher: Option<String>,
}

pub fn load_projections(
    source: &ProjectionSource,
    names: &TeamNameMap,
    rng: &mut impl Rng,
) -> ProjectionLoad {
    match source {
        ProjectionSource::Sample => accept_all(sample_slate::seed_projections()),
        ProjectionSource::Simulated => {
            accept_all(simulate_projections(&sample_slate::seed_projections(), rng))
        }
        ProjectionSource::File(path) => match read_projections_file(path, names) {
            Ok((records, rejected)) => ProjectionLoad {
                acquisition: Acquisition::fresh_now(records),
                rejected,
            },
            Err(err) => ProjectionLoad {
                acquisition: Acquisition::unavailable(format!("{err:#}")),
                rejected: Vec::new(),
            },
        },
    }
}

fn accept_all(records: Vec<ProjectionRecord>) -> ProjectionLoad {
    ProjectionLoad {
        acquisition: Acquisition::fresh_now(records),
        rejected: Vec::new(),
    }
}

fn read_projections_file(
    path: &Path,
    names: &TeamNameMap,
) -> Result<(Vec<ProjectionRecord>, Vec<String>)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading projections from {}", path.display()))?;
    parse_projections_json(&raw, names)
}

/// Parses a JSON array of projections. Team names are canonicalised; records that
/// break the matchup invariants are returned as rejection messages instead.
pub fn parse_projections_json(
    raw: &str,
    names: &TeamNameMap,
) -> Result<(Vec<ProjectionRecord>, Vec<String>)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok((Vec::new(), Vec::new()));
    }
    let parsed: Vec<RawProjection> =
        serde_json::from_str(trimmed).context("invalid projections json")?;

    let mut records = Vec::with_capacity(parsed.len());
    let mut rejected = Vec::new();
    for raw in parsed {
        let record = ProjectionRecord {
            date: raw.date.unwrap_or_default().trim().to_string(),
            away_team: names.canonical(&raw.away_team),
            home_team: names.canonical(&raw.home_team),
            away_runs: raw.away_runs,
            home_runs: raw.home_runs,
            away_pitcher: non_empty(raw.away_pitcher),
            home_pitcher: non_empty(raw.home_pitcher),
        };
        match record.validate() {
            Ok(()) => records.push(record),
            Err(err) => rejected.push(err.to_string()),
        }
    }
    Ok((records, rejected))
}

/// Jitters each side by up to ±0.25 runs, keeping projections non-negative and at
/// two decimals.
pub fn simulate_projections(
    base: &[ProjectionRecord],
    rng: &mut impl Rng,
) -> Vec<ProjectionRecord> {
    base.iter()
        .map(|record| {
            let mut out = record.clone();
            out.away_runs = jitter_runs(record.away_runs, rng);
            out.home_runs = jitter_runs(record.home_runs, rng);
            out
        })
        .collect()
}

fn jitter_runs(runs: f64, rng: &mut impl Rng) -> f64 {
    let nudged = runs + rng.gen_range(-SIM_JITTER_RUNS..=SIM_JITTER_RUNS);
    (nudged.max(0.0) * 100.0).round() / 100.0
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
