use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::odds_fetch::OddsFetchConfig;
use crate::projections::ProjectionSource;
use crate::team_names::TeamNameMap;
use crate::top_picks::DEFAULT_TOP_PICKS;

const DEFAULT_REFRESH_SECS: u64 = 300;
const MAX_TOP_PICKS: usize = 20;

/// Everything the dashboard reads from the environment, resolved once at startup.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub projections: ProjectionSource,
    pub odds: OddsFetchConfig,
    pub refresh: Duration,
    pub top_n: usize,
    pub team_names_path: Option<PathBuf>,
    pub export_dir: PathBuf,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        let refresh_secs = env::var("REFRESH_SECS")
            .ok()
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_REFRESH_SECS)
            .max(30);
        let top_n = env::var("TOP_PICKS")
            .ok()
            .and_then(|val| val.trim().parse::<usize>().ok())
            .map(clamp_top_n)
            .unwrap_or(DEFAULT_TOP_PICKS);
        let team_names_path = env::var("TEAM_NAMES_PATH")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let export_dir = env::var("EXPORT_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            projections: ProjectionSource::from_env(),
            odds: OddsFetchConfig::from_env(),
            refresh: Duration::from_secs(refresh_secs),
            top_n,
            team_names_path,
            export_dir,
        }
    }

    /// Team map to hand to acquisition. A broken override file falls back to the
    /// built-in table and reports why.
    pub fn team_names(&self) -> (TeamNameMap, Option<String>) {
        let Some(path) = self.team_names_path.as_ref() else {
            return (TeamNameMap::mlb_default(), None);
        };
        match TeamNameMap::load_with_overrides(path) {
            Ok(map) => (map, None),
            Err(err) => (TeamNameMap::mlb_default(), Some(format!("{err:#}"))),
        }
    }
}

/// Keeps a requested pick count within what the sidebar can show.
pub fn clamp_top_n(n: usize) -> usize {
    n.clamp(1, MAX_TOP_PICKS)
}
