use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::valuation::OddsEncoding;

const CACHE_VERSION: u32 = 1;
const CACHE_DIR: &str = "mlb_edge";
const CACHE_FILE: &str = "odds_cache.json";

/// Last good odds payload, kept verbatim so it can be re-parsed with the current
/// team map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedOdds {
    pub version: u32,
    pub encoding: OddsEncoding,
    pub sport: String,
    pub fetched_at_unix: i64,
    pub body: String,
}

impl CachedOdds {
    pub fn new(encoding: OddsEncoding, sport: &str, fetched_at_unix: i64, body: String) -> Self {
        Self {
            version: CACHE_VERSION,
            encoding,
            sport: sport.to_string(),
            fetched_at_unix,
            body,
        }
    }
}

pub fn load_cached_odds(path: &Path) -> Option<CachedOdds> {
    let raw = fs::read_to_string(path).ok()?;
    let cache = serde_json::from_str::<CachedOdds>(&raw).ok()?;
    if cache.version != CACHE_VERSION {
        return None;
    }
    Some(cache)
}

pub fn save_cached_odds(path: &Path, cache: &CachedOdds) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create cache dir {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(cache).context("serialize odds cache")?;
    fs::write(&tmp, json).context("write odds cache")?;
    fs::rename(&tmp, path).context("swap odds cache")?;
    Ok(())
}

pub fn default_cache_path() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR).join(CACHE_FILE));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(
        PathBuf::from(home)
            .join(".cache")
            .join(CACHE_DIR)
            .join(CACHE_FILE),
    )
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{CachedOdds, load_cached_odds, save_cached_odds};
    use crate::valuation::OddsEncoding;

    fn scratch_path(tag: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        std::env::temp_dir()
            .join(format!("mlb_edge_cache_{tag}_{nanos}"))
            .join("odds_cache.json")
    }

    #[test]
    fn cache_survives_a_save_and_load() {
        let path = scratch_path("save");
        let cache = CachedOdds::new(OddsEncoding::Decimal, "baseball_mlb", 42, "[]".to_string());
        save_cached_odds(&path, &cache).expect("save should work");
        let loaded = load_cached_odds(&path).expect("cache should load");
        assert_eq!(loaded.encoding, OddsEncoding::Decimal);
        assert_eq!(loaded.fetched_at_unix, 42);
        assert_eq!(loaded.body, "[]");
        let _ = std::fs::remove_dir_all(path.parent().expect("has parent"));
    }

    #[test]
    fn wrong_version_is_ignored() {
        let path = scratch_path("version");
        let mut cache = CachedOdds::new(OddsEncoding::American, "baseball_mlb", 1, "[]".into());
        cache.version = 0;
        save_cached_odds(&path, &cache).expect("save should work");
        assert!(load_cached_odds(&path).is_none());
        let _ = std::fs::remove_dir_all(path.parent().expect("has parent"));
    }
}
