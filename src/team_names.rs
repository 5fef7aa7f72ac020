use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const DEFAULT_MLB_NAMES: &[(&str, &str)] = &[
    ("Arizona Diamondbacks", "Arizona"),
    ("Atlanta Braves", "Atlanta"),
    ("Baltimore Orioles", "Baltimore"),
    ("Boston Red Sox", "Boston"),
    ("Chicago Cubs", "Chicago Cubs"),
    ("Chicago White Sox", "Chicago Sox"),
    ("Cincinnati Reds", "Cincinnati"),
    ("Cleveland Guardians", "Cleveland"),
    ("Colorado Rockies", "Colorado"),
    ("Detroit Tigers", "Detroit"),
    ("Houston Astros", "Houston"),
    ("Kansas City Royals", "Kansas City"),
    ("Los Angeles Angels", "LA Angels"),
    ("Los Angeles Dodgers", "LA Dodgers"),
    ("Miami Marlins", "Miami"),
    ("Milwaukee Brewers", "Milwaukee"),
    ("Minnesota Twins", "Minnesota"),
    ("New York Mets", "NY Mets"),
    ("New York Yankees", "NY Yankees"),
    ("Athletics", "Sacramento"),
    ("Oakland Athletics", "Sacramento"),
    ("Philadelphia Phillies", "Philadelphia"),
    ("Pittsburgh Pirates", "Pittsburgh"),
    ("San Diego Padres", "San Diego"),
    ("San Francisco Giants", "SF Giants"),
    ("Seattle Mariners", "Seattle"),
    ("St. Louis Cardinals", "St. Louis"),
    ("St Louis Cardinals", "St. Louis"),
    ("Tampa Bay Rays", "Tampa Bay"),
    ("Texas Rangers", "Texas"),
    ("Toronto Blue Jays", "Toronto"),
    ("Washington Nationals", "Washington"),
];

/// Maps provider team names onto the identifiers projections and odds are keyed by.
#[derive(Debug, Clone, Default)]
pub struct TeamNameMap {
    aliases: HashMap<String, String>,
}

impl TeamNameMap {
    pub fn mlb_default() -> Self {
        let mut map = Self::default();
        for (provider, canonical) in DEFAULT_MLB_NAMES {
            map.insert(provider, canonical);
        }
        map
    }

    /// Default table extended with a JSON object of `"provider name": "canonical"`.
    pub fn load_with_overrides(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed reading team names from {}", path.display()))?;
        let overrides: HashMap<String, String> =
            serde_json::from_str(&raw).context("team names file must be a JSON object")?;
        let mut map = Self::mlb_default();
        for (provider, canonical) in &overrides {
            map.insert(provider, canonical);
        }
        Ok(map)
    }

    pub fn insert(&mut self, provider: &str, canonical: &str) {
        let canonical = canonical.trim();
        if canonical.is_empty() {
            return;
        }
        self.aliases
            .insert(alias_key(provider), canonical.to_string());
        // canonical names resolve to themselves
        self.aliases
            .entry(alias_key(canonical))
            .or_insert_with(|| canonical.to_string());
    }

    pub fn canonical(&self, name: &str) -> String {
        let trimmed = name.trim();
        self.aliases
            .get(&alias_key(trimmed))
            .cloned()
            .unwrap_or_else(|| trimmed.to_string())
    }
}

fn alias_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::TeamNameMap;

    #[test]
    fn full_names_map_to_short_identifiers() {
        let map = TeamNameMap::mlb_default();
        assert_eq!(map.canonical("New York Yankees"), "NY Yankees");
        assert_eq!(map.canonical("  toronto   blue jays "), "Toronto");
        assert_eq!(map.canonical("Athletics"), "Sacramento");
    }

    #[test]
    fn canonical_and_unknown_names_pass_through() {
        let map = TeamNameMap::mlb_default();
        assert_eq!(map.canonical("NY Yankees"), "NY Yankees");
        assert_eq!(map.canonical(" Nowhere Nine "), "Nowhere Nine");
    }
}
