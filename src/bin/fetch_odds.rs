use std::fs;
use std::path::PathBuf;

use anyhow::Context;

use mlb_edge::odds_fetch::{self, OddsFetchConfig};
use mlb_edge::team_names::TeamNameMap;

// Saves one raw The Odds API payload so ODDS_PROVIDER=file can replay it offline.
fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let out = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("odds.json"));

    let cfg = OddsFetchConfig::from_env();
    let body = odds_fetch::fetch_odds_api_body(&cfg)?;

    let lookup = odds_fetch::parse_odds_api_json(&body, cfg.encoding, &TeamNameMap::mlb_default())
        .context("payload did not parse as odds")?;

    fs::write(&out, &body).with_context(|| format!("write {}", out.display()))?;
    println!(
        "Saved {} markets ({}) to {}",
        lookup.len(),
        cfg.encoding.as_str(),
        out.display()
    );
    Ok(())
}
