use std::cmp::Ordering;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::header::USER_AGENT;
use serde::Deserialize;

use crate::acquisition::Acquisition;
use crate::http_client::http_client;
use crate::odds_cache::{self, CachedOdds};
use crate::sample_slate;
use crate::team_names::TeamNameMap;
use crate::valuation::{MatchupKey, OddsEncoding, OddsEntry, OddsLookup, PricedOdds};

const ODDS_API_BASE: &str = "https://api.the-odds-api.com/v4/sports";
const DEFAULT_SPORT: &str = "baseball_mlb";
const DEFAULT_ODDS_PATH: &str = "odds.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OddsProvider {
    Sample,
    /// A saved The Odds API payload.
    File(PathBuf),
    TheOddsApi,
}

#[derive(Debug, Clone)]
pub struct OddsFetchConfig {
    pub provider: OddsProvider,
    pub encoding: OddsEncoding,
    pub api_key: Option<String>,
    pub regions: String,
    pub sport: String,
    pub cache_enabled: bool,
    pub cache_path: Option<PathBuf>,
}

impl OddsFetchConfig {
    pub fn from_env() -> Self {
        let provider = env::var("ODDS_PROVIDER")
            .unwrap_or_else(|_| "sample".to_string())
            .trim()
            .to_ascii_lowercase();
        let provider = match provider.as_str() {
            "theoddsapi" | "the-odds-api" => OddsProvider::TheOddsApi,
            "file" => OddsProvider::File(PathBuf::from(
                opt_env("ODDS_PATH").unwrap_or_else(|| DEFAULT_ODDS_PATH.to_string()),
            )),
            _ => OddsProvider::Sample,
        };
        let encoding = opt_env("ODDS_FORMAT")
            .and_then(|raw| OddsEncoding::parse(&raw))
            .unwrap_or(OddsEncoding::American);
        let regions = opt_env("ODDS_REGIONS")
            .unwrap_or_else(|| "us".to_string())
            .to_ascii_lowercase();
        let sport = opt_env("ODDS_SPORT").unwrap_or_else(|| DEFAULT_SPORT.to_string());

        Self {
            provider,
            encoding,
            api_key: opt_env("ODDS_API_KEY"),
            regions,
            sport,
            cache_enabled: env_bool("ODDS_CACHE", true),
            cache_path: odds_cache::default_cache_path(),
        }
    }

    pub fn provider_label(&self) -> String {
        match &self.provider {
            OddsProvider::Sample => "sample".to_string(),
            OddsProvider::File(path) => format!("file:{}", path.display()),
            OddsProvider::TheOddsApi => "theoddsapi".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OddsEvent {
    #[serde(default)]
    commence_time: Option<String>,
    home_team: String,
    away_team: String,
    #[serde(default)]
    bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsBookmaker {
    #[serde(default)]
    markets: Vec<OddsMarket>,
}

#[derive(Debug, Deserialize)]
struct OddsMarket {
    key: String,
    #[serde(default)]
    outcomes: Vec<OddsOutcome>,
}

#[derive(Debug, Deserialize)]
struct OddsOutcome {
    name: String,
    price: f64,
    #[serde(default)]
    point: Option<f64>,
}

/// Pulls odds from the configured provider. Network failures fall back to the last
/// cached payload before giving up.
pub fn fetch_odds(cfg: &OddsFetchConfig, names: &TeamNameMap) -> Acquisition<OddsLookup> {
    match &cfg.provider {
        OddsProvider::Sample => {
            Acquisition::fresh_now(sample_slate::seed_odds().converted(cfg.encoding))
        }
        OddsProvider::File(path) => match read_odds_file(path, cfg.encoding, names) {
            Ok((lookup, modified)) => Acquisition::Fresh {
                data: lookup,
                fetched_at_unix: modified,
            },
            Err(err) => Acquisition::unavailable(format!("{err:#}")),
        },
        OddsProvider::TheOddsApi => fetch_theoddsapi(cfg, names),
    }
}

fn fetch_theoddsapi(cfg: &OddsFetchConfig, names: &TeamNameMap) -> Acquisition<OddsLookup> {
    let live = fetch_odds_api_body(cfg).and_then(|body| {
        let lookup = parse_odds_api_json(&body, cfg.encoding, names)?;
        Ok((body, lookup))
    });

    match live {
        Ok((body, lookup)) => {
            let fetched_at_unix = Utc::now().timestamp();
            if cfg.cache_enabled
                && let Some(path) = cfg.cache_path.as_ref()
            {
                let cache = CachedOdds::new(cfg.encoding, &cfg.sport, fetched_at_unix, body);
                let _ = odds_cache::save_cached_odds(path, &cache);
            }
            Acquisition::Fresh {
                data: lookup,
                fetched_at_unix,
            }
        }
        Err(err) => stale_from_cache(cfg, names, format!("{err:#}")),
    }
}

fn stale_from_cache(
    cfg: &OddsFetchConfig,
    names: &TeamNameMap,
    error: String,
) -> Acquisition<OddsLookup> {
    if !cfg.cache_enabled {
        return Acquisition::unavailable(error);
    }
    let Some(cache) = cfg
        .cache_path
        .as_deref()
        .and_then(odds_cache::load_cached_odds)
    else {
        return Acquisition::unavailable(error);
    };
    if cache.encoding != cfg.encoding || cache.sport != cfg.sport {
        return Acquisition::unavailable(error);
    }
    match parse_odds_api_json(&cache.body, cfg.encoding, names) {
        Ok(lookup) => Acquisition::Stale {
            data: lookup,
            fetched_at_unix: cache.fetched_at_unix,
            error,
        },
        Err(_) => Acquisition::unavailable(error),
    }
}

/// Raw The Odds API response body for moneyline and totals markets.
pub fn fetch_odds_api_body(cfg: &OddsFetchConfig) -> Result<String> {
    let Some(api_key) = cfg.api_key.as_ref() else {
        return Err(anyhow::anyhow!("ODDS_API_KEY missing"));
    };

    let url = format!("{ODDS_API_BASE}/{}/odds", cfg.sport);
    let client = http_client()?;
    let resp = client
        .get(&url)
        .query(&[
            ("apiKey", api_key.as_str()),
            ("regions", cfg.regions.as_str()),
            ("markets", "h2h,totals"),
            ("oddsFormat", cfg.encoding.as_str()),
            ("dateFormat", "iso"),
        ])
        .header(USER_AGENT, "mlb-edge/0.1")
        .send()
        .context("odds request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading odds body")?;
    if !status.is_success() {
        let snippet = body
            .trim()
            .replace('\n', " ")
            .replace('\r', " ")
            .chars()
            .take(220)
            .collect::<String>();
        return Err(anyhow::anyhow!("odds http {}: {}", status, snippet));
    }
    Ok(body)
}

fn read_odds_file(
    path: &Path,
    encoding: OddsEncoding,
    names: &TeamNameMap,
) -> Result<(OddsLookup, i64)> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed reading odds from {}", path.display()))?;
    let lookup = parse_odds_api_json(&raw, encoding, names)?;
    let modified = fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(|t| DateTime::<Utc>::from(t).timestamp())
        .unwrap_or_else(|| Utc::now().timestamp());
    Ok((lookup, modified))
}

/// Builds a lookup from a The Odds API payload. Prices are read in `encoding`; the
/// total line and each moneyline are bookmaker medians. The first event for an
/// ordered (away, home) pair wins.
pub fn parse_odds_api_json(
    raw: &str,
    encoding: OddsEncoding,
    names: &TeamNameMap,
) -> Result<OddsLookup> {
    let mut lookup = OddsLookup::new(encoding);
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(lookup);
    }

    let mut events: Vec<OddsEvent> =
        serde_json::from_str(trimmed).context("invalid odds json")?;
    events.sort_by(|a, b| commence_ts(a).cmp(&commence_ts(b)));

    for event in &events {
        let away = names.canonical(&event.away_team);
        let home = names.canonical(&event.home_team);
        let key = MatchupKey::new(&away, &home);
        if lookup.contains(&key) {
            continue;
        }
        let Some(entry) = event_to_entry(event, &away, &home, encoding, names) else {
            continue;
        };
        lookup.insert(key, entry)?;
    }

    Ok(lookup)
}

fn event_to_entry(
    event: &OddsEvent,
    away: &str,
    home: &str,
    encoding: OddsEncoding,
    names: &TeamNameMap,
) -> Option<OddsEntry> {
    let mut book_totals = Vec::new();
    let mut book_away_decimal = Vec::new();
    let mut book_home_decimal = Vec::new();

    for bookmaker in &event.bookmakers {
        for market in &bookmaker.markets {
            if market.key.eq_ignore_ascii_case("totals") {
                if let Some(point) = market
                    .outcomes
                    .iter()
                    .find(|o| o.name.eq_ignore_ascii_case("over"))
                    .and_then(|o| o.point)
                    .filter(|p| p.is_finite())
                {
                    book_totals.push(point);
                }
            } else if market.key.eq_ignore_ascii_case("h2h") {
                for outcome in &market.outcomes {
                    let Some(price) = PricedOdds::from_raw(encoding, outcome.price) else {
                        continue;
                    };
                    let team = names.canonical(&outcome.name);
                    if team == away {
                        book_away_decimal.push(price.to_decimal());
                    } else if team == home {
                        book_home_decimal.push(price.to_decimal());
                    }
                }
            }
        }
    }

    let mut moneyline = HashMap::new();
    for (team, prices) in [(away, &book_away_decimal), (home, &book_home_decimal)] {
        if let Some(price) = median_f64(prices)
            .and_then(|d| PricedOdds::Decimal(d).to_encoding(encoding))
            .filter(PricedOdds::is_valid)
        {
            moneyline.insert(team.to_string(), price);
        }
    }
    let total_line = median_f64(&book_totals);

    if total_line.is_none() && moneyline.is_empty() {
        return None;
    }
    Some(OddsEntry {
        total_line,
        moneyline,
    })
}

fn commence_ts(event: &OddsEvent) -> i64 {
    event
        .commence_time
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.timestamp())
        .unwrap_or(i64::MAX)
}

fn opt_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| {
            let t = v.trim().to_ascii_lowercase();
            !(t.is_empty() || t == "0" || t == "false" || t == "off" || t == "no")
        })
        .unwrap_or(default)
}

fn median_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
