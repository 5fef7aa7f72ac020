use std::collections::HashMap;
use std::fmt;

use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const AMERICAN_GOOD_ABOVE: i32 = 130;
const AMERICAN_BAD_BELOW: i32 = -170;
const DECIMAL_GOOD_AT: f64 = 2.3;
const DECIMAL_BAD_AT: f64 = 1.3;

const HIGH_TIER_GAP: f64 = 1.0;
const MEDIUM_TIER_GAP: f64 = 0.5;

/// One scheduled matchup with projected runs for each side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRecord {
    pub date: String,
    pub away_team: String,
    pub home_team: String,
    pub away_runs: f64,
    pub home_runs: f64,
    #[serde(default)]
    pub away_pitcher: Option<String>,
    #[serde(default)]
    pub home_pitcher: Option<String>,
}

impl ProjectionRecord {
    pub fn new(
        date: impl Into<String>,
        away_team: impl Into<String>,
        home_team: impl Into<String>,
        away_runs: f64,
        home_runs: f64,
    ) -> Self {
        Self {
            date: date.into(),
            away_team: away_team.into(),
            home_team: home_team.into(),
            away_runs,
            home_runs,
            away_pitcher: None,
            home_pitcher: None,
        }
    }

    pub fn key(&self) -> MatchupKey {
        MatchupKey::new(&self.away_team, &self.home_team)
    }

    /// Checks the invariants the valuator relies on. Called by acquisition code,
    /// never by the valuator itself.
    pub fn validate(&self) -> Result<()> {
        let away = self.away_team.trim();
        let home = self.home_team.trim();
        if away.is_empty() || home.is_empty() {
            return Err(anyhow::anyhow!("matchup on {} has an empty team", self.date));
        }
        if away == home {
            return Err(anyhow::anyhow!("{away} cannot play itself on {}", self.date));
        }
        for (side, runs) in [("away", self.away_runs), ("home", self.home_runs)] {
            if !runs.is_finite() || runs < 0.0 {
                return Err(anyhow::anyhow!(
                    "{away} @ {home}: {side} runs must be a non-negative number, got {runs}"
                ));
            }
        }
        Ok(())
    }
}

/// Odds key for a matchup. Order-sensitive: (away, home) exactly as scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatchupKey {
    away: String,
    home: String,
}

impl MatchupKey {
    pub fn new(away: &str, home: &str) -> Self {
        Self {
            away: away.trim().to_string(),
            home: home.trim().to_string(),
        }
    }
}

impl fmt::Display for MatchupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.away, self.home)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OddsEncoding {
    American,
    Decimal,
}

impl OddsEncoding {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "american" | "us" => Some(Self::American),
            "decimal" | "eu" => Some(Self::Decimal),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::American => "american",
            Self::Decimal => "decimal",
        }
    }
}

/// A moneyline price tagged with its encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "price", rename_all = "lowercase")]
pub enum PricedOdds {
    American(i32),
    Decimal(f64),
}

impl PricedOdds {
    /// Interprets a raw provider price in the given encoding.
    pub fn from_raw(encoding: OddsEncoding, price: f64) -> Option<Self> {
        let priced = match encoding {
            OddsEncoding::American => Self::American(price.round() as i32),
            OddsEncoding::Decimal => Self::Decimal(price),
        };
        priced.is_valid().then_some(priced)
    }

    pub fn encoding(&self) -> OddsEncoding {
        match self {
            Self::American(_) => OddsEncoding::American,
            Self::Decimal(_) => OddsEncoding::Decimal,
        }
    }

    pub fn is_valid(&self) -> bool {
        match *self {
            Self::American(price) => price.unsigned_abs() >= 100,
            Self::Decimal(price) => price.is_finite() && price >= 1.0,
        }
    }

    pub fn to_decimal(&self) -> f64 {
        match *self {
            Self::American(price) if price > 0 => 1.0 + price as f64 / 100.0,
            Self::American(price) => 1.0 + 100.0 / (price as f64).abs(),
            Self::Decimal(price) => price,
        }
    }

    pub fn to_encoding(&self, encoding: OddsEncoding) -> Option<Self> {
        if self.encoding() == encoding {
            return Some(*self);
        }
        let decimal = self.to_decimal();
        match encoding {
            OddsEncoding::Decimal => Some(Self::Decimal(decimal)),
            OddsEncoding::American => {
                if !decimal.is_finite() || decimal <= 1.0 {
                    return None;
                }
                let american = if decimal >= 2.0 {
                    ((decimal - 1.0) * 100.0).round()
                } else {
                    -(100.0 / (decimal - 1.0)).round()
                };
                Some(Self::American(american as i32))
            }
        }
    }
}

impl fmt::Display for PricedOdds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::American(price) => write!(f, "{price:+}"),
            Self::Decimal(price) => write!(f, "{price:.2}"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OddsEntry {
    pub total_line: Option<f64>,
    pub moneyline: HashMap<String, PricedOdds>,
}

/// Odds for one refresh, keyed by [`MatchupKey`]. All prices share one encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct OddsLookup {
    encoding: OddsEncoding,
    entries: HashMap<MatchupKey, OddsEntry>,
}

impl OddsLookup {
    pub fn new(encoding: OddsEncoding) -> Self {
        Self {
            encoding,
            entries: HashMap::new(),
        }
    }

    pub fn encoding(&self) -> OddsEncoding {
        self.encoding
    }

    pub fn insert(&mut self, key: MatchupKey, entry: OddsEntry) -> Result<()> {
        for (team, price) in &entry.moneyline {
            if price.encoding() != self.encoding {
                return Err(anyhow::anyhow!(
                    "{key}: {team} priced as {} in a {} lookup",
                    price.encoding().as_str(),
                    self.encoding.as_str()
                ));
            }
            if !price.is_valid() {
                return Err(anyhow::anyhow!("{key}: invalid price {price} for {team}"));
            }
        }
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn get(&self, key: &MatchupKey) -> Option<&OddsEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &MatchupKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-prices every entry into another encoding. Prices that cannot be expressed
    /// are dropped.
    pub fn converted(&self, encoding: OddsEncoding) -> Self {
        if encoding == self.encoding {
            return self.clone();
        }
        let entries = self
            .entries
            .iter()
            .map(|(key, entry)| {
                let moneyline = entry
                    .moneyline
                    .iter()
                    .filter_map(|(team, price)| {
                        price.to_encoding(encoding).map(|p| (team.clone(), p))
                    })
                    .collect();
                (
                    key.clone(),
                    OddsEntry {
                        total_line: entry.total_line,
                        moneyline,
                    },
                )
            })
            .collect();
        Self { encoding, entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalPlay {
    Over,
    Under,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl TotalPlay {
    pub fn label(self) -> &'static str {
        match self {
            Self::Over => "Over",
            Self::Under => "Under",
            Self::NotAvailable => "N/A",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoneylineValue {
    Good,
    Bad,
    Neutral,
}

impl MoneylineValue {
    pub fn classify(price: Option<PricedOdds>) -> Self {
        match price {
            None => Self::Neutral,
            Some(PricedOdds::American(p)) if p > AMERICAN_GOOD_ABOVE => Self::Good,
            Some(PricedOdds::American(p)) if p < AMERICAN_BAD_BELOW => Self::Bad,
            Some(PricedOdds::American(_)) => Self::Neutral,
            Some(PricedOdds::Decimal(p)) if p >= DECIMAL_GOOD_AT => Self::Good,
            Some(PricedOdds::Decimal(p)) if p <= DECIMAL_BAD_AT => Self::Bad,
            Some(PricedOdds::Decimal(_)) => Self::Neutral,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Good => "GOOD",
            Self::Bad => "BAD",
            Self::Neutral => "NEUTRAL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// Tier for the absolute gap between projection and line. Lower bounds are inclusive.
    pub fn from_gap(gap: f64) -> Self {
        if gap >= HIGH_TIER_GAP {
            Self::High
        } else if gap >= MEDIUM_TIER_GAP {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn units(self) -> f64 {
        match self {
            Self::High => 2.0,
            Self::Medium => 1.0,
            Self::Low => 0.5,
        }
    }

    pub fn score(self) -> u8 {
        match self {
            Self::High => 3,
            Self::Medium => 2,
            Self::Low => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "2U",
            Self::Medium => "1U",
            Self::Low => "0.5U",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchupEvaluation {
    pub total_projection: f64,
    pub total_line: Option<f64>,
    pub total_play: TotalPlay,
    pub away_moneyline: Option<PricedOdds>,
    pub moneyline_value: MoneylineValue,
    pub confidence_tier: ConfidenceTier,
    pub line_gap: Option<f64>,
}

/// Values one matchup against the current odds. Missing odds never fail: they
/// surface as `N/A`, `NEUTRAL` and the lowest tier.
pub fn evaluate(record: &ProjectionRecord, odds: &OddsLookup) -> MatchupEvaluation {
    let total_projection = record.away_runs + record.home_runs;
    let entry = odds.get(&record.key());

    let total_line = entry
        .and_then(|e| e.total_line)
        .filter(|line| line.is_finite());
    let total_play = match total_line {
        Some(line) if total_projection > line => TotalPlay::Over,
        Some(_) => TotalPlay::Under,
        None => TotalPlay::NotAvailable,
    };

    let away_moneyline = entry.and_then(|e| e.moneyline.get(record.away_team.trim()).copied());
    let moneyline_value = MoneylineValue::classify(away_moneyline);

    let line_gap = total_line.map(|line| (total_projection - line).abs());
    let confidence_tier = ConfidenceTier::from_gap(line_gap.unwrap_or(0.0));

    MatchupEvaluation {
        total_projection,
        total_line,
        total_play,
        away_moneyline,
        moneyline_value,
        confidence_tier,
        line_gap,
    }
}

/// Evaluates every record; output order matches input order.
pub fn evaluate_slate(records: &[ProjectionRecord], odds: &OddsLookup) -> Vec<MatchupEvaluation> {
    records.par_iter().map(|r| evaluate(r, odds)).collect()
}

#[cfg(test)]
mod tests {
    use super::{OddsEncoding, PricedOdds};

    #[test]
    fn american_to_decimal_both_signs() {
        assert!((PricedOdds::American(150).to_decimal() - 2.5).abs() < 1e-9);
        assert!((PricedOdds::American(-200).to_decimal() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn decimal_to_american_rounds_to_whole_price() {
        assert_eq!(
            PricedOdds::Decimal(2.4).to_encoding(OddsEncoding::American),
            Some(PricedOdds::American(140))
        );
        assert_eq!(
            PricedOdds::Decimal(1.5).to_encoding(OddsEncoding::American),
            Some(PricedOdds::American(-200))
        );
        assert_eq!(
            PricedOdds::Decimal(1.0).to_encoding(OddsEncoding::American),
            None
        );
    }

    #[test]
    fn from_raw_rejects_impossible_prices() {
        assert!(PricedOdds::from_raw(OddsEncoding::American, 50.0).is_none());
        assert!(PricedOdds::from_raw(OddsEncoding::Decimal, 0.9).is_none());
        assert_eq!(
            PricedOdds::from_raw(OddsEncoding::American, -110.0),
            Some(PricedOdds::American(-110))
        );
    }
}
