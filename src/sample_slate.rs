use std::collections::HashMap;

use crate::valuation::{
    MatchupKey, OddsEncoding, OddsEntry, OddsLookup, PricedOdds, ProjectionRecord,
};

pub const SAMPLE_DATE: &str = "2025-06-30";

pub fn seed_projections() -> Vec<ProjectionRecord> {
    [
        ("St. Louis", "Pittsburgh", "Erick Fedde", "Andrew Heaney", 4.29, 4.07),
        ("NY Yankees", "Toronto", "Carlos Rodon", "Max Scherzer", 4.82, 3.98),
        ("Cincinnati", "Boston", "Chase Burns", "Garrett Crochet", 3.86, 4.72),
        ("Sacramento", "Tampa Bay", "Jacob Lopez", "Drew Rasmussen", 3.56, 4.72),
        ("Baltimore", "Texas", "Trevor Rogers", "Patrick Corbin", 3.50, 3.57),
        ("Kansas City", "Seattle", "Michael Wacha", "George Kirby", 4.26, 3.72),
        ("SF Giants", "Arizona", "Logan Webb", "Ryne Nelson", 4.58, 3.96),
    ]
    .into_iter()
    .map(|(away, home, away_sp, home_sp, away_runs, home_runs)| {
        let mut record = ProjectionRecord::new(SAMPLE_DATE, away, home, away_runs, home_runs);
        record.away_pitcher = Some(away_sp.to_string());
        record.home_pitcher = Some(home_sp.to_string());
        record
    })
    .collect()
}

/// Seeded book, American prices.
pub fn seed_odds() -> OddsLookup {
    let rows: [(&str, &str, f64, i32, i32); 7] = [
        ("St. Louis", "Pittsburgh", 9.0, -105, -105),
        ("NY Yankees", "Toronto", 8.5, -140, 120),
        ("Cincinnati", "Boston", 8.0, 150, -170),
        ("Sacramento", "Tampa Bay", 8.0, 145, -165),
        ("Baltimore", "Texas", 8.0, -110, -110),
        ("Kansas City", "Seattle", 7.5, 125, -130),
        ("SF Giants", "Arizona", 8.5, -135, 115),
    ];

    let mut lookup = OddsLookup::new(OddsEncoding::American);
    for (away, home, total, away_ml, home_ml) in rows {
        let moneyline = HashMap::from([
            (away.to_string(), PricedOdds::American(away_ml)),
            (home.to_string(), PricedOdds::American(home_ml)),
        ]);
        // every seeded price is a valid American price
        let _ = lookup.insert(
            MatchupKey::new(away, home),
            OddsEntry {
                total_line: Some(total),
                moneyline,
            },
        );
    }
    lookup
}

pub fn seed_head_to_head() -> Vec<(MatchupKey, String)> {
    [
        ("St. Louis", "Pittsburgh", "Last 10: STL 6-4 | Avg Score: 5.1 - 4.6"),
        ("NY Yankees", "Toronto", "Last 10: NYY 7-3 | Avg Score: 6.0 - 3.5"),
        ("Cincinnati", "Boston", "Last 10: BOS 5-5 | Avg Score: 4.4 - 4.1"),
        ("Sacramento", "Tampa Bay", "Last 10: TB 8-2 | Avg Score: 5.8 - 3.0"),
        ("Baltimore", "Texas", "Last 10: TEX 6-4 | Avg Score: 4.9 - 4.6"),
        ("Kansas City", "Seattle", "Last 10: SEA 6-4 | Avg Score: 4.5 - 3.9"),
        ("SF Giants", "Arizona", "Last 10: ARI 6-4 | Avg Score: 5.0 - 4.5"),
    ]
    .into_iter()
    .map(|(away, home, note)| (MatchupKey::new(away, home), note.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::{seed_odds, seed_projections};

    #[test]
    fn every_seeded_matchup_has_odds() {
        let odds = seed_odds();
        assert_eq!(odds.len(), 7);
        for record in seed_projections() {
            assert!(odds.contains(&record.key()), "missing odds for {}", record.key());
            assert!(record.validate().is_ok());
        }
    }
}
