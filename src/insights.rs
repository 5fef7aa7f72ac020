use std::collections::HashMap;

use crate::sample_slate;
use crate::valuation::MatchupKey;

pub const NO_H2H_NOTE: &str = "No recent H2H data";

/// Short head-to-head blurbs shown next to each matchup.
#[derive(Debug, Clone, Default)]
pub struct HeadToHeadNotes {
    notes: HashMap<MatchupKey, String>,
}

impl HeadToHeadNotes {
    pub fn seeded() -> Self {
        Self::from_pairs(sample_slate::seed_head_to_head())
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (MatchupKey, String)>) -> Self {
        Self {
            notes: pairs.into_iter().collect(),
        }
    }

    pub fn note_for(&self, key: &MatchupKey) -> &str {
        self.notes
            .get(key)
            .map(String::as_str)
            .unwrap_or(NO_H2H_NOTE)
    }
}

#[cfg(test)]
mod tests {
    use super::{HeadToHeadNotes, NO_H2H_NOTE};
    use crate::valuation::MatchupKey;

    #[test]
    fn reversed_pair_has_no_note() {
        let notes = HeadToHeadNotes::seeded();
        assert!(
            notes
                .note_for(&MatchupKey::new("NY Yankees", "Toronto"))
                .contains("NYY 7-3")
        );
        assert_eq!(
            notes.note_for(&MatchupKey::new("Toronto", "NY Yankees")),
            NO_H2H_NOTE
        );
    }
}
