use std::cmp::Reverse;

use crate::valuation::{ConfidenceTier, MatchupEvaluation};

pub const DEFAULT_TOP_PICKS: usize = 3;

/// Anything that can be ranked by staking tier.
pub trait TierRanked {
    fn confidence_tier(&self) -> Option<ConfidenceTier>;
}

impl TierRanked for MatchupEvaluation {
    fn confidence_tier(&self) -> Option<ConfidenceTier> {
        Some(self.confidence_tier)
    }
}

impl<T: TierRanked> TierRanked for &T {
    fn confidence_tier(&self) -> Option<ConfidenceTier> {
        (**self).confidence_tier()
    }
}

/// Returns up to `n` items, highest tier first. Items sharing a tier keep their
/// input order; items without a tier are left out.
pub fn select_top<T: TierRanked>(items: &[T], n: usize) -> Vec<&T> {
    let mut ranked: Vec<(u8, &T)> = items
        .iter()
        .filter_map(|item| item.confidence_tier().map(|tier| (tier.score(), item)))
        .collect();
    // sort_by_key is stable
    ranked.sort_by_key(|(score, _)| Reverse(*score));
    ranked.into_iter().take(n).map(|(_, item)| item).collect()
}

#[cfg(test)]
mod tests {
    use super::{TierRanked, select_top};
    use crate::valuation::ConfidenceTier;

    struct Labelled(&'static str);

    impl TierRanked for Labelled {
        fn confidence_tier(&self) -> Option<ConfidenceTier> {
            [ConfidenceTier::High, ConfidenceTier::Medium, ConfidenceTier::Low]
                .into_iter()
                .find(|tier| tier.label() == self.0)
        }
    }

    #[test]
    fn unknown_labels_are_skipped() {
        let items = [Labelled("1U"), Labelled("??"), Labelled("2U"), Labelled("")];
        let top = select_top(&items, 5);
        let labels: Vec<&str> = top.iter().map(|l| l.0).collect();
        assert_eq!(labels, vec!["2U", "1U"]);
    }

    #[test]
    fn zero_picks_is_empty() {
        let items = [Labelled("2U")];
        assert!(select_top(&items, 0).is_empty());
    }
}
