use mlb_edge::top_picks::{select_top, TierRanked, DEFAULT_TOP_PICKS};
use mlb_edge::valuation::{ConfidenceTier, MatchupEvaluation, MoneylineValue, TotalPlay};

fn evaluation(tier: ConfidenceTier, projection: f64) -> MatchupEvaluation {
    MatchupEvaluation {
        total_projection: projection,
        total_line: Some(8.5),
        total_play: TotalPlay::Over,
        away_moneyline: None,
        moneyline_value: MoneylineValue::Neutral,
        confidence_tier: tier,
        line_gap: Some((projection - 8.5).abs()),
    }
}

#[test]
fn three_highs_come_back_in_input_order() {
    use ConfidenceTier::{High, Low, Medium};
    let tiers = [Low, High, Medium, High, Low, Medium, High];
    let evals: Vec<MatchupEvaluation> = tiers
        .iter()
        .enumerate()
        .map(|(idx, tier)| evaluation(*tier, idx as f64))
        .collect();

    let top = select_top(&evals, DEFAULT_TOP_PICKS);
    assert_eq!(top.len(), 3);
    assert!(top.iter().all(|e| e.confidence_tier == High));
    let positions: Vec<f64> = top.iter().map(|e| e.total_projection).collect();
    assert_eq!(positions, vec![1.0, 3.0, 6.0]);
}

#[test]
fn ties_within_a_tier_keep_order_past_the_highs() {
    use ConfidenceTier::{High, Low, Medium};
    let evals: Vec<MatchupEvaluation> = [Medium, Low, High, Medium]
        .iter()
        .enumerate()
        .map(|(idx, tier)| evaluation(*tier, idx as f64))
        .collect();

    let top = select_top(&evals, 3);
    let positions: Vec<f64> = top.iter().map(|e| e.total_projection).collect();
    assert_eq!(positions, vec![2.0, 0.0, 3.0]);
}

#[test]
fn short_input_returns_everything() {
    let evals = vec![
        evaluation(ConfidenceTier::Low, 0.0),
        evaluation(ConfidenceTier::Medium, 1.0),
    ];
    let top = select_top(&evals, 5);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].confidence_tier, ConfidenceTier::Medium);
    assert!(select_top::<MatchupEvaluation>(&[], 3).is_empty());
}

struct Graded(Option<ConfidenceTier>, &'static str);

impl TierRanked for Graded {
    fn confidence_tier(&self) -> Option<ConfidenceTier> {
        self.0
    }
}

#[test]
fn items_without_a_tier_are_excluded() {
    let items = [
        Graded(None, "a"),
        Graded(Some(ConfidenceTier::Low), "b"),
        Graded(None, "c"),
        Graded(Some(ConfidenceTier::High), "d"),
    ];
    let names: Vec<&str> = select_top(&items, 10).iter().map(|g| g.1).collect();
    assert_eq!(names, vec!["d", "b"]);
}
