use mlb_edge::acquisition::{Acquisition, SourceStatus};
use mlb_edge::insights::{HeadToHeadNotes, NO_H2H_NOTE};
use mlb_edge::sample_slate::{seed_odds, seed_projections, SAMPLE_DATE};
use mlb_edge::state::{apply_delta, AppState, Delta};
use mlb_edge::valuation::{
    ConfidenceTier, MatchupKey, OddsEncoding, OddsLookup, ProjectionRecord, TotalPlay,
};

fn seeded_state() -> AppState {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetProjections(Acquisition::fresh_now(seed_projections())),
    );
    apply_delta(&mut state, Delta::SetOdds(Acquisition::fresh_now(seed_odds())));
    state
}

#[test]
fn seeded_slate_evaluates_every_row() {
    let state = seeded_state();
    assert_eq!(state.rows.len(), 7);
    assert_eq!(state.selected_date.as_deref(), Some(SAMPLE_DATE));
    assert!(state.rows.iter().all(|r| r.evaluation.total_line.is_some()));
    assert!(matches!(state.odds_status, Some(SourceStatus::Fresh { .. })));

    let nyy = state
        .rows
        .iter()
        .find(|r| r.record.away_team == "NY Yankees")
        .expect("yankees row");
    assert_eq!(nyy.evaluation.total_play, TotalPlay::Over);
    assert_eq!(nyy.evaluation.confidence_tier, ConfidenceTier::Low);
}

#[test]
fn top_picks_follow_tiers_and_limit() {
    let mut state = seeded_state();
    state.top_n = 2;
    let top = state.top_picks();
    assert_eq!(top.len(), 2);
    for pair in top.windows(2) {
        let (a, b) = (&pair[0].evaluation, &pair[1].evaluation);
        assert!(a.confidence_tier.score() >= b.confidence_tier.score());
    }
    let best = state
        .rows
        .iter()
        .map(|r| r.evaluation.confidence_tier.score())
        .max()
        .expect("rows present");
    assert_eq!(top[0].evaluation.confidence_tier.score(), best);
}

#[test]
fn team_filter_cycles_through_all_and_back() {
    let mut state = seeded_state();
    let teams = state.teams();
    assert_eq!(teams.len(), 14);
    assert_eq!(state.team_filter_label(), "All");

    state.cycle_team_filter();
    assert_eq!(state.team_filter.as_deref(), Some(teams[0].as_str()));
    let filtered = state.filtered_rows();
    assert_eq!(filtered.len(), 1);
    assert!(
        filtered[0].record.away_team == teams[0] || filtered[0].record.home_team == teams[0]
    );

    for _ in 1..teams.len() {
        state.cycle_team_filter();
    }
    assert_eq!(state.team_filter.as_deref(), teams.last().map(String::as_str));
    state.cycle_team_filter();
    assert_eq!(state.team_filter, None);
    assert_eq!(state.filtered_rows().len(), 7);
}

#[test]
fn date_cycle_filters_rows_and_drops_missing_team() {
    let mut records = seed_projections();
    records.push(ProjectionRecord::new("2025-07-01", "Houston", "Detroit", 4.1, 4.0));
    let mut state = AppState::new();
    apply_delta(&mut state, Delta::SetProjections(Acquisition::fresh_now(records)));

    assert_eq!(
        state.available_dates(),
        vec![SAMPLE_DATE.to_string(), "2025-07-01".to_string()]
    );
    assert_eq!(state.filtered_rows().len(), 7);

    state.team_filter = Some("Toronto".to_string());
    state.cycle_date();
    assert_eq!(state.selected_date.as_deref(), Some("2025-07-01"));
    assert_eq!(state.team_filter, None);
    let rows = state.filtered_rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].evaluation.total_play, TotalPlay::NotAvailable);

    state.cycle_date();
    assert_eq!(state.selected_date.as_deref(), Some(SAMPLE_DATE));
}

#[test]
fn selection_wraps_and_clamps() {
    let mut state = seeded_state();
    state.select_prev();
    assert_eq!(state.selected, 6);
    state.select_next();
    assert_eq!(state.selected, 0);

    state.selected = 6;
    state.team_filter = Some("Toronto".to_string());
    state.clamp_selection();
    assert_eq!(state.selected, 0);
    assert_eq!(
        state.selected_row().map(|r| r.record.key()),
        Some(MatchupKey::new("NY Yankees", "Toronto"))
    );
}

#[test]
fn unavailable_projections_keep_last_slate() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::SetProjections(Acquisition::unavailable("file missing")),
    );
    assert_eq!(state.rows.len(), 7);
    assert!(matches!(
        state.projections_status,
        Some(SourceStatus::Unavailable { .. })
    ));
}

#[test]
fn failed_odds_refresh_keeps_last_lookup_as_stale() {
    let mut state = seeded_state();
    let fetched_at = state
        .odds_status
        .as_ref()
        .and_then(SourceStatus::fetched_at)
        .expect("seeded odds have a fetch time");

    apply_delta(&mut state, Delta::SetOdds(Acquisition::unavailable("http 500")));
    assert_eq!(state.odds, seed_odds());
    assert!(state.rows.iter().all(|r| r.evaluation.total_line.is_some()));
    match &state.odds_status {
        Some(SourceStatus::Stale {
            fetched_at_unix,
            error,
        }) => {
            assert_eq!(*fetched_at_unix, fetched_at);
            assert_eq!(error, "http 500");
        }
        other => panic!("expected stale status, got {other:?}"),
    }
}

#[test]
fn odds_never_loaded_degrade_rows_to_not_available() {
    let mut state = AppState::new();
    apply_delta(
        &mut state,
        Delta::SetProjections(Acquisition::fresh_now(seed_projections())),
    );
    apply_delta(&mut state, Delta::SetOdds(Acquisition::unavailable("http 500")));
    assert!(state.odds.is_empty());
    assert!(matches!(
        state.odds_status,
        Some(SourceStatus::Unavailable { .. })
    ));
    assert!(state.rows.iter().all(|r| {
        r.evaluation.total_play == TotalPlay::NotAvailable
            && r.evaluation.confidence_tier == ConfidenceTier::Low
    }));
}

#[test]
fn stale_odds_still_evaluate() {
    let mut state = seeded_state();
    apply_delta(
        &mut state,
        Delta::SetOdds(Acquisition::Stale {
            data: seed_odds(),
            fetched_at_unix: 0,
            error: "timeout".to_string(),
        }),
    );
    assert!(state.rows.iter().all(|r| r.evaluation.total_line.is_some()));
    assert!(matches!(state.odds_status, Some(SourceStatus::Stale { .. })));
}

#[test]
fn decimal_state_keeps_encoding_when_odds_are_unavailable() {
    let mut state = AppState::with_settings(OddsEncoding::Decimal, 3);
    apply_delta(&mut state, Delta::SetOdds(Acquisition::unavailable("offline")));
    assert_eq!(state.odds, OddsLookup::new(OddsEncoding::Decimal));

    let decimal = seed_odds().converted(OddsEncoding::Decimal);
    apply_delta(&mut state, Delta::SetOdds(Acquisition::fresh_now(decimal.clone())));
    apply_delta(&mut state, Delta::SetOdds(Acquisition::unavailable("offline")));
    assert_eq!(state.odds.encoding(), OddsEncoding::Decimal);
    assert_eq!(state.odds, decimal);
}

#[test]
fn notes_and_logs() {
    let mut state = seeded_state();
    apply_delta(&mut state, Delta::SetNotes(HeadToHeadNotes::seeded()));
    assert_ne!(
        state.notes.note_for(&MatchupKey::new("NY Yankees", "Toronto")),
        NO_H2H_NOTE
    );
    assert_eq!(
        state.notes.note_for(&MatchupKey::new("Toronto", "NY Yankees")),
        NO_H2H_NOTE
    );

    for idx in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] line {idx}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.back().map(String::as_str), Some("[INFO] line 249"));
}
