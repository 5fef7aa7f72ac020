use std::collections::{HashSet, VecDeque};

use crate::acquisition::{Acquisition, SourceStatus};
use crate::insights::HeadToHeadNotes;
use crate::top_picks::{DEFAULT_TOP_PICKS, TierRanked, select_top};
use crate::valuation::{
    ConfidenceTier, MatchupEvaluation, OddsEncoding, OddsLookup, ProjectionRecord,
    evaluate_slate,
};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct SlateRow {
    pub record: ProjectionRecord,
    pub evaluation: MatchupEvaluation,
}

impl TierRanked for SlateRow {
    fn confidence_tier(&self) -> Option<ConfidenceTier> {
        Some(self.evaluation.confidence_tier)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderCommand {
    Refresh,
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetProjections(Acquisition<Vec<ProjectionRecord>>),
    SetOdds(Acquisition<OddsLookup>),
    SetNotes(HeadToHeadNotes),
    Log(String),
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub records: Vec<ProjectionRecord>,
    pub odds: OddsLookup,
    pub notes: HeadToHeadNotes,
    pub rows: Vec<SlateRow>,
    pub projections_status: Option<SourceStatus>,
    pub odds_status: Option<SourceStatus>,
    pub selected_date: Option<String>,
    /// `None` shows every team.
    pub team_filter: Option<String>,
    pub selected: usize,
    pub top_n: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::with_settings(OddsEncoding::American, DEFAULT_TOP_PICKS)
    }

    pub fn with_settings(encoding: OddsEncoding, top_n: usize) -> Self {
        Self {
            records: Vec::new(),
            odds: OddsLookup::new(encoding),
            notes: HeadToHeadNotes::default(),
            rows: Vec::new(),
            projections_status: None,
            odds_status: None,
            selected_date: None,
            team_filter: None,
            selected: 0,
            top_n,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    /// Re-runs the valuator over every record against the current odds.
    pub fn reevaluate(&mut self) {
        let evaluations = evaluate_slate(&self.records, &self.odds);
        self.rows = self
            .records
            .iter()
            .cloned()
            .zip(evaluations)
            .map(|(record, evaluation)| SlateRow { record, evaluation })
            .collect();
        self.ensure_date_selected();
        self.clamp_selection();
    }

    /// Distinct dates in first-seen order.
    pub fn available_dates(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.records
            .iter()
            .filter(|r| seen.insert(r.date.as_str()))
            .map(|r| r.date.clone())
            .collect()
    }

    /// Distinct teams playing on the selected date, sorted.
    pub fn teams(&self) -> Vec<String> {
        let mut teams: Vec<String> = self
            .records
            .iter()
            .filter(|r| self.matches_date(r))
            .flat_map(|r| [r.away_team.clone(), r.home_team.clone()])
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        teams.sort();
        teams
    }

    pub fn cycle_date(&mut self) {
        let dates = self.available_dates();
        if dates.is_empty() {
            self.selected_date = None;
            return;
        }
        let next = match self
            .selected_date
            .as_ref()
            .and_then(|d| dates.iter().position(|x| x == d))
        {
            Some(pos) => (pos + 1) % dates.len(),
            None => 0,
        };
        self.selected_date = Some(dates[next].clone());
        let team_missing = self
            .team_filter
            .as_ref()
            .is_some_and(|team| !self.teams().contains(team));
        if team_missing {
            self.team_filter = None;
        }
        self.selected = 0;
        self.push_log(format!("[INFO] Date: {}", dates[next]));
    }

    /// All -> first team -> ... -> last team -> All.
    pub fn cycle_team_filter(&mut self) {
        let teams = self.teams();
        self.team_filter = match self
            .team_filter
            .as_ref()
            .and_then(|t| teams.iter().position(|x| x == t))
        {
            None => teams.first().cloned(),
            Some(pos) if pos + 1 < teams.len() => Some(teams[pos + 1].clone()),
            Some(_) => None,
        };
        self.selected = 0;
        self.push_log(format!("[INFO] Team filter: {}", self.team_filter_label()));
    }

    pub fn team_filter_label(&self) -> &str {
        self.team_filter.as_deref().unwrap_or("All")
    }

    pub fn filtered_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| self.matches_date(&row.record) && self.matches_team(&row.record))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_rows(&self) -> Vec<&SlateRow> {
        self.filtered_indices()
            .into_iter()
            .filter_map(|idx| self.rows.get(idx))
            .collect()
    }

    pub fn top_picks(&self) -> Vec<&SlateRow> {
        let filtered = self.filtered_rows();
        select_top(&filtered, self.top_n)
            .into_iter()
            .copied()
            .collect()
    }

    pub fn selected_row(&self) -> Option<&SlateRow> {
        self.filtered_rows().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % total;
    }

    pub fn select_prev(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
            return;
        }
        if self.selected == 0 {
            self.selected = total - 1;
        } else {
            self.selected -= 1;
        }
    }

    pub fn clamp_selection(&mut self) {
        let total = self.filtered_indices().len();
        if total == 0 {
            self.selected = 0;
        } else if self.selected >= total {
            self.selected = total - 1;
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    fn ensure_date_selected(&mut self) {
        let dates = self.available_dates();
        let keep = self
            .selected_date
            .as_ref()
            .is_some_and(|d| dates.contains(d));
        if !keep {
            self.selected_date = dates.first().cloned();
        }
    }

    fn matches_date(&self, record: &ProjectionRecord) -> bool {
        match self.selected_date.as_deref() {
            Some(date) => record.date == date,
            None => true,
        }
    }

    fn matches_team(&self, record: &ProjectionRecord) -> bool {
        match self.team_filter.as_deref() {
            Some(team) => record.away_team == team || record.home_team == team,
            None => true,
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetProjections(acquisition) => {
            let (records, status) = acquisition.into_parts();
            // keep the last good slate when projections are unavailable
            if let Some(records) = records {
                state.records = records;
            }
            state.projections_status = Some(status);
            state.reevaluate();
        }
        Delta::SetOdds(acquisition) => {
            let (lookup, status) = acquisition.into_parts();
            match lookup {
                Some(lookup) => {
                    state.odds = lookup;
                    state.odds_status = Some(status);
                }
                // a failed refresh keeps the last good odds, shown as stale
                None => {
                    let previous = state.odds_status.as_ref().and_then(SourceStatus::fetched_at);
                    state.odds_status = Some(match (previous, status) {
                        (Some(fetched_at_unix), SourceStatus::Unavailable { reason }) => {
                            SourceStatus::Stale {
                                fetched_at_unix,
                                error: reason,
                            }
                        }
                        (_, status) => status,
                    });
                }
            }
            state.reevaluate();
        }
        Delta::SetNotes(notes) => {
            state.notes = notes;
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
