use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::DateTime;
use rand::Rng;

use crate::acquisition::Acquisition;
use crate::config::DashboardConfig;
use crate::insights::HeadToHeadNotes;
use crate::odds_fetch;
use crate::projections::{self, ProjectionLoad};
use crate::state::{Delta, ProviderCommand};
use crate::team_names::TeamNameMap;
use crate::valuation::OddsLookup;

/// One refresh worth of inputs for the valuator.
#[derive(Debug, Clone)]
pub struct SlateSnapshot {
    pub projections: ProjectionLoad,
    pub odds: Acquisition<OddsLookup>,
}

pub fn load_slate(
    cfg: &DashboardConfig,
    names: &TeamNameMap,
    rng: &mut impl Rng,
) -> SlateSnapshot {
    let projections = projections::load_projections(&cfg.projections, names, rng);
    let odds = odds_fetch::fetch_odds(&cfg.odds, names);
    SlateSnapshot { projections, odds }
}

/// Human-readable log lines for a snapshot, `[INFO]`/`[WARN]` prefixed.
pub fn describe_snapshot(cfg: &DashboardConfig, snapshot: &SlateSnapshot) -> Vec<String> {
    let mut lines = Vec::new();
    for rejected in &snapshot.projections.rejected {
        lines.push(format!("[WARN] Dropped projection: {rejected}"));
    }

    match &snapshot.projections.acquisition {
        Acquisition::Fresh { data, .. } => lines.push(format!(
            "[INFO] Projections: {} matchups ({})",
            data.len(),
            cfg.projections.label()
        )),
        Acquisition::Stale { data, error, .. } => lines.push(format!(
            "[WARN] Projections stale ({} matchups): {error}",
            data.len()
        )),
        Acquisition::Unavailable { reason } => {
            lines.push(format!("[WARN] Projections unavailable: {reason}"))
        }
    }

    match &snapshot.odds {
        Acquisition::Fresh { data, .. } => lines.push(format!(
            "[INFO] Odds: {} markets, {} ({})",
            data.len(),
            data.encoding().as_str(),
            cfg.odds.provider_label()
        )),
        Acquisition::Stale {
            data,
            fetched_at_unix,
            error,
        } => lines.push(format!(
            "[WARN] Odds fetch failed, using {} cached markets from {}: {error}",
            data.len(),
            format_unix(*fetched_at_unix)
        )),
        Acquisition::Unavailable { reason } => {
            lines.push(format!("[WARN] Odds unavailable: {reason}"))
        }
    }
    lines
}

pub fn spawn_provider(
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
    cfg: DashboardConfig,
) {
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        let (names, names_error) = cfg.team_names();
        if let Some(err) = names_error {
            let _ = tx.send(Delta::Log(format!(
                "[WARN] Team names override ignored: {err}"
            )));
        }
        let _ = tx.send(Delta::SetNotes(HeadToHeadNotes::seeded()));

        if !push_snapshot(&cfg, &names, &mut rng, &tx) {
            return;
        }
        let mut last_refresh = Instant::now();

        loop {
            thread::sleep(Duration::from_millis(500));

            let mut refresh_now = last_refresh.elapsed() >= cfg.refresh;
            loop {
                match cmd_rx.try_recv() {
                    Ok(ProviderCommand::Refresh) => refresh_now = true,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if refresh_now {
                if !push_snapshot(&cfg, &names, &mut rng, &tx) {
                    return;
                }
                last_refresh = Instant::now();
            }
        }
    });
}

/// Sends one snapshot to the UI. Returns false once the UI has gone away.
fn push_snapshot(
    cfg: &DashboardConfig,
    names: &TeamNameMap,
    rng: &mut impl Rng,
    tx: &Sender<Delta>,
) -> bool {
    let snapshot = load_slate(cfg, names, rng);
    for line in describe_snapshot(cfg, &snapshot) {
        if tx.send(Delta::Log(line)).is_err() {
            return false;
        }
    }
    tx.send(Delta::SetProjections(snapshot.projections.acquisition))
        .is_ok()
        && tx.send(Delta::SetOdds(snapshot.odds)).is_ok()
}

pub fn format_unix(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}
