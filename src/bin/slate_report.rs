use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use mlb_edge::config::{DashboardConfig, clamp_top_n};
use mlb_edge::export::export_slate;
use mlb_edge::feed;
use mlb_edge::state::{apply_delta, AppState, Delta, SlateRow};
use mlb_edge::valuation::{MatchupEvaluation, ProjectionRecord};

#[derive(Debug, Default)]
struct ReportArgs {
    date: Option<String>,
    team: Option<String>,
    top: Option<usize>,
    xlsx: Option<PathBuf>,
    json: bool,
}

#[derive(Serialize)]
struct ReportRow<'a> {
    #[serde(flatten)]
    record: &'a ProjectionRecord,
    evaluation: &'a MatchupEvaluation,
}

#[derive(Serialize)]
struct Report<'a> {
    slate: Vec<ReportRow<'a>>,
    top_picks: Vec<ReportRow<'a>>,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let args = parse_args()?;
    let mut cfg = DashboardConfig::from_env();
    if let Some(top) = args.top {
        cfg.top_n = clamp_top_n(top);
    }

    let (names, names_error) = cfg.team_names();
    if let Some(err) = names_error {
        eprintln!("[WARN] Team names override ignored: {err}");
    }

    let mut rng = rand::thread_rng();
    let snapshot = feed::load_slate(&cfg, &names, &mut rng);
    for line in feed::describe_snapshot(&cfg, &snapshot) {
        eprintln!("{line}");
    }

    let mut state = AppState::with_settings(cfg.odds.encoding, cfg.top_n);
    apply_delta(
        &mut state,
        Delta::SetProjections(snapshot.projections.acquisition),
    );
    apply_delta(&mut state, Delta::SetOdds(snapshot.odds));

    if let Some(date) = args.date {
        if !state.available_dates().contains(&date) {
            eprintln!("[WARN] No matchups on {date}");
        }
        state.selected_date = Some(date);
    }
    if let Some(team) = args.team {
        state.team_filter = Some(names.canonical(&team));
    }

    let rows = state.filtered_rows();
    let top = state.top_picks();

    if args.json {
        let report = Report {
            slate: rows.iter().map(|row| report_row(row)).collect(),
            top_picks: top.iter().map(|row| report_row(row)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_table(&state, &rows, &top);
    }

    if let Some(path) = args.xlsx {
        let report = export_slate(&path, &rows, &top)
            .with_context(|| format!("export to {}", path.display()))?;
        eprintln!(
            "[INFO] Wrote {} rows ({} top picks) to {}",
            report.rows,
            report.top_picks,
            path.display()
        );
    }

    Ok(())
}

fn report_row(row: &SlateRow) -> ReportRow<'_> {
    ReportRow {
        record: &row.record,
        evaluation: &row.evaluation,
    }
}

fn parse_args() -> anyhow::Result<ReportArgs> {
    let raw = std::env::args().skip(1).collect::<Vec<_>>();
    let mut args = ReportArgs::default();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (arg.as_str(), None),
        };
        if flag == "--json" {
            args.json = true;
            continue;
        }
        let value = match inline {
            Some(value) => value,
            None => match flag {
                "--date" | "--team" | "--top" | "--xlsx" => iter
                    .next()
                    .cloned()
                    .with_context(|| format!("{flag} needs a value"))?,
                other => anyhow::bail!("unknown argument: {other}"),
            },
        };
        match flag {
            "--date" => args.date = Some(value),
            "--team" => args.team = Some(value),
            "--top" => {
                args.top = Some(
                    value
                        .parse()
                        .with_context(|| format!("--top expects a number, got {value}"))?,
                )
            }
            "--xlsx" => args.xlsx = Some(PathBuf::from(value)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(args)
}

fn print_table(state: &AppState, rows: &[&SlateRow], top: &[&SlateRow]) {
    println!(
        "Date: {} | Team: {}",
        state.selected_date.as_deref().unwrap_or("-"),
        state.team_filter_label()
    );
    println!(
        "{:<14} {:<14} {:<16} {:<16} {:>6} {:>5} {:<5} {:>6} {:<8} {:<4}",
        "Away", "Home", "Away SP", "Home SP", "Total", "Line", "Play", "ML", "Value", "Conf"
    );
    for row in rows {
        let r = &row.record;
        let e = &row.evaluation;
        println!(
            "{:<14} {:<14} {:<16} {:<16} {:>6.2} {:>5} {:<5} {:>6} {:<8} {:<4}",
            r.away_team,
            r.home_team,
            r.away_pitcher.as_deref().unwrap_or("TBD"),
            r.home_pitcher.as_deref().unwrap_or("TBD"),
            e.total_projection,
            e.total_line
                .map(|l| format!("{l:.1}"))
                .unwrap_or_else(|| "N/A".to_string()),
            e.total_play.label(),
            e.away_moneyline
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            e.moneyline_value.label(),
            e.confidence_tier.label(),
        );
    }
    if rows.is_empty() {
        println!("(no matchups)");
    }

    println!();
    println!("Top {} picks:", state.top_n);
    for (idx, row) in top.iter().enumerate() {
        println!(
            "{}. {} @ {} {} {}",
            idx + 1,
            row.record.away_team,
            row.record.home_team,
            row.evaluation.total_play.label(),
            row.evaluation.confidence_tier.label()
        );
    }
    if top.is_empty() {
        println!("(none)");
    }
}
