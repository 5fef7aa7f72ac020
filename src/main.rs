use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use mlb_edge::acquisition::SourceStatus;
use mlb_edge::config::DashboardConfig;
use mlb_edge::export::{export_file_name, export_slate};
use mlb_edge::feed;
use mlb_edge::state::{apply_delta, AppState, Delta, ProviderCommand, SlateRow};
use mlb_edge::valuation::{ConfidenceTier, TotalPlay};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    export_dir: PathBuf,
}

impl App {
    fn new(cfg: &DashboardConfig, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state: AppState::with_settings(cfg.odds.encoding, cfg.top_n),
            should_quit: false,
            cmd_tx,
            export_dir: cfg.export_dir.clone(),
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.state.cycle_date(),
            KeyCode::Char('t') | KeyCode::Char('T') => self.state.cycle_team_filter(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.request_refresh(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.export(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn request_refresh(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Refresh unavailable");
            return;
        };
        if tx.send(ProviderCommand::Refresh).is_err() {
            self.state.push_log("[WARN] Refresh request failed");
        } else {
            self.state.push_log("[INFO] Refresh requested");
        }
    }

    fn export(&mut self) {
        let rows = self.state.filtered_rows();
        if rows.is_empty() {
            self.state.push_log("[INFO] Nothing to export");
            return;
        }
        let top = self.state.top_picks();
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let path = self
            .export_dir
            .join(export_file_name(self.state.selected_date.as_deref(), &stamp));
        let msg = match export_slate(&path, &rows, &top) {
            Ok(report) => format!(
                "[INFO] Exported {} rows ({} top picks) to {}",
                report.rows,
                report.top_picks,
                path.display()
            ),
            Err(err) => format!("[WARN] Export failed: {err:#}"),
        };
        self.state.push_log(msg);
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let cfg = DashboardConfig::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let mut app = App::new(&cfg, Some(cmd_tx));
    feed::spawn_provider(tx, cmd_rx, cfg);

    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(60), Constraint::Length(42)])
        .split(chunks[1]);
    render_slate(frame, body[0], &app.state);
    render_sidebar(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(
        "j/k/↑/↓ Move | d Date | t Team | r Refresh | e Export xlsx | ? Help | q Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &AppState) -> String {
    let now = Utc::now().timestamp();
    let date = state.selected_date.as_deref().unwrap_or("-");
    let line1 = format!(
        "  MLB BETTING DASHBOARD | Date: {date} | Team: {} | Top {}",
        state.team_filter_label(),
        state.top_n
    );
    let line2 = format!(
        "  Projections: {} | Odds: {} ({})",
        status_label(state.projections_status.as_ref(), now),
        status_label(state.odds_status.as_ref(), now),
        state.odds.encoding().as_str()
    );
    format!("{line1}\n{line2}")
}

fn status_label(status: Option<&SourceStatus>, now: i64) -> String {
    status
        .map(|s| s.label(now))
        .unwrap_or_else(|| "LOADING".to_string())
}

fn slate_columns() -> [Constraint; 10] {
    [
        Constraint::Length(13),
        Constraint::Length(13),
        Constraint::Min(14),
        Constraint::Min(14),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(5),
    ]
}

fn render_slate(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Slate").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(inner);

    let widths = slate_columns();
    render_slate_header(frame, sections[0], &widths);

    let list_area = sections[1];
    let rows = state.filtered_rows();
    if rows.is_empty() {
        let empty = Paragraph::new("No matchups for this date/team")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let row = rows[idx];
        let r = &row.record;
        let e = &row.evaluation;
        let line = e
            .total_line
            .map(|l| format!("{l:.1}"))
            .unwrap_or_else(|| "N/A".to_string());
        let ml = e
            .away_moneyline
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());

        render_cell_text(frame, cols[0], &r.away_team, row_style);
        render_cell_text(frame, cols[1], &r.home_team, row_style);
        render_cell_text(frame, cols[2], r.away_pitcher.as_deref().unwrap_or("TBD"), row_style);
        render_cell_text(frame, cols[3], r.home_pitcher.as_deref().unwrap_or("TBD"), row_style);
        render_cell_text(frame, cols[4], &format!("{:.2}", e.total_projection), row_style);
        render_cell_text(frame, cols[5], &line, row_style);
        render_cell_text(frame, cols[6], e.total_play.label(), play_style(e.total_play, row_style));
        render_cell_text(frame, cols[7], &ml, row_style);
        render_cell_text(frame, cols[8], e.moneyline_value.label(), row_style);
        render_cell_text(
            frame,
            cols[9],
            e.confidence_tier.label(),
            tier_style(e.confidence_tier, row_style),
        );
    }
}

fn render_slate_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths.to_vec())
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    for (col, title) in [
        "Away", "Home", "Away SP", "Home SP", "Total", "Line", "Play", "ML", "Value", "Conf",
    ]
    .iter()
    .enumerate()
    {
        render_cell_text(frame, cols[col], title, style);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, area);
}

fn play_style(play: TotalPlay, base: Style) -> Style {
    match play {
        TotalPlay::Over => base.fg(Color::Black).bg(Color::LightYellow),
        TotalPlay::Under => base.fg(Color::Black).bg(Color::LightBlue),
        TotalPlay::NotAvailable => base.fg(Color::DarkGray),
    }
}

fn tier_style(tier: ConfidenceTier, base: Style) -> Style {
    match tier {
        ConfidenceTier::High => base.fg(Color::Black).bg(Color::LightGreen),
        ConfidenceTier::Medium => base.fg(Color::Black).bg(Color::LightYellow),
        ConfidenceTier::Low => base.fg(Color::Black).bg(Color::LightRed),
    }
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let top_height = (state.top_n as u16).saturating_add(2).min(area.height / 2).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(top_height), Constraint::Min(1)])
        .split(area);

    let picks = Paragraph::new(top_picks_text(state))
        .block(Block::default().title("Top Picks").borders(Borders::ALL));
    frame.render_widget(picks, chunks[0]);

    let insights = Paragraph::new(insights_text(state))
        .block(Block::default().title("Matchup Insights").borders(Borders::ALL));
    frame.render_widget(insights, chunks[1]);
}

fn top_picks_text(state: &AppState) -> String {
    let picks = state.top_picks();
    if picks.is_empty() {
        return "No picks yet".to_string();
    }
    picks
        .iter()
        .map(|row| pick_line(row))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pick_line(row: &SlateRow) -> String {
    let e = &row.evaluation;
    format!(
        "{:<4} {} {} @ {}",
        e.confidence_tier.label(),
        e.total_play.label(),
        row.record.away_team,
        row.record.home_team
    )
}

fn insights_text(state: &AppState) -> String {
    let rows = state.filtered_rows();
    if rows.is_empty() {
        return "No matchups".to_string();
    }
    let mut lines = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let marker = if idx == state.selected { ">" } else { " " };
        lines.push(format!(
            "{marker} {} vs {}",
            row.record.away_team, row.record.home_team
        ));
        lines.push(format!("  {}", state.notes.note_for(&row.record.key())));
    }
    lines.join("\n")
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "MLB Betting Dashboard - Help",
        "",
        "  j/k or ↑/↓   Move selection",
        "  d            Cycle game date",
        "  t            Cycle team filter (All first)",
        "  r            Refresh projections and odds",
        "  e            Export visible slate to xlsx",
        "  ?            Toggle help",
        "  q            Quit",
        "",
        "Play: Over when projection beats the line, Under on ties.",
        "Conf: 2U gap >= 1.0, 1U gap >= 0.5, else 0.5U.",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
