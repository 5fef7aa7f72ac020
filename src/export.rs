use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::state::SlateRow;

pub struct ExportReport {
    pub rows: usize,
    pub top_picks: usize,
}

const SLATE_HEADER: [&str; 13] = [
    "Date",
    "Away Team",
    "Home Team",
    "Away SP",
    "Home SP",
    "Total Runs",
    "Total Line",
    "Total Play",
    "Winner Odds",
    "Moneyline Value",
    "Confidence",
    "Units",
    "Line Gap",
];

/// Workbook file name for a slate date. Anything outside `[A-Za-z0-9-]` in the
/// date becomes `_`, so dates like `06/30/2025` never add path components.
pub fn export_file_name(date: Option<&str>, stamp: &str) -> String {
    let date = date.map(str::trim).filter(|d| !d.is_empty()).unwrap_or("all");
    let safe: String = date
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    format!("mlb_slate_{safe}_{stamp}.xlsx")
}

/// Writes the evaluated slate and the top picks into a two-sheet workbook.
pub fn export_slate(path: &Path, rows: &[&SlateRow], top: &[&SlateRow]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Slate")?;
        write_header(sheet)?;
        write_rows(sheet, rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("TopPicks")?;
        write_header(sheet)?;
        write_rows(sheet, top)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        rows: rows.len(),
        top_picks: top.len(),
    })
}

fn write_header(worksheet: &mut Worksheet) -> Result<()> {
    for (col_idx, title) in SLATE_HEADER.iter().enumerate() {
        worksheet
            .write_string(0, col_idx as u16, *title)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[&SlateRow]) -> Result<()> {
    for (idx, row) in rows.iter().enumerate() {
        let row_idx = idx as u32 + 1;
        let r = &row.record;
        let e = &row.evaluation;
        let text_cells = [
            (0u16, r.date.clone()),
            (1, r.away_team.clone()),
            (2, r.home_team.clone()),
            (3, r.away_pitcher.clone().unwrap_or_default()),
            (4, r.home_pitcher.clone().unwrap_or_default()),
            (7, e.total_play.label().to_string()),
            (8, opt_to_string(e.away_moneyline)),
            (9, e.moneyline_value.label().to_string()),
            (10, e.confidence_tier.label().to_string()),
        ];
        for (col, value) in &text_cells {
            worksheet
                .write_string(row_idx, *col, value)
                .with_context(|| format!("write cell ({row_idx},{col})"))?;
        }

        let number_cells = [
            (5u16, Some(e.total_projection)),
            (6, e.total_line),
            (11, Some(e.confidence_tier.units())),
            (12, e.line_gap),
        ];
        for (col, value) in number_cells {
            let Some(value) = value else {
                continue;
            };
            worksheet
                .write_number(row_idx, col, value)
                .with_context(|| format!("write cell ({row_idx},{col})"))?;
        }
    }
    Ok(())
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::export_file_name;

    #[test]
    fn file_name_strips_separators_from_date() {
        let name = export_file_name(Some("06/30/2025"), "20250630_120000");
        assert_eq!(name, "mlb_slate_06_30_2025_20250630_120000.xlsx");
        assert_eq!(Path::new(&name).components().count(), 1);

        let name = export_file_name(Some("..\\2025-06-30"), "x");
        assert_eq!(name, "mlb_slate____2025-06-30_x.xlsx");
    }

    #[test]
    fn missing_date_exports_as_all() {
        assert_eq!(export_file_name(None, "x"), "mlb_slate_all_x.xlsx");
        assert_eq!(export_file_name(Some("  "), "x"), "mlb_slate_all_x.xlsx");
    }
}
