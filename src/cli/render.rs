use colored::{Color, Colorize};

use crate::application::MonthlyReport;
use crate::domain::{DATE_FORMAT, Record, display_cents};

pub const BANNER: &str = r"
 _          _                   ___ _                _    _
| |   ___ _| |__ _ ___ _ _    / __| |_  _ _ ___ __| |__| |___ _ _
| |__/ -_) _` / _` / -_) '_|   \__ \ ' \| '_/ -_) _` / _` / -_) '_|
|____\___\__,_\__, \___|_|     |___/_||_|_| \___\__,_\__,_\___|_|
              |___/";

/// What a message means, which decides how it is colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Title,
    Info,
    Progress,
    Success,
    Warning,
    Error,
}

/// Color table for terminal output. Passed by reference into every render call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub enabled: bool,
    pub title: Color,
    pub info: Color,
    pub progress: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
}

impl Palette {
    pub const DEFAULT: Palette = Palette {
        enabled: true,
        title: Color::BrightMagenta,
        info: Color::BrightCyan,
        progress: Color::BrightBlue,
        success: Color::BrightGreen,
        warning: Color::BrightYellow,
        error: Color::BrightRed,
    };

    pub const PLAIN: Palette = Palette {
        enabled: false,
        ..Palette::DEFAULT
    };

    pub fn color_for(&self, tone: Tone) -> Color {
        match tone {
            Tone::Title => self.title,
            Tone::Info => self.info,
            Tone::Progress => self.progress,
            Tone::Success => self.success,
            Tone::Warning => self.warning,
            Tone::Error => self.error,
        }
    }
}

/// Style `text` for `tone`; a disabled palette returns it untouched.
pub fn paint(palette: &Palette, tone: Tone, text: &str) -> String {
    if !palette.enabled {
        return text.to_string();
    }
    let colored = text.color(palette.color_for(tone));
    match tone {
        Tone::Title => colored.bold().to_string(),
        _ => colored.to_string(),
    }
}

/// Columns holding money are right aligned.
fn is_numeric_column(header: &str) -> bool {
    matches!(header, "Amount" | "Total")
}

/// Render rows as a bordered table:
///
/// ```text
/// +----+--------+
/// | ID | Amount |
/// +----+--------+
/// | 1  | $12.50 |
/// +----+--------+
/// ```
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );

    let header_line = format!(
        "|{}|",
        headers
            .iter()
            .zip(&widths)
            .map(|(header, &w)| format!(" {:<w$} ", header))
            .collect::<Vec<_>>()
            .join("|")
    );

    let mut lines = vec![border.clone(), header_line, border.clone()];
    for row in rows {
        let cells: Vec<String> = headers
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (header, &w))| {
                let value = row.get(col).map(String::as_str).unwrap_or("");
                if is_numeric_column(header) {
                    format!(" {:>w$} ", value)
                } else {
                    format!(" {:<w$} ", value)
                }
            })
            .collect();
        lines.push(format!("|{}|", cells.join("|")));
    }
    lines.push(border);

    lines.join("\n")
}

pub fn expense_table<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Record>,
{
    let rows: Vec<Vec<String>> = records
        .into_iter()
        .map(|record| {
            vec![
                record.id().map(|id| id.to_string()).unwrap_or_default(),
                display_cents(record.amount()),
                record.category().to_string(),
                record.date().format(DATE_FORMAT).to_string(),
                record.note().to_string(),
            ]
        })
        .collect();

    format_table(&["ID", "Amount", "Category", "Date", "Note"], &rows)
}

pub fn summary_table(report: &MonthlyReport) -> String {
    let rows: Vec<Vec<String>> = report
        .months
        .iter()
        .map(|m| vec![m.month.clone(), m.count.to_string(), display_cents(m.total)])
        .collect();

    format_table(&["Month", "Count", "Total"], &rows)
}
