//! Terminal rendering for directory views.
//!
//! Extension traits and helpers that turn eventdir-core projections into
//! colored text using owo_colors.

use chrono::{Datelike, NaiveDate};
use eventdir_core::grid::{CalendarCell, CellEntry, SpanPosition};
use eventdir_core::{DateGroup, DateKey, EventKind, EventRecord, MonthGrid, WeekGrid};
use owo_colors::{AnsiColors, OwoColorize};

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Palette used for per-record colors, indexed by `CellEntry::color`.
const PALETTE: [AnsiColors; 6] = [
    AnsiColors::Blue,
    AnsiColors::Magenta,
    AnsiColors::Green,
    AnsiColors::Yellow,
    AnsiColors::Cyan,
    AnsiColors::Red,
];

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for EventKind {
    fn render(&self) -> String {
        let tag = format!("[{self}]");
        match self {
            EventKind::Event => tag.blue().to_string(),
            EventKind::Hackathon => tag.magenta().to_string(),
            EventKind::Scholarship => tag.green().to_string(),
        }
    }
}

impl Render for SpanPosition {
    fn render(&self) -> String {
        match self {
            SpanPosition::Single => "•",
            SpanPosition::Start => "┌",
            SpanPosition::Middle => "│",
            SpanPosition::End => "└",
        }
        .to_string()
    }
}

impl Render for CellEntry {
    fn render(&self) -> String {
        let color = PALETTE[self.color % PALETTE.len()];
        format!(
            "{} {} {} {}",
            format_time(&self.record),
            self.position.render().color(color),
            self.record.name.color(color),
            self.record.kind.render()
        )
    }
}

/// Human-readable bucket label ("Today", "Tomorrow", "Wed Dec 3").
pub fn date_label(key: DateKey, today: NaiveDate) -> String {
    let Some(date) = key.date() else {
        return "Date to be announced".to_string();
    };

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ if date.year() != today.year() => date.format("%a %b %-d %Y").to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Start time of a record (e.g. "  18:30" or "all-day").
fn format_time(record: &EventRecord) -> String {
    match record.time.as_deref() {
        Some(time) => format!("{time:>7}"),
        None => "all-day".to_string(),
    }
}

fn render_record_line(record: &EventRecord) -> String {
    let mut line = format!(
        "  {} {} {}",
        format_time(record),
        record.name,
        record.kind.render()
    );

    if let (Some(start), Some(end)) = (record.start_date(), record.end_date())
        && end > start
    {
        line.push_str(&format!(" {}", format!("(until {})", end.format("%b %-d")).dimmed()));
    }

    if let Some(ref location) = record.location {
        line.push_str(&format!(" {}", location.dimmed()));
    }

    line
}

/// `show_past` only changes the wording used when there is nothing to list.
pub fn render_timeline(groups: &[DateGroup], today: NaiveDate, show_past: bool) -> String {
    if groups.is_empty() {
        let empty = if show_past { "No events" } else { "No upcoming events" };
        return empty.dimmed().to_string();
    }

    let mut sections = Vec::with_capacity(groups.len());
    for group in groups {
        let mut lines = vec![date_label(group.key, today).bold().to_string()];
        lines.extend(group.events.iter().map(render_record_line));
        sections.push(lines.join("\n"));
    }

    sections.join("\n\n")
}

/// Day number padded to a fixed width, marked when the day has entries.
fn render_day_number(cell: &CalendarCell, today: NaiveDate) -> String {
    let marker = if cell.entries.is_empty() { ' ' } else { '•' };
    let text = format!("{:>3}{marker}", cell.day);

    if cell.date == today {
        text.reversed().to_string()
    } else if cell.entries.is_empty() {
        text.dimmed().to_string()
    } else {
        text.bold().to_string()
    }
}

fn render_cell_entries(cell: &CalendarCell, capacity: Option<usize>, lines: &mut Vec<String>) {
    for entry in cell.visible(capacity) {
        lines.push(format!("  {}", entry.render()));
    }
    if let Some(more) = cell.more_label(capacity) {
        lines.push(format!("  {}", more.dimmed()));
    }
}

pub fn render_month(grid: &MonthGrid, today: NaiveDate) -> String {
    let title = NaiveDate::from_ymd_opt(grid.year, grid.month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| format!("{}-{:02}", grid.year, grid.month));

    let mut lines = vec![title.bold().to_string()];
    lines.push(
        WEEKDAYS
            .iter()
            .map(|d| format!("{d:>4}"))
            .collect::<Vec<_>>()
            .join(" ")
            .dimmed()
            .to_string(),
    );

    for row in &grid.rows {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(cell) => render_day_number(cell, today),
                None => "    ".to_string(),
            })
            .collect();
        lines.push(cells.join(" "));
    }

    let busy: Vec<&CalendarCell> = grid.cells().filter(|c| !c.entries.is_empty()).collect();
    if busy.is_empty() {
        lines.push(String::new());
        lines.push("No events this month".dimmed().to_string());
    }

    for cell in busy {
        lines.push(String::new());
        lines.push(cell.date.format("%a %-d").to_string().bold().to_string());
        render_cell_entries(cell, grid.capacity, &mut lines);
    }

    lines.join("\n")
}

pub fn render_week(grid: &WeekGrid, today: NaiveDate) -> String {
    let title = format!(
        "Week of {} to {}",
        grid.start.format("%a %b %-d"),
        grid.end().format("%a %b %-d %Y")
    );
    let mut lines = vec![title.bold().to_string()];

    for cell in &grid.cells {
        lines.push(String::new());
        let heading = cell.date.format("%a %b %-d").to_string();
        if cell.date == today {
            lines.push(heading.reversed().to_string());
        } else {
            lines.push(heading.bold().to_string());
        }

        if cell.entries.is_empty() {
            lines.push(format!("  {}", "nothing scheduled".dimmed()));
        }
        render_cell_entries(cell, grid.capacity, &mut lines);
    }

    lines.join("\n")
}
