//! Month grid.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{CalendarCell, CalendarMode, GridOptions, Placed};
use crate::date::days_in_month;
use crate::record::EventRecord;

/// Rows of seven cells, Monday first. `None` cells are padding outside the month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthGrid {
    pub year: i32,
    /// 1-based
    pub month: u32,
    pub rows: Vec<Vec<Option<CalendarCell>>>,
    /// Entries shown per cell; the rest are summarized as `+N more`
    pub capacity: Option<usize>,
}

impl MonthGrid {
    /// Number of blank cells before day 1.
    pub fn leading_blanks(&self) -> usize {
        self.rows
            .first()
            .map(|row| row.iter().take_while(|c| c.is_none()).count())
            .unwrap_or(0)
    }

    pub fn cells(&self) -> impl Iterator<Item = &CalendarCell> {
        self.rows.iter().flatten().flatten()
    }

    pub fn cell(&self, day: u32) -> Option<&CalendarCell> {
        self.cells().find(|c| c.day == day)
    }
}

/// Month grid with default options. `None` for an invalid month.
pub fn build_month_grid(records: &[EventRecord], year: i32, month: u32) -> Option<MonthGrid> {
    build_month_grid_with(records, year, month, &GridOptions::default())
}

pub fn build_month_grid_with(
    records: &[EventRecord],
    year: i32,
    month: u32,
    options: &GridOptions,
) -> Option<MonthGrid> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let days = days_in_month(year, month)?;

    // Sunday-indexed weekday shifted so Monday is column 0
    let leading = ((first.weekday().num_days_from_sunday() + 6) % 7) as usize;

    let placed = Placed::new(records, options);

    let mut cells: Vec<Option<CalendarCell>> = Vec::with_capacity(42);
    cells.extend((0..leading).map(|_| None));
    for day in 1..=days {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        cells.push(Some(placed.cell(date)));
    }
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    let rows = cells.chunks(7).map(<[_]>::to_vec).collect();

    Some(MonthGrid {
        year,
        month,
        rows,
        capacity: options.capacity(CalendarMode::Month),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::SpanPosition;
    use crate::record::EventKind;

    fn rec(id: &str, date: Option<&str>, end: Option<&str>) -> EventRecord {
        let mut r = EventRecord::new(id, id, EventKind::Event);
        r.date = date.map(String::from);
        r.end_date = end.map(String::from);
        r
    }

    #[test]
    fn test_wednesday_start_has_two_leading_blanks() {
        // 1 January 2025 is a Wednesday
        let grid = build_month_grid(&[], 2025, 1).unwrap();

        assert_eq!(grid.leading_blanks(), 2);
        assert_eq!(grid.rows[0][2].as_ref().map(|c| c.day), Some(1));
    }

    #[test]
    fn test_monday_and_sunday_starts() {
        // September 2025 starts on a Monday, June 2025 on a Sunday
        assert_eq!(build_month_grid(&[], 2025, 9).unwrap().leading_blanks(), 0);
        assert_eq!(build_month_grid(&[], 2025, 6).unwrap().leading_blanks(), 6);
    }

    #[test]
    fn test_rows_are_full_width_and_cover_every_day() {
        for month in 1..=12 {
            let grid = build_month_grid(&[], 2024, month).unwrap();
            assert!(grid.rows.iter().all(|row| row.len() == 7));
            assert_eq!(
                grid.cells().count() as u32,
                days_in_month(2024, month).unwrap()
            );
        }
    }

    #[test]
    fn test_invalid_month() {
        assert_eq!(build_month_grid(&[], 2025, 0), None);
        assert_eq!(build_month_grid(&[], 2025, 13), None);
    }

    #[test]
    fn test_multi_day_record_occupies_each_day() {
        let records = vec![rec("span", Some("01/03/2025"), Some("03/03/2025"))];
        let grid = build_month_grid(&records, 2025, 3).unwrap();

        let occupied: Vec<(u32, SpanPosition)> = grid
            .cells()
            .filter_map(|c| c.entries.first().map(|e| (c.day, e.position)))
            .collect();

        assert_eq!(
            occupied,
            vec![
                (1, SpanPosition::Start),
                (2, SpanPosition::Middle),
                (3, SpanPosition::End),
            ]
        );
    }

    #[test]
    fn test_span_crossing_month_boundary() {
        let records = vec![rec("span", Some("2025-02-27"), Some("2025-03-02"))];
        let march = build_month_grid(&records, 2025, 3).unwrap();

        assert_eq!(march.cell(1).unwrap().entries[0].position, SpanPosition::Middle);
        assert_eq!(march.cell(2).unwrap().entries[0].position, SpanPosition::End);
        assert!(march.cell(3).unwrap().entries.is_empty());
    }

    #[test]
    fn test_undated_records_are_excluded() {
        let records = vec![rec("a", None, None), rec("b", Some("no idea"), None)];
        let grid = build_month_grid(&records, 2025, 3).unwrap();
        assert!(grid.cells().all(|c| c.entries.is_empty()));
    }

    #[test]
    fn test_month_capacity() {
        let records: Vec<EventRecord> = (0..5)
            .map(|i| rec(&format!("r{i}"), Some("2025-03-10"), None))
            .collect();
        let grid = build_month_grid(&records, 2025, 3).unwrap();
        let cell = grid.cell(10).unwrap();

        assert_eq!(cell.visible(grid.capacity).len(), 3);
        assert_eq!(cell.more_label(grid.capacity).as_deref(), Some("+2 more"));
        assert_eq!(cell.entries.len(), 5);
    }
}
