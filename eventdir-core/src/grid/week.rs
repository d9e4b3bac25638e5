//! Week grid.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use super::{CalendarCell, CalendarMode, GridOptions, Placed};
use crate::record::EventRecord;

/// Seven consecutive days starting at `start`. Cells are never truncated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekGrid {
    pub start: NaiveDate,
    pub cells: Vec<CalendarCell>,
    pub capacity: Option<usize>,
}

impl WeekGrid {
    pub fn end(&self) -> NaiveDate {
        self.cells.last().map_or(self.start, |cell| cell.date)
    }
}

pub fn build_week_grid(records: &[EventRecord], week_start: NaiveDate) -> Option<WeekGrid> {
    build_week_grid_with(records, week_start, &GridOptions::default())
}

/// `None` when the week runs past the last representable date.
pub fn build_week_grid_with(
    records: &[EventRecord],
    week_start: NaiveDate,
    options: &GridOptions,
) -> Option<WeekGrid> {
    let days = (0..7)
        .map(|offset| week_start.checked_add_signed(Duration::days(offset)))
        .collect::<Option<Vec<_>>>()?;

    let placed = Placed::new(records, options);

    Some(WeekGrid {
        start: week_start,
        cells: days.into_iter().map(|day| placed.cell(day)).collect(),
        capacity: options.capacity(CalendarMode::Week),
    })
}
