//! Calendar grid projection.
//!
//! Both the month and the week grid are built from the same pieces: a
//! record's [`Span`] decides which days it occupies, [`SpanPosition`] tags
//! its role on each of those days, and [`color_index`] keeps a multi-day
//! record the same color on every cell it covers.

mod month;
mod week;

pub use month::{MonthGrid, build_month_grid, build_month_grid_with};
pub use week::{WeekGrid, build_week_grid, build_week_grid_with};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::record::EventRecord;
use crate::timeline::compare_within_day;

pub const DEFAULT_PALETTE_SIZE: usize = 6;
pub const DEFAULT_MONTH_CELL_CAPACITY: usize = 3;

/// Month or week layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarMode {
    Month,
    Week,
}

/// Knobs shared by both grid builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    pub palette_size: usize,
    pub month_cell_capacity: usize,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridOptions {
            palette_size: DEFAULT_PALETTE_SIZE,
            month_cell_capacity: DEFAULT_MONTH_CELL_CAPACITY,
        }
    }
}

impl GridOptions {
    /// How many entries a cell shows in `mode`; `None` means all of them.
    pub fn capacity(&self, mode: CalendarMode) -> Option<usize> {
        match mode {
            CalendarMode::Month => Some(self.month_cell_capacity),
            CalendarMode::Week => None,
        }
    }
}

/// Role of a record on one day of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanPosition {
    Single,
    Start,
    Middle,
    End,
}

/// The inclusive range of days a record occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Span {
    /// Days occupied by `record`, or `None` when it has no usable start date.
    ///
    /// Start and end are parsed independently. An end that is missing,
    /// unparseable or before the start degrades to a single day.
    pub fn of(record: &EventRecord) -> Option<Self> {
        let start = record.start_date()?;
        let end = match record.end_date() {
            Some(end) if end > start => end,
            _ => start,
        };
        Some(Span { start, end })
    }

    pub fn is_multi_day(&self) -> bool {
        self.end != self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn position(&self, date: NaiveDate) -> Option<SpanPosition> {
        if !self.contains(date) {
            return None;
        }
        Some(if !self.is_multi_day() {
            SpanPosition::Single
        } else if date == self.start {
            SpanPosition::Start
        } else if date == self.end {
            SpanPosition::End
        } else {
            SpanPosition::Middle
        })
    }
}

/// String hash with Java semantics: `h = 31 * h + c` over UTF-16 code
/// units, wrapping at signed 32 bits.
pub fn java_string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Palette slot for a record id.
///
/// The absolute value is taken in 64 bits so `i32::MIN` does not wrap.
pub fn color_index(id: &str, palette_size: usize) -> usize {
    let palette_size = palette_size.max(1) as u64;
    (i64::from(java_string_hash(id)).unsigned_abs() % palette_size) as usize
}

/// One record as it appears in one cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellEntry {
    pub record: EventRecord,
    pub position: SpanPosition,
    pub color: usize,
}

/// A day of the grid with every record active on it, already sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarCell {
    pub day: u32,
    pub date: NaiveDate,
    pub entries: Vec<CellEntry>,
}

impl CalendarCell {
    /// Entries shown under `capacity`; the full list stays in `entries`.
    pub fn visible(&self, capacity: Option<usize>) -> &[CellEntry] {
        match capacity {
            Some(cap) if cap < self.entries.len() => &self.entries[..cap],
            _ => &self.entries,
        }
    }

    pub fn hidden_count(&self, capacity: Option<usize>) -> usize {
        self.entries.len() - self.visible(capacity).len()
    }

    /// `"+N more"` when entries are hidden.
    pub fn more_label(&self, capacity: Option<usize>) -> Option<String> {
        match self.hidden_count(capacity) {
            0 => None,
            n => Some(format!("+{n} more")),
        }
    }
}

/// Records with their spans resolved once, shared by every cell lookup.
struct Placed<'a> {
    spans: Vec<(&'a EventRecord, Span)>,
    palette_size: usize,
}

impl<'a> Placed<'a> {
    fn new(records: &'a [EventRecord], options: &GridOptions) -> Self {
        let spans = records
            .iter()
            .filter_map(|r| Span::of(r).map(|span| (r, span)))
            .collect();
        Placed {
            spans,
            palette_size: options.palette_size,
        }
    }

    fn cell(&self, date: NaiveDate) -> CalendarCell {
        let mut entries: Vec<CellEntry> = self
            .spans
            .iter()
            .filter_map(|(record, span)| {
                span.position(date).map(|position| CellEntry {
                    record: (*record).clone(),
                    position,
                    color: color_index(&record.id, self.palette_size),
                })
            })
            .collect();

        entries.sort_by(|a, b| compare_within_day(&a.record, &b.record));

        CalendarCell {
            day: date.day(),
            date,
            entries,
        }
    }
}

/// Every record active on `date`, sorted, without building a whole grid.
pub fn entries_on(records: &[EventRecord], date: NaiveDate, options: &GridOptions) -> CalendarCell {
    Placed::new(records, options).cell(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventKind;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(id: &str, date: Option<&str>, end: Option<&str>) -> EventRecord {
        let mut r = EventRecord::new(id, id, EventKind::Event);
        r.date = date.map(String::from);
        r.end_date = end.map(String::from);
        r
    }

    #[test]
    fn test_java_string_hash_matches_reference_values() {
        assert_eq!(java_string_hash(""), 0);
        assert_eq!(java_string_hash("a"), 97);
        assert_eq!(java_string_hash("hello"), 99162322);
        // Overflows i32 and wraps negative
        assert_eq!(java_string_hash("hackathon-123456"), -401568579);
        assert_eq!(java_string_hash("polygenelubricants"), i32::MIN);
    }

    #[test]
    fn test_color_index_handles_min_hash() {
        // |i32::MIN| = 2147483648, and 2147483648 % 6 == 2
        assert_eq!(color_index("polygenelubricants", 6), 2);
        assert_eq!(color_index("a", 6), 97 % 6);
        assert_eq!(color_index("a", 0), 0);
    }

    #[test]
    fn test_multi_day_positions() {
        let record = rec("m", Some("01/03/2025"), Some("03/03/2025"));
        let span = Span::of(&record).unwrap();

        assert_eq!(span.position(ymd(2025, 2, 28)), None);
        assert_eq!(span.position(ymd(2025, 3, 1)), Some(SpanPosition::Start));
        assert_eq!(span.position(ymd(2025, 3, 2)), Some(SpanPosition::Middle));
        assert_eq!(span.position(ymd(2025, 3, 3)), Some(SpanPosition::End));
        assert_eq!(span.position(ymd(2025, 3, 4)), None);
    }

    #[test]
    fn test_span_degrades_to_single_day() {
        let same = Span::of(&rec("a", Some("2025-03-01"), Some("01/03/2025"))).unwrap();
        let reversed = Span::of(&rec("b", Some("2025-03-05"), Some("2025-03-01"))).unwrap();
        let bad_end = Span::of(&rec("c", Some("2025-03-05"), Some("later"))).unwrap();

        for span in [same, reversed, bad_end] {
            assert!(!span.is_multi_day());
            assert_eq!(span.position(span.start), Some(SpanPosition::Single));
        }
    }

    #[test]
    fn test_span_requires_start() {
        assert_eq!(Span::of(&rec("a", None, Some("2025-03-05"))), None);
        assert_eq!(Span::of(&rec("b", Some("TBC"), Some("2025-03-05"))), None);
    }

    #[test]
    fn test_cell_capacity() {
        let records: Vec<EventRecord> = (0..5)
            .map(|i| rec(&format!("r{i}"), Some("2025-03-01"), None))
            .collect();
        let cell = entries_on(&records, ymd(2025, 3, 1), &GridOptions::default());

        let options = GridOptions::default();
        let month = options.capacity(CalendarMode::Month);
        let week = options.capacity(CalendarMode::Week);

        assert_eq!(cell.entries.len(), 5);
        assert_eq!(cell.visible(month).len(), 3);
        assert_eq!(cell.more_label(month).as_deref(), Some("+2 more"));
        assert_eq!(cell.visible(week).len(), 5);
        assert_eq!(cell.more_label(week), None);
    }

    #[test]
    fn test_same_record_same_color_across_span() {
        let records = vec![rec("hackathon-9", Some("2025-03-01"), Some("2025-03-03"))];
        let options = GridOptions::default();
        let colors: Vec<usize> = (1..=3)
            .map(|d| entries_on(&records, ymd(2025, 3, d), &options).entries[0].color)
            .collect();
        assert!(colors.windows(2).all(|w| w[0] == w[1]));
    }
}
