//! "Current or future" filtering for the timeline.

use chrono::NaiveDate;

use crate::grid::Span;
use crate::record::EventRecord;

/// Whether `record` is still relevant on `today`.
///
/// Fails open: a record whose start date is missing or unparseable is always
/// kept. Multi-day records stay visible until their end date has passed,
/// using the same span the calendar draws (an end before the start counts
/// as a single day). Comparing whole dates is equivalent to comparing the
/// end of the end day against the start of today.
pub fn is_current_or_future(record: &EventRecord, today: NaiveDate) -> bool {
    match Span::of(record) {
        Some(span) => span.end >= today,
        None => true,
    }
}

/// Keep only the records [`is_current_or_future`] accepts, preserving order.
pub fn current_or_future(records: &[EventRecord], today: NaiveDate) -> Vec<EventRecord> {
    records
        .iter()
        .filter(|r| is_current_or_future(r, today))
        .cloned()
        .collect()
}
