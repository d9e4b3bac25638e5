//! Day-bucketed timeline.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::filter::current_or_future;
use crate::record::EventRecord;

/// Key of a timeline bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DateKey {
    Dated(NaiveDate),
    /// Records whose start date is missing or unparseable
    NoDate,
}

impl DateKey {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateKey::Dated(d) => Some(d),
            DateKey::NoDate => None,
        }
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DateKey::Dated(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DateKey::NoDate => f.write_str("no-date"),
        }
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateGroup {
    pub key: DateKey,
    pub events: Vec<EventRecord>,
}

/// Order of records within one day.
///
/// Both timed: compare the canonical `HH:MM` strings. One timed: it goes
/// first. Neither timed: compare names, case-sensitively. Records with the
/// same time are equal here and keep their relative order under a stable sort.
pub fn compare_within_day(a: &EventRecord, b: &EventRecord) -> Ordering {
    match (a.time.as_deref(), b.time.as_deref()) {
        (Some(ta), Some(tb)) => ta.cmp(tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.name.cmp(&b.name),
    }
}

/// Sort a day's records in place (stable).
pub fn sort_within_day(records: &mut [EventRecord]) {
    records.sort_by(compare_within_day);
}

/// Bucket records by start date.
///
/// Dated groups come out in ascending order; the `no-date` group, if any,
/// is always last. Every input record lands in exactly one group.
pub fn group_by_date(records: &[EventRecord]) -> Vec<DateGroup> {
    let mut dated: BTreeMap<NaiveDate, Vec<EventRecord>> = BTreeMap::new();
    let mut undated = Vec::new();

    for record in records {
        match record.start_date() {
            Some(date) => dated.entry(date).or_default().push(record.clone()),
            None => undated.push(record.clone()),
        }
    }

    let mut groups: Vec<DateGroup> = dated
        .into_iter()
        .map(|(date, mut events)| {
            sort_within_day(&mut events);
            DateGroup {
                key: DateKey::Dated(date),
                events,
            }
        })
        .collect();

    if !undated.is_empty() {
        sort_within_day(&mut undated);
        groups.push(DateGroup {
            key: DateKey::NoDate,
            events: undated,
        });
    }

    groups
}

/// The timeline view: current/future records grouped by day, or every
/// record when `include_past` is set.
pub fn timeline(records: &[EventRecord], today: NaiveDate, include_past: bool) -> Vec<DateGroup> {
    if include_past {
        return group_by_date(records);
    }

    group_by_date(&current_or_future(records, today))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EventKind;

    fn rec(id: &str, name: &str, date: Option<&str>, time: Option<&str>) -> EventRecord {
        let mut r = EventRecord::new(id, name, EventKind::Event);
        r.date = date.map(String::from);
        r.time = time.map(String::from);
        r
    }

    fn names(group: &DateGroup) -> Vec<&str> {
        group.events.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_equal_times_keep_insertion_order() {
        let records = vec![
            rec("1", "B", Some("01/03/2025"), Some("09:00")),
            rec("2", "A", Some("01/03/2025"), Some("09:00")),
            rec("3", "C", Some("01/03/2025"), None),
        ];

        let groups = group_by_date(&records);

        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_within_day_order() {
        let records = vec![
            rec("1", "zeta", Some("2025-03-01"), None),
            rec("2", "Alpha", Some("2025-03-01"), None),
            rec("3", "late", Some("2025-03-01"), Some("18:00")),
            rec("4", "early", Some("2025-03-01"), Some("08:30")),
        ];

        let groups = group_by_date(&records);

        // Uppercase sorts before lowercase
        assert_eq!(names(&groups[0]), vec!["early", "late", "Alpha", "zeta"]);
    }

    #[test]
    fn test_groups_ascending_and_undated_last() {
        let records = vec![
            rec("1", "undated", None, None),
            rec("2", "march", Some("2025-03-01"), None),
            rec("3", "bad", Some("sometime"), None),
            rec("4", "january", Some("15/01/2025"), None),
            rec("5", "march too", Some("01/03/2025"), None),
        ];

        let groups = group_by_date(&records);

        let keys: Vec<String> = groups.iter().map(|g| g.key.to_string()).collect();
        assert_eq!(keys, vec!["2025-01-15", "2025-03-01", "no-date"]);
        assert_eq!(names(&groups[1]), vec!["march", "march too"]);
        assert_eq!(names(&groups[2]), vec!["bad", "undated"]);

        for pair in groups.windows(2) {
            assert!(pair[0].key < pair[1].key);
        }
    }

    #[test]
    fn test_group_by_date_never_drops_records() {
        let records: Vec<EventRecord> = (0..40)
            .map(|i| {
                let date = match i % 4 {
                    0 => None,
                    1 => Some(format!("{:02}/03/2025", i % 28 + 1)),
                    2 => Some(format!("2025-04-{:02}", i % 28 + 1)),
                    _ => Some("not a date".to_string()),
                };
                let mut r = rec(&i.to_string(), &format!("r{i}"), None, None);
                r.date = date;
                r
            })
            .collect();

        let groups = group_by_date(&records);

        let total: usize = groups.iter().map(|g| g.events.len()).sum();
        assert_eq!(total, records.len());
    }

    #[test]
    fn test_no_undated_group_when_all_dated() {
        let records = vec![rec("1", "a", Some("2025-03-01"), None)];
        let groups = group_by_date(&records);
        assert!(groups.iter().all(|g| g.key != DateKey::NoDate));
    }

    #[test]
    fn test_timeline_filters_past_unless_requested() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let records = vec![
            rec("1", "past", Some("2025-03-01"), None),
            rec("2", "future", Some("2025-03-20"), None),
            rec("3", "undated", None, None),
        ];

        let current = timeline(&records, today, false);
        let all = timeline(&records, today, true);

        assert_eq!(current.len(), 2);
        assert_eq!(current[0].key, DateKey::Dated(NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()));
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_date_key_serializes_as_string() {
        let key = DateKey::Dated(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2025-03-01\"");
        assert_eq!(serde_json::to_string(&DateKey::NoDate).unwrap(), "\"no-date\"");
    }
}
