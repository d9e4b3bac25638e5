//! ICS file generation for a single directory record.

use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone, Utc};
use icalendar::{Calendar, Component, EventLike, Property};

use crate::date::parse_time;
use crate::error::{EventDirError, EventDirResult};
use crate::record::EventRecord;

const DEFAULT_START: (u32, u32) = (10, 0);
const UID_DOMAIN: &str = "eventdir";

/// Generate a `VCALENDAR` with one `VEVENT` for `record`, interpreting its
/// date and time in the local timezone.
pub fn generate_ics(record: &EventRecord) -> EventDirResult<String> {
    generate_ics_in(record, &Local, Utc::now())
}

/// Like [`generate_ics`], with the zone and the `DTSTAMP` clock supplied.
///
/// Records without a time start at 10:00. The event always lasts one hour.
/// Nothing is returned unless the whole calendar could be produced.
pub fn generate_ics_in<Tz: TimeZone>(
    record: &EventRecord,
    tz: &Tz,
    now: DateTime<Utc>,
) -> EventDirResult<String> {
    if record.name.trim().is_empty() {
        return Err(EventDirError::Export(format!(
            "record '{}' has no name",
            record.id
        )));
    }

    let date = record.start_date().ok_or_else(|| {
        EventDirError::Export(format!("'{}' has no valid start date", record.name))
    })?;

    let time = record
        .time
        .as_deref()
        .and_then(parse_time)
        .or_else(|| NaiveTime::from_hms_opt(DEFAULT_START.0, DEFAULT_START.1, 0))
        .ok_or_else(|| EventDirError::Export("invalid default start time".into()))?;

    let start = tz
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .ok_or_else(|| {
            EventDirError::Export(format!(
                "'{}' starts at a local time that does not exist",
                record.name
            ))
        })?
        .with_timezone(&Utc);
    let end = start.checked_add_signed(Duration::hours(1)).ok_or_else(|| {
        EventDirError::Export(format!("'{}' ends after the last supported date", record.name))
    })?;

    let mut cal = Calendar::new();

    let mut ics_event = icalendar::Event::new();
    ics_event.uid(&generate_uid(now));
    ics_event.add_property("DTSTAMP", format_utc(now));
    ics_event.add_property("DTSTART", format_utc(start));
    ics_event.add_property("DTEND", format_utc(end));
    ics_event.summary(&plain_newlines(&record.name));

    if let Some(ref desc) = record.description {
        ics_event.description(&plain_newlines(desc));
    }

    if let Some(ref loc) = record.location {
        ics_event.location(&plain_newlines(loc));
    }

    // No email address is known, so the name goes in CN with a placeholder address
    if let Some(ref organizer) = record.organizer {
        let mut prop = Property::new("ORGANIZER", format!("mailto:noreply@{UID_DOMAIN}"));
        prop.add_parameter("CN", &organizer.replace('"', "'"));
        ics_event.append_property(prop);
    }

    if let Some(ref link) = record.link {
        ics_event.add_property("URL", link);
    }

    cal.push(ics_event.done());
    let cal = cal.done();

    Ok(strip_ics_bloat(&cal.to_string()))
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with EVENTDIR and announce METHOD:PUBLISH after it
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:EVENTDIR\r\nMETHOD:PUBLISH\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}

/// Text values are escaped by icalendar, which only knows `\n` line breaks.
fn plain_newlines(value: &str) -> String {
    value.replace("\r\n", "\n").replace('\r', "\n")
}

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}

fn generate_uid(now: DateTime<Utc>) -> String {
    format!(
        "{}-{}@{UID_DOMAIN}",
        now.timestamp_millis(),
        &uuid::Uuid::new_v4().simple().to_string()[..12]
    )
}
