//! Mapping raw store rows onto [`EventRecord`].

use std::collections::HashSet;

use tracing::warn;

use crate::date::normalize_time;
use crate::record::{Collection, EventKind, EventRecord, RawRecord};

/// Ordered classification rules: the first rule with a matching marker wins.
/// Hackathon markers come first so "hackathon scholarship" is a hackathon.
const KIND_RULES: &[(EventKind, &[&str])] = &[
    (
        EventKind::Hackathon,
        &["hackathon", "hack week", "hack weekend", "hack day"],
    ),
    (EventKind::Scholarship, &["scholarship", "stipend"]),
];

/// Resolve the kind of a listing.
///
/// An explicit, recognised `type` wins. Otherwise the name and description
/// are scanned against [`KIND_RULES`], defaulting to a plain event.
pub fn classify(explicit: Option<&str>, name: &str, description: Option<&str>) -> EventKind {
    if let Some(kind) = explicit.and_then(EventKind::from_label) {
        return kind;
    }

    let haystack = format!("{} {}", name, description.unwrap_or_default()).to_lowercase();

    KIND_RULES
        .iter()
        .find(|(_, markers)| markers.iter().any(|m| haystack.contains(m)))
        .map(|(kind, _)| *kind)
        .unwrap_or(EventKind::Event)
}

/// Normalize one row from `collection`.
pub fn normalize(raw: &RawRecord, collection: Collection) -> EventRecord {
    let name = raw.text(&["name", "title"]).unwrap_or_default();
    let description = raw.text(&["description"]);

    let kind = collection.forced_kind().unwrap_or_else(|| {
        classify(raw.text(&["type"]).as_deref(), &name, description.as_deref())
    });

    let base_id = raw.text(&["id"]).unwrap_or_else(|| {
        let generated = uuid::Uuid::new_v4().simple().to_string();
        warn!(%collection, name = %name, "row without id, generated {generated}");
        generated
    });
    let id = match collection.id_prefix() {
        Some(prefix) => format!("{prefix}{base_id}"),
        None => base_id,
    };

    EventRecord {
        id,
        name,
        kind,
        source: collection,
        date: raw.text(&["date", "start_date"]),
        time: raw
            .text(&["time", "start_time"])
            .as_deref()
            .and_then(normalize_time),
        end_date: raw.text(&["end_date"]),
        end_time: raw.text(&["end_time"]).as_deref().and_then(normalize_time),
        signup_deadline: raw.text(&["signup_deadline"]),
        location: raw.text(&["location"]),
        format: raw.text(&["format"]),
        organizer: raw.text(&["organizer", "organisers", "provider"]),
        description,
        link: raw.text(&["link", "url"]),
        prizes: raw.text(&["prizes"]),
        study_level: raw.string_list("study_level"),
        fields_of_study: raw.string_list("fields_of_study"),
        is_highlight: raw.flag("is_highlight"),
        created_at: raw.timestamp("created_at"),
    }
}

/// Normalize every row of one collection.
pub fn normalize_all(rows: &[RawRecord], collection: Collection) -> Vec<EventRecord> {
    rows.iter().map(|raw| normalize(raw, collection)).collect()
}

/// Concatenate normalized collections, keeping the first record for any id.
pub fn merge<I>(collections: I) -> Vec<EventRecord>
where
    I: IntoIterator<Item = Vec<EventRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for record in collections.into_iter().flatten() {
        if seen.insert(record.id.clone()) {
            merged.push(record);
        } else {
            warn!(id = %record.id, "dropping record with duplicate id");
        }
    }

    merged
}
