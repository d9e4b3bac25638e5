//! Unified record types.
//!
//! Rows come out of the store as loosely-typed JSON objects ([`RawRecord`]);
//! the normalizer turns them into [`EventRecord`], the single shape every
//! view works with.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::date::{parse_date, parse_time};

/// Kind of listing shown in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Event,
    Hackathon,
    Scholarship,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Event => "event",
            EventKind::Hackathon => "hackathon",
            EventKind::Scholarship => "scholarship",
        }
    }

    /// Match an explicit `type` value, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "event" => Some(EventKind::Event),
            "hackathon" => Some(EventKind::Hackathon),
            "scholarship" => Some(EventKind::Scholarship),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical collections in the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Events,
    Hackathons,
    Scholarships,
    PartnerEvents,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Events,
        Collection::Hackathons,
        Collection::Scholarships,
        Collection::PartnerEvents,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Events => "events",
            Collection::Hackathons => "hackathons",
            Collection::Scholarships => "scholarships",
            Collection::PartnerEvents => "partner_events",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.table_name() == name)
    }

    /// Prefix added to ids so rows from secondary collections never collide
    /// with plain events.
    pub fn id_prefix(self) -> Option<&'static str> {
        match self {
            Collection::Events => None,
            Collection::Hackathons => Some("hackathon-"),
            Collection::Scholarships => Some("scholarship-"),
            Collection::PartnerEvents => Some("partner-"),
        }
    }

    /// Kind every row of a dedicated collection has, regardless of its text.
    pub fn forced_kind(self) -> Option<EventKind> {
        match self {
            Collection::Hackathons => Some(EventKind::Hackathon),
            Collection::Scholarships => Some(EventKind::Scholarship),
            Collection::Events | Collection::PartnerEvents => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

/// A row as delivered by the store, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord(pub Map<String, Value>);

impl RawRecord {
    /// First non-blank value among `keys`, as trimmed text.
    ///
    /// Numbers are rendered with their JSON representation so numeric ids
    /// and years survive. Whitespace-only strings count as absent.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
            Some(Value::Number(n)) => n.as_i64() == Some(1),
            _ => false,
        }
    }

    /// A list-valued field delivered either as a JSON array or as a
    /// JSON-encoded string. Anything unparseable is an empty list.
    pub fn string_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => collect_strings(items),
            Some(Value::String(s)) => match serde_json::from_str::<Value>(s) {
                Ok(Value::Array(items)) => collect_strings(&items),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }

    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        let raw = self.text(&[key])?;
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Some(dt.with_timezone(&Utc));
        }
        // Postgres `timestamptz` text form: "2025-01-02 03:04:05.678+00"
        DateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f%#z")
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn collect_strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
        .collect()
}

impl<const N: usize> From<[(&str, Value); N]> for RawRecord {
    fn from(fields: [(&str, Value); N]) -> Self {
        RawRecord(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}

/// A normalized listing: event, hackathon or scholarship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Unique across every collection merged into one view
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub source: Collection,

    /// Raw start date, in whatever encoding the store had
    pub date: Option<String>,
    /// Canonical `HH:MM`
    pub time: Option<String>,
    pub end_date: Option<String>,
    pub end_time: Option<String>,
    pub signup_deadline: Option<String>,

    pub location: Option<String>,
    pub format: Option<String>,
    pub organizer: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub prizes: Option<String>,
    #[serde(default)]
    pub study_level: Vec<String>,
    #[serde(default)]
    pub fields_of_study: Vec<String>,

    #[serde(default)]
    pub is_highlight: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl EventRecord {
    /// Minimal record, mostly useful for building fixtures.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: EventKind) -> Self {
        EventRecord {
            id: id.into(),
            name: name.into(),
            kind,
            source: Collection::Events,
            date: None,
            time: None,
            end_date: None,
            end_time: None,
            signup_deadline: None,
            location: None,
            format: None,
            organizer: None,
            description: None,
            link: None,
            prizes: None,
            study_level: Vec::new(),
            fields_of_study: Vec::new(),
            is_highlight: false,
            created_at: None,
        }
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        parse_date(self.date.as_deref())
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        parse_date(self.end_date.as_deref())
    }

    pub fn has_time(&self) -> bool {
        self.time.as_deref().and_then(parse_time).is_some()
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
