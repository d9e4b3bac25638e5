//! Core of the eventdir student-tech directory.
//!
//! Loosely-typed rows from the hosted store are normalized into
//! [`EventRecord`]s and projected into three views:
//! - the timeline, grouped by calendar day
//! - a Monday-first month grid with multi-day spans
//! - a seven-day week grid
//!
//! Single records can be exported as `.ics` files.

pub mod config;
pub mod date;
pub mod error;
pub mod filter;
pub mod grid;
pub mod ics;
pub mod normalize;
pub mod record;
pub mod store;
pub mod timeline;
pub mod view;

pub use crate::config::EventDirConfig;
pub use date::{ParsedDate, parse_date, parse_flexible_date, today_local};
pub use error::{EventDirError, EventDirResult};
pub use grid::{CalendarMode, GridOptions, MonthGrid, WeekGrid, build_month_grid, build_week_grid};
pub use record::{Collection, EventKind, EventRecord, RawRecord};
pub use store::{ChangeNotice, Directory, HttpStore, MemoryStore, RecordStore, Subscription};
pub use timeline::{DateGroup, DateKey, timeline};
pub use view::{CalendarNav, Layout, Projection, Step, Tab, ViewAction, ViewState};
