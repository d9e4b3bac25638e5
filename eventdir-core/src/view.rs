//! View state and its transitions.
//!
//! The whole UI state is one serializable value; every user action is a
//! pure function from the old state (plus today's date) to the new one.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::monday_of;
use crate::grid::{
    CalendarMode, GridOptions, MonthGrid, WeekGrid, build_month_grid_with, build_week_grid_with,
};
use crate::record::{EventKind, EventRecord};
use crate::timeline::{DateGroup, timeline};

/// Calendar navigation anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarNav {
    pub mode: CalendarMode,
    pub year: i32,
    /// 1-based
    pub month: u32,
    /// Always a Monday
    pub week_start: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Next,
    Previous,
}

impl CalendarNav {
    /// The only way into calendar mode: anchored on the current month and
    /// the week containing `today`.
    pub fn today(mode: CalendarMode, today: NaiveDate) -> Self {
        CalendarNav {
            mode,
            year: today.year(),
            month: today.month(),
            // Only the earliest representable week has no Monday
            week_start: monday_of(today).unwrap_or(today),
        }
    }

    pub fn step(self, step: Step) -> Self {
        match (self.mode, step) {
            (CalendarMode::Month, Step::Next) => self.next_month(),
            (CalendarMode::Month, Step::Previous) => self.previous_month(),
            (CalendarMode::Week, Step::Next) => self.shift_week(7),
            (CalendarMode::Week, Step::Previous) => self.shift_week(-7),
        }
    }

    pub fn next(self) -> Self {
        self.step(Step::Next)
    }

    pub fn previous(self) -> Self {
        self.step(Step::Previous)
    }

    fn next_month(self) -> Self {
        let (year, month) = if self.month == 12 {
            (self.year.saturating_add(1), 1)
        } else {
            (self.year, self.month + 1)
        };
        CalendarNav { year, month, ..self }
    }

    fn previous_month(self) -> Self {
        let (year, month) = if self.month == 1 {
            (self.year.saturating_sub(1), 12)
        } else {
            (self.year, self.month - 1)
        };
        CalendarNav { year, month, ..self }
    }

    /// Stays put at either end of the representable range.
    fn shift_week(self, days: i64) -> Self {
        match self.week_start.checked_add_signed(Duration::days(days)) {
            Some(week_start) => CalendarNav { week_start, ..self },
            None => self,
        }
    }
}

/// Directory tab: which kinds of listing are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    All,
    Events,
    Hackathons,
    Scholarships,
}

impl Tab {
    pub fn matches(self, kind: EventKind) -> bool {
        match self {
            Tab::All => true,
            Tab::Events => kind == EventKind::Event,
            Tab::Hackathons => kind == EventKind::Hackathon,
            Tab::Scholarships => kind == EventKind::Scholarship,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Timeline,
    Calendar(CalendarNav),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum ViewAction {
    SelectTab(Tab),
    Select(String),
    ClearSelection,
    ShowTimeline,
    ShowCalendar(CalendarMode),
    Navigate(Step),
    TogglePast,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewState {
    pub tab: Tab,
    pub layout: Layout,
    /// Id of the record whose details are open
    pub selected: Option<String>,
    /// Timeline only: include records that have already ended
    pub show_past: bool,
}

impl ViewState {
    pub fn reduce(&self, action: ViewAction, today: NaiveDate) -> ViewState {
        let mut next = self.clone();

        match action {
            ViewAction::SelectTab(tab) => {
                next.tab = tab;
                next.selected = None;
            }
            ViewAction::Select(id) => next.selected = Some(id),
            ViewAction::ClearSelection => next.selected = None,
            ViewAction::ShowTimeline => next.layout = Layout::Timeline,
            ViewAction::ShowCalendar(mode) => {
                next.layout = Layout::Calendar(CalendarNav::today(mode, today));
            }
            ViewAction::Navigate(step) => {
                if let Layout::Calendar(nav) = self.layout {
                    next.layout = Layout::Calendar(nav.step(step));
                }
            }
            ViewAction::TogglePast => next.show_past = !self.show_past,
        }

        next
    }

    pub fn visible_records(&self, records: &[EventRecord]) -> Vec<EventRecord> {
        records
            .iter()
            .filter(|r| self.tab.matches(r.kind))
            .cloned()
            .collect()
    }

    /// The selected record, if it is still present in `records`.
    pub fn selected_record<'a>(&self, records: &'a [EventRecord]) -> Option<&'a EventRecord> {
        let id = self.selected.as_deref()?;
        records.iter().find(|r| r.id == id)
    }

    /// Project `records` through the current tab and layout.
    ///
    /// The calendar always receives the unfiltered set so earlier months
    /// still show past events. Returns `None` when the calendar anchor lies
    /// outside the dates a grid can be built for.
    pub fn project(
        &self,
        records: &[EventRecord],
        today: NaiveDate,
        options: &GridOptions,
    ) -> Option<Projection> {
        let visible = self.visible_records(records);

        match self.layout {
            Layout::Timeline => Some(Projection::Timeline(timeline(
                &visible,
                today,
                self.show_past,
            ))),
            Layout::Calendar(nav) => match nav.mode {
                CalendarMode::Month => {
                    build_month_grid_with(&visible, nav.year, nav.month, options)
                        .map(Projection::Month)
                }
                CalendarMode::Week => {
                    build_week_grid_with(&visible, nav.week_start, options).map(Projection::Week)
                }
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", content = "data", rename_all = "lowercase")]
pub enum Projection {
    Timeline(Vec<DateGroup>),
    Month(MonthGrid),
    Week(WeekGrid),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_nav_today_anchors_on_month_and_monday() {
        let nav = CalendarNav::today(CalendarMode::Week, ymd(2025, 10, 16));
        assert_eq!((nav.year, nav.month), (2025, 10));
        assert_eq!(nav.week_start, ymd(2025, 10, 13));
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let nav = CalendarNav::today(CalendarMode::Month, ymd(2025, 12, 5));

        let next = nav.next();
        assert_eq!((next.year, next.month), (2026, 1));

        let back = next.previous().previous();
        assert_eq!((back.year, back.month), (2025, 11));

        let january = CalendarNav::today(CalendarMode::Month, ymd(2025, 1, 5)).previous();
        assert_eq!((january.year, january.month), (2024, 12));
    }

    #[test]
    fn test_week_navigation_shifts_seven_days() {
        let nav = CalendarNav::today(CalendarMode::Week, ymd(2025, 12, 31));
        assert_eq!(nav.next().week_start, ymd(2026, 1, 5));
        assert_eq!(nav.previous().week_start, ymd(2025, 12, 22));
        // Month anchor untouched by week steps
        assert_eq!(nav.next().month, 12);
    }

    #[test]
    fn test_show_calendar_always_starts_at_today() {
        let today = ymd(2025, 6, 18);
        let state = ViewState::default()
            .reduce(ViewAction::ShowCalendar(CalendarMode::Month), today)
            .reduce(ViewAction::Navigate(Step::Next), today)
            .reduce(ViewAction::Navigate(Step::Next), today)
            .reduce(ViewAction::ShowTimeline, today)
            .reduce(ViewAction::ShowCalendar(CalendarMode::Month), today);

        assert_eq!(
            state.layout,
            Layout::Calendar(CalendarNav::today(CalendarMode::Month, today))
        );
    }

    #[test]
    fn test_navigate_is_ignored_on_timeline() {
        let state = ViewState::default();
        let next = state.reduce(ViewAction::Navigate(Step::Next), ymd(2025, 1, 1));
        assert_eq!(next, state);
    }

    #[test]
    fn test_tab_change_clears_selection() {
        let today = ymd(2025, 1, 1);
        let state = ViewState::default()
            .reduce(ViewAction::Select("hackathon-1".into()), today)
            .reduce(ViewAction::SelectTab(Tab::Scholarships), today);

        assert_eq!(state.tab, Tab::Scholarships);
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_visible_records_filters_by_tab() {
        let records = vec![
            EventRecord::new("1", "a", EventKind::Event),
            EventRecord::new("hackathon-2", "b", EventKind::Hackathon),
            EventRecord::new("scholarship-3", "c", EventKind::Scholarship),
        ];
        let state = ViewState {
            tab: Tab::Hackathons,
            ..ViewState::default()
        };

        let visible = state.visible_records(&records);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "hackathon-2");
    }

    #[test]
    fn test_calendar_projection_includes_past_events() {
        let today = ymd(2025, 3, 20);
        let mut past = EventRecord::new("1", "past", EventKind::Event);
        past.date = Some("2025-03-01".into());

        let state = ViewState::default()
            .reduce(ViewAction::ShowCalendar(CalendarMode::Month), today);

        match state.project(&[past.clone()], today, &GridOptions::default()) {
            Some(Projection::Month(grid)) => assert_eq!(grid.cell(1).unwrap().entries.len(), 1),
            other => panic!("expected month projection, got {other:?}"),
        }

        let timeline_state = ViewState::default();
        match timeline_state.project(&[past], today, &GridOptions::default()) {
            Some(Projection::Timeline(groups)) => assert!(groups.is_empty()),
            other => panic!("expected timeline projection, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_range_calendar_projects_nothing() {
        let today = ymd(2025, 3, 20);
        let month = ViewState {
            layout: Layout::Calendar(CalendarNav {
                mode: CalendarMode::Month,
                year: 300_000,
                month: 6,
                week_start: monday_of(today).unwrap(),
            }),
            ..ViewState::default()
        };
        assert_eq!(month.project(&[], today, &GridOptions::default()), None);

        let week = ViewState {
            layout: Layout::Calendar(CalendarNav {
                mode: CalendarMode::Week,
                year: 2025,
                month: 3,
                week_start: NaiveDate::MAX,
            }),
            ..ViewState::default()
        };
        assert_eq!(week.project(&[], today, &GridOptions::default()), None);
    }

    #[test]
    fn test_week_navigation_stops_at_the_last_date() {
        let nav = CalendarNav {
            mode: CalendarMode::Week,
            year: 2025,
            month: 3,
            week_start: NaiveDate::MAX,
        };
        assert_eq!(nav.next(), nav);
    }

    #[test]
    fn test_view_state_round_trips_through_json() {
        let state = ViewState::default()
            .reduce(ViewAction::ShowCalendar(CalendarMode::Week), ymd(2025, 3, 5))
            .reduce(ViewAction::Select("7".into()), ymd(2025, 3, 5));

        let json = serde_json::to_string(&state).unwrap();
        let back: ViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
