use anyhow::Result;
use eventdir_core::grid::build_month_grid_with;
use eventdir_core::view::{CalendarNav, Step};
use eventdir_core::{CalendarMode, GridOptions, today_local};

use crate::render::render_month;
use crate::source::Source;

/// Resolve the month to show from the flags, starting at the current month.
fn target_month(
    today: chrono::NaiveDate,
    month: Option<u32>,
    year: Option<i32>,
    next: Option<u32>,
    prev: Option<u32>,
) -> Result<CalendarNav> {
    let mut nav = CalendarNav::today(CalendarMode::Month, today);

    if let Some(month) = month {
        if !(1..=12).contains(&month) {
            anyhow::bail!("Month must be between 1 and 12, got {month}");
        }
        nav.month = month;
    }
    if let Some(year) = year {
        nav.year = year;
    }

    let (step, count) = match (next, prev) {
        (Some(n), _) => (Step::Next, n),
        (None, Some(n)) => (Step::Previous, n),
        (None, None) => (Step::Next, 0),
    };
    for _ in 0..count {
        nav = nav.step(step);
    }

    Ok(nav)
}

pub async fn run(
    source: &Source,
    options: &GridOptions,
    month: Option<u32>,
    year: Option<i32>,
    next: Option<u32>,
    prev: Option<u32>,
) -> Result<()> {
    let today = today_local();
    let nav = target_month(today, month, year, next, prev)?;

    let records = source.load().await?;
    let grid = build_month_grid_with(&records, nav.year, nav.month, options)
        .ok_or_else(|| anyhow::anyhow!("Invalid month {}-{:02}", nav.year, nav.month))?;

    println!("{}", render_month(&grid, today));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 20).unwrap()
    }

    #[test]
    fn test_target_month_defaults_to_current() {
        let nav = target_month(today(), None, None, None, None).unwrap();
        assert_eq!((nav.year, nav.month), (2025, 11));
    }

    #[test]
    fn test_target_month_steps_across_years() {
        let nav = target_month(today(), None, None, Some(3), None).unwrap();
        assert_eq!((nav.year, nav.month), (2026, 2));

        let nav = target_month(today(), Some(1), Some(2025), None, Some(1)).unwrap();
        assert_eq!((nav.year, nav.month), (2024, 12));
    }

    #[test]
    fn test_target_month_rejects_bad_month() {
        assert!(target_month(today(), Some(13), None, None, None).is_err());
    }
}
