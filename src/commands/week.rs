use anyhow::Result;
use chrono::NaiveDate;
use eventdir_core::date::monday_of;
use eventdir_core::grid::build_week_grid_with;
use eventdir_core::{GridOptions, parse_flexible_date, today_local};

use crate::render::render_week;
use crate::source::Source;

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    const ABBREVIATIONS: [(&str, &str); 16] = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("tmrw", "tomorrow"),
        ("jan", "january"),
        ("feb", "february"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            ABBREVIATIONS
                .iter()
                .find(|(short, _)| *short == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve `--on`: directory date formats first, then natural language.
fn resolve_date(input: &str) -> Result<NaiveDate> {
    if let Some(date) = parse_flexible_date(input).date() {
        return Ok(date);
    }

    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow::anyhow!("Could not parse date: \"{}\"", input))?;

    Ok(dt.date())
}

pub async fn run(source: &Source, options: &GridOptions, on: Option<&str>) -> Result<()> {
    let today = today_local();
    let anchor = match on {
        Some(input) => resolve_date(input)?,
        None => today,
    };

    let Some(week_start) = monday_of(anchor) else {
        anyhow::bail!("No week starts before {anchor}");
    };

    let records = source.load().await?;
    let Some(grid) = build_week_grid_with(&records, week_start, options) else {
        anyhow::bail!("The week of {anchor} runs past the last supported date");
    };

    println!("{}", render_week(&grid, today));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_abbreviations() {
        assert_eq!(expand_abbreviations("Next Fri"), "next friday");
        assert_eq!(expand_abbreviations("dec 3"), "december 3");
    }

    #[test]
    fn test_resolve_date_accepts_directory_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 12, 3).unwrap();
        assert_eq!(resolve_date("03/12/2025").unwrap(), expected);
        assert_eq!(resolve_date("2025-12-03").unwrap(), expected);
    }
}
