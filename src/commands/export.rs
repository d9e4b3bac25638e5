use std::path::PathBuf;

use anyhow::Result;
use eventdir_core::ics::generate_ics;
use eventdir_core::{EventDirError, EventRecord};
use owo_colors::OwoColorize;

use crate::source::Source;

fn find<'a>(records: &'a [EventRecord], id: &str) -> Result<&'a EventRecord, EventDirError> {
    records
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| EventDirError::RecordNotFound(id.to_string()))
}

/// Default file name for a record, safe on every platform.
fn default_file_name(id: &str) -> PathBuf {
    let safe: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    PathBuf::from(format!("{safe}.ics"))
}

pub async fn run(source: &Source, id: &str, output: Option<PathBuf>) -> Result<()> {
    let records = source.load().await?;
    let record = find(&records, id)?;

    let ics = generate_ics(record)?;
    let path = output.unwrap_or_else(|| default_file_name(id));
    std::fs::write(&path, ics)?;

    println!("{} {} {}", "Exported".green(), record.name.bold(), path.display().dimmed());
    Ok(())
}
