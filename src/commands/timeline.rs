use anyhow::Result;
use eventdir_core::view::{Projection, Tab, ViewState};
use eventdir_core::{EventKind, GridOptions, today_local};

use crate::render::render_timeline;
use crate::source::Source;

fn tab_for(kind: Option<EventKind>) -> Tab {
    match kind {
        None => Tab::All,
        Some(EventKind::Event) => Tab::Events,
        Some(EventKind::Hackathon) => Tab::Hackathons,
        Some(EventKind::Scholarship) => Tab::Scholarships,
    }
}

pub async fn run(source: &Source, all: bool, kind: Option<EventKind>) -> Result<()> {
    let records = source.load().await?;
    let today = today_local();

    let state = ViewState {
        tab: tab_for(kind),
        show_past: all,
        ..ViewState::default()
    };

    match state.project(&records, today, &GridOptions::default()) {
        Some(Projection::Timeline(groups)) => {
            println!("{}", render_timeline(&groups, today, all));
            Ok(())
        }
        _ => anyhow::bail!("Timeline could not be built"),
    }
}
