use anyhow::Result;
use chrono::Local;
use eventdir_core::{Collection, Directory, timeline, today_local};
use owo_colors::OwoColorize;
use tracing::info;

use crate::render::render_timeline;
use crate::source::Source;

fn print_timeline(directory: &Directory) {
    let today = today_local();
    let stamp = Local::now().format("%H:%M:%S").to_string();

    println!("{}", format!("Updated {stamp}").dimmed());
    let groups = timeline(directory.records(), today, false);
    println!("{}", render_timeline(&groups, today, false));
}

pub async fn run(source: &Source) -> Result<()> {
    let mut directory = Directory::default();
    let records = source.load().await?;
    directory.apply(Ok(records))?;
    print_timeline(&directory);

    let mut subscription = source.store().subscribe(&Collection::ALL).await?;
    info!("Watching {} for changes", source.label());

    loop {
        tokio::select! {
            notice = subscription.next() => {
                let Some(notice) = notice else {
                    anyhow::bail!("Change feed closed");
                };
                let skipped = subscription.coalesce();
                info!(collection = %notice.collection, skipped, "Change received, refreshing");

                match directory.refresh(source.store(), &Collection::ALL).await {
                    Ok(_) => {
                        println!();
                        print_timeline(&directory);
                    }
                    Err(e) => println!("{}", e.to_string().red()),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    subscription.unsubscribe();
    Ok(())
}
