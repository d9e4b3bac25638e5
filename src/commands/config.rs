use anyhow::Result;
use eventdir_core::EventDirConfig;
use owo_colors::OwoColorize;

pub fn run(config: &EventDirConfig) -> Result<()> {
    let config_path = EventDirConfig::config_path()?;

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!();
    println!("{}", "Effective values".bold());
    for line in config.to_display_toml()?.lines() {
        println!("  {line}");
    }

    if config.store_url.is_none() {
        println!();
        println!(
            "{}",
            "store_url is not set; use --snapshot or set EVENTDIR_STORE_URL".yellow()
        );
    }

    Ok(())
}
