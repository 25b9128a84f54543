use anyhow::{Context, Result};
use colored::Colorize;
use proctor_infrastructure::TomlSettingsStore;

pub fn show() -> Result<()> {
    let store = TomlSettingsStore::new()?;
    let config = store.load()?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render settings")?;

    println!("{}", format!("# {}", store.path().display()).bright_black());
    if config.backend.is_offline() {
        println!("{}", "# backend.url is empty: offline mode".bright_black());
    }
    println!("{}", rendered);
    Ok(())
}

pub fn init() -> Result<()> {
    let store = TomlSettingsStore::new()?;
    if store.ensure_exists()? {
        println!(
            "{}",
            format!("Created {}", store.path().display()).bright_green()
        );
    } else {
        println!(
            "{}",
            format!("{} already exists", store.path().display()).yellow()
        );
    }
    Ok(())
}

pub fn path() -> Result<()> {
    let store = TomlSettingsStore::new()?;
    println!("{}", store.path().display());
    Ok(())
}
