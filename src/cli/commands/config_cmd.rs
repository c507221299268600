//! Configuration display command.

use console::style;

use crate::config::{Config, Settings};

/// Print the effective settings as TOML.
pub async fn cmd_config_show(settings: &Settings, config: &Config) -> anyhow::Result<()> {
    match config.source_path {
        Some(ref path) => eprintln!("{} Config file: {}", style("→").dim(), path.display()),
        None => eprintln!("{} No config file found; using defaults", style("→").dim()),
    }
    print!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}
