use anyhow::{anyhow, Result};
use jgrid_cli::cli::ConfigCommands;
use jgrid_io::GridConfig;
use serde_json::Value;

pub fn handle(command: &ConfigCommands, config: &GridConfig) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommands::Get { key } => {
            let value = config
                .get(key)
                .ok_or_else(|| anyhow!("unknown configuration key '{key}'"))?;
            match value {
                Value::String(text) => println!("{text}"),
                other => println!("{}", serde_json::to_string_pretty(&other)?),
            }
        }
        ConfigCommands::Save { path } => {
            config.save_to(path)?;
            println!("Configuration written to {}", path.display());
        }
    }
    Ok(())
}
