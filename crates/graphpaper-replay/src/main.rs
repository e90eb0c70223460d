//! Replay a recorded pointer script through the drawing engine and print
//! the resulting graph as JSON.

mod script;

use anyhow::{Context, Result};
use clap::Parser;
use graphpaper_core::{FileStore, GraphStore};
use script::{LogView, Script};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "graphpaper-replay")]
#[command(version, about = "Replay pointer scripts through the GraphPaper drawing engine")]
struct Cli {
    /// Replay script (JSON)
    script: PathBuf,

    /// Save the resulting graph into this directory
    #[arg(long, value_name = "DIR")]
    save: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let json = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("Failed to read {}", cli.script.display()))?;
    let script = Script::from_json(&json)?;
    log::info!("Replaying {} steps from {}", script.steps.len(), cli.script.display());

    let mut graph = script::run(&script, LogView)?;

    if let Some(dir) = &cli.save {
        let store = FileStore::new(dir).with_context(|| format!("Failed to open store in {}", dir.display()))?;
        store.save(&mut graph).context("Failed to save graph")?;
    }

    println!("{}", graph.to_json().context("Failed to serialize graph")?);
    Ok(())
}
