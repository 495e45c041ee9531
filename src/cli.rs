use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a one-day meal plan
    Day {
        /// Path to the request JSON file
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Generate a seven-day meal plan
    Week {
        /// Path to the request JSON file
        #[arg(short, long)]
        request: PathBuf,
    },
    /// Build a shopping list from a previously generated plan
    ShoppingList {
        /// Path to the plan JSON file
        #[arg(short, long)]
        plan: PathBuf,
    },
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Reads and parses a JSON file.
pub async fn load_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("'{}' is not valid JSON", path.display()))
}
