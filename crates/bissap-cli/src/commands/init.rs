//! Initialize a new BISSAP project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir().context("Failed to resolve current directory")?,
    };

    println!("{} Initializing BISSAP project...", "→".blue());
    let created = write_default_config(&base_path)?;
    let config_path = base_path.join(CONFIG_FILE);
    if created {
        println!("  {} Created {}", "✓".green(), config_path.display());
    } else {
        println!("  {} {} already exists", "•".yellow(), config_path.display());
    }

    println!();
    println!("{} BISSAP project initialized!", "✓".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  {} bissap inspect study.txt --graph go.json --annotations annotations.json",
        "1.".blue()
    );
    println!(
        "  {} bissap summarize study.txt --graph go.json --annotations annotations.json",
        "2.".blue()
    );

    Ok(())
}

/// Write the default config unless one is already there. Returns whether a
/// file was written.
fn write_default_config(base_path: &Path) -> Result<bool> {
    std::fs::create_dir_all(base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;
    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() {
        return Ok(false);
    }
    Config::default().save(&config_path)?;
    Ok(true)
}
