//! Configuration management for the BISSAP CLI.

use anyhow::{Context, Result};
use bissap_core::candidates::CandidateFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "bissap.toml";

/// BISSAP project configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub candidates: CandidatesConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatesConfig {
    #[serde(default = "default_fdr_threshold")]
    pub fdr_threshold: f64,
    #[serde(default)]
    pub min_coverage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_prune")]
    pub prune: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_top")]
    pub top: usize,
    #[serde(default = "default_show_elements")]
    pub show_elements: bool,
}

fn default_fdr_threshold() -> f64 { 0.05 }
fn default_prune() -> bool { true }
fn default_top() -> usize { 10 }
fn default_show_elements() -> bool { true }

impl Default for CandidatesConfig {
    fn default() -> Self {
        Self {
            fdr_threshold: default_fdr_threshold(),
            min_coverage: 0.0,
            namespace: None,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            prune: default_prune(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top: default_top(),
            show_elements: default_show_elements(),
        }
    }
}

impl CandidatesConfig {
    pub fn filter(&self) -> CandidateFilter {
        CandidateFilter {
            fdr_threshold: Some(self.fdr_threshold),
            min_coverage: self.min_coverage,
            namespace: self.namespace.clone(),
        }
    }
}

impl Config {
    /// Load config from bissap.toml in the current or parent directories.
    pub fn load() -> Result<Self> {
        match find_config_file() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Find bissap.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let dir = std::env::current_dir().ok()?;
    find_config_from(dir)
}

fn find_config_from(mut dir: PathBuf) -> Option<PathBuf> {
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!((config.candidates.fdr_threshold - 0.05).abs() < 1e-12);
        assert!(config.summary.prune);
        assert_eq!(config.report.top, 10);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: Config = toml::from_str(
            "[candidates]\nnamespace = \"biological_process\"\n\n[report]\ntop = 3\n",
        )
        .unwrap();
        assert_eq!(
            config.candidates.namespace.as_deref(),
            Some("biological_process")
        );
        assert!((config.candidates.fdr_threshold - 0.05).abs() < 1e-12);
        assert_eq!(config.report.top, 3);
        assert!(config.report.show_elements);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let mut config = Config::default();
        config.summary.prune = false;
        config.candidates.min_coverage = 0.2;
        config.save(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn lookup_walks_up_to_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        Config::default().save(&dir.path().join(CONFIG_FILE)).unwrap();

        let found = find_config_from(nested).unwrap();
        assert_eq!(found, dir.path().join(CONFIG_FILE));
    }

    #[test]
    fn filter_carries_thresholds() {
        let filter = CandidatesConfig::default().filter();
        assert_eq!(filter.fdr_threshold, Some(0.05));
        assert_eq!(filter.min_coverage, 0.0);
        assert!(filter.namespace.is_none());
    }
}
