//! Configuration for corpusstore

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sites::{SiteSet, SiteSetError};

/// Where the corpus lives and which domains the common-sites filter uses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Path to the line-oriented corpus file
    pub path: PathBuf,

    /// Domains for the common-sites filter
    pub sites: Vec<String>,
}

fn default_corpus_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("corpusstore")
        .join("corpus.txt")
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
            sites: Vec::new(),
        }
    }
}

impl CorpusConfig {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_from_file(config_path);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("corpusstore").join("config.yml")),
            Some(PathBuf::from("corpusstore.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Compile the configured site list
    pub fn site_set(&self) -> Result<SiteSet, SiteSetError> {
        SiteSet::new(&self.sites)
    }
}
