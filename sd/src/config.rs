//! siftdaemon configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use corpusstore::config::CorpusConfig;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::assembler::AssemblyOptions;
use crate::dispatch::DEFAULT_CHANNEL_BUFFER;
use crate::session::DialogSettings;

/// Main siftdaemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Corpus location and the common-sites list
    pub corpus: CorpusConfig,

    /// Per-session runtime limits
    pub session: SessionConfig,

    /// Result file settings
    pub artifact: ArtifactConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_paths() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Never fails; any problem just means "no level configured".
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let paths: Vec<PathBuf> = match config_path {
            Some(path) => vec![path.clone()],
            None => Self::default_paths(),
        };

        paths
            .iter()
            .find(|p| p.exists())
            .and_then(|p| fs::read_to_string(p).ok())
            .and_then(|content| serde_yaml::from_str::<Self>(&content).ok())
            .and_then(|config| config.log_level)
    }

    /// `./.siftdaemon.yml`, then `<config_dir>/siftdaemon/siftdaemon.yml`
    fn default_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(".siftdaemon.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("siftdaemon").join("siftdaemon.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Settings handed to every session
    pub fn dialog_settings(&self) -> DialogSettings {
        DialogSettings {
            search_timeout: self.session.search_timeout(),
            assembly: AssemblyOptions {
                signature: self.artifact.signature.clone(),
            },
        }
    }
}

/// Per-session runtime limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound on a single search; 0 disables the bound
    #[serde(rename = "search-timeout-ms")]
    pub search_timeout_ms: u64,

    /// Capacity of the dispatcher's inbound queue
    #[serde(rename = "channel-buffer")]
    pub channel_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            search_timeout_ms: 120_000,
            channel_buffer: DEFAULT_CHANNEL_BUFFER,
        }
    }
}

impl SessionConfig {
    pub fn search_timeout(&self) -> Option<Duration> {
        (self.search_timeout_ms > 0).then(|| Duration::from_millis(self.search_timeout_ms))
    }
}

/// Result file settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Where the console transport saves result files
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Optional footer line for every result file
    pub signature: Option<String>,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("siftdaemon")
                .join("results"),
            signature: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.log_level.is_none());
        assert!(config.corpus.sites.is_empty());
        assert_eq!(config.session.search_timeout_ms, 120_000);
        assert_eq!(config.session.channel_buffer, 256);
        assert!(config.artifact.output_dir.ends_with("results"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
log-level: debug
corpus:
  path: /srv/lines.txt
  sites:
    - example.com
session:
  search-timeout-ms: 0
artifact:
  signature: "Results service"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.corpus.path, PathBuf::from("/srv/lines.txt"));
        assert_eq!(config.corpus.sites, vec!["example.com"]);
        assert_eq!(config.session.search_timeout(), None);
        assert_eq!(config.session.channel_buffer, 256);

        let settings = config.dialog_settings();
        assert_eq!(settings.search_timeout, None);
        assert_eq!(settings.assembly.signature.as_deref(), Some("Results service"));
    }

    #[test]
    fn test_search_timeout_from_millis() {
        let session = SessionConfig {
            search_timeout_ms: 1500,
            channel_buffer: 8,
        };
        assert_eq!(session.search_timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_load_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sd.yml");
        fs::write(&path, "corpus:\n  path: /tmp/c.txt\nsession:\n  channel-buffer: 4\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.corpus.path, PathBuf::from("/tmp/c.txt"));
        assert_eq!(config.session.channel_buffer, 4);
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_log_level() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sd.yml");
        fs::write(&path, "log-level: WARN\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("WARN"));

        fs::write(&path, "log-level: [not, a, string\n").unwrap();
        assert_eq!(Config::load_log_level(Some(&path)), None);
    }
}
