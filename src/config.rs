use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: General,
    pub source: Source,
    pub snapshot: SnapshotConfig,
}

#[derive(Debug, Deserialize)]
pub struct General {
    /// Used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Where contract logs come from.
#[derive(Debug, Deserialize)]
pub struct Source {
    /// Newline-delimited JSON, one log per line, in chain order
    pub events_path: PathBuf,
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    /// Continue from an existing snapshot instead of starting empty
    #[serde(default = "default_resume")]
    pub resume: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_channel_capacity() -> usize {
    100
}

fn default_resume() -> bool {
    true
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.source.channel_capacity == 0 {
            anyhow::bail!("source.channel_capacity must be at least 1");
        }
        Ok(config)
    }
}
