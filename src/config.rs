use anyhow::{bail, Context, Result};
use docsift_core::matcher::SearchOptions;
use serde::Deserialize;
use std::path::Path;

use crate::extract::normalize_extension;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub ingest: IngestConfig,
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IngestConfig {
    /// Extensions accepted at upload. Empty means every registered type.
    pub allowed_extensions: Vec<String>,
    pub max_file_bytes: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: Vec::new(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_tokens: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { max_tokens: 700 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub context_lines: usize,
    /// `0` means unlimited.
    pub max_matches: usize,
    pub case_sensitive: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            context_lines: 2,
            max_matches: 0,
            case_sensitive: false,
        }
    }
}

impl SearchConfig {
    /// Baseline options; CLI flags are layered on top.
    pub fn options(&self) -> SearchOptions {
        SearchOptions {
            case_sensitive: self.case_sensitive,
            max_matches: self.max_matches,
            context_lines: self.context_lines,
            ..SearchOptions::default()
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScanConfig {
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_globs: vec!["**/*".to_string()],
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones.
    pub json: bool,
}

/// Parse and validate a TOML config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        Ok(Config::default())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let mut config: Config =
        toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.chunking.max_tokens == 0 {
        bail!("chunking.max_tokens must be > 0");
    }
    if config.ingest.max_file_bytes == 0 {
        bail!("ingest.max_file_bytes must be > 0");
    }
    if config.scan.include_globs.is_empty() {
        bail!("scan.include_globs must not be empty");
    }

    config.ingest.allowed_extensions = config
        .ingest
        .allowed_extensions
        .iter()
        .map(|e| normalize_extension(e))
        .filter(|e| !e.is_empty())
        .collect();

    Ok(config)
}
