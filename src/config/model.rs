//! Project configuration data structures (spec §6).
//!
//! Grouped into logical sub-structs so that each section can be defaulted,
//! validated, and env-overridden independently.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub graph: GraphSection,
    #[serde(default)]
    pub parsing: ParsingSection,
    #[serde(default)]
    pub import: ImportSection,
    #[serde(default)]
    pub plugins: PluginsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    pub root: PathBuf,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSection {
    pub cache_path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(".codegraph/cache.sqlite"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSection {
    pub endpoint: String,
    #[serde(default)]
    pub credentials: Option<GraphCredentials>,
    pub database: String,
    #[serde(default)]
    pub wipe_before_import: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphCredentials {
    pub username: String,
    pub password: String,
}

impl Default for GraphSection {
    fn default() -> Self {
        Self {
            endpoint: "bolt://127.0.0.1:7687".to_string(),
            credentials: None,
            database: "neo4j".to_string(),
            wipe_before_import: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsingSection {
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default = "default_parse_timeout_ms")]
    pub parse_timeout_ms: u64,
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "**/.git/**".to_string(),
        "**/node_modules/**".to_string(),
        "**/vendor/**".to_string(),
        "**/build/**".to_string(),
    ]
}

fn default_max_file_size() -> u64 {
    2 * 1024 * 1024
}

fn default_parse_timeout_ms() -> u64 {
    5_000
}

impl Default for ParsingSection {
    fn default() -> Self {
        Self {
            ignore_patterns: default_ignore_patterns(),
            follow_symlinks: false,
            max_file_size: default_max_file_size(),
            parse_timeout_ms: default_parse_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportStrategy {
    DirectBulk,
    ParallelBulk,
    FileDump,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    #[serde(default = "default_import_strategy")]
    pub strategy: ImportStrategy,
    #[serde(default = "default_node_batch")]
    pub node_batch: usize,
    #[serde(default = "default_relationship_batch")]
    pub relationship_batch: usize,
    #[serde(default = "default_parallel_workers")]
    pub parallel_workers: usize,
    #[serde(default = "default_retry_count")]
    pub write_retry_count: u32,
}

fn default_import_strategy() -> ImportStrategy {
    ImportStrategy::ParallelBulk
}
fn default_node_batch() -> usize {
    2_000
}
fn default_relationship_batch() -> usize {
    2_000
}
fn default_parallel_workers() -> usize {
    num_cpus::get().max(1)
}
fn default_retry_count() -> u32 {
    3
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            strategy: default_import_strategy(),
            node_batch: default_node_batch(),
            relationship_batch: default_relationship_batch(),
            parallel_workers: default_parallel_workers(),
            write_retry_count: default_retry_count(),
        }
    }
}

/// `config_path_glob -> { config_key -> registration_kind }`, per §4.6/§6.
pub type MetadataRules = BTreeMap<String, BTreeMap<String, String>>;

/// Per-language list of call-expression shapes recognized as HTTP calls
/// (receiver or bare function name, e.g. `"axios"`, `"fetch"`).
pub type ApiHelpers = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsSection {
    #[serde(default)]
    pub metadata_rules: MetadataRules,
    #[serde(default = "default_api_helpers")]
    pub api_helpers: ApiHelpers,
}

fn default_api_helpers() -> ApiHelpers {
    let mut m = ApiHelpers::new();
    m.insert(
        "javascript".to_string(),
        vec![
            "fetch".to_string(),
            "axios.get".to_string(),
            "axios.post".to_string(),
            "axios.put".to_string(),
            "axios.delete".to_string(),
            "axios.patch".to_string(),
            "$.ajax".to_string(),
        ],
    );
    m.insert("typescript".to_string(), m.get("javascript").cloned().unwrap_or_default());
    m
}

impl ProjectConfig {
    /// Loads a YAML config document, then applies ENV overrides and
    /// validates the result. `project.root` has no sane universal default,
    /// so a config file is always required rather than falling back to
    /// ENV-only construction.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("reading config {}: {e}", path.display()))?;
        let mut cfg: ProjectConfig = serde_yml::from_str(&text)
            .map_err(|e| anyhow!("parsing config {}: {e}", path.display()))?;
        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Supported ENV overrides. Unknown variable names are ignored and a
    /// value that fails to parse falls back to whatever the file already
    /// set, so a malformed override can never downgrade a working config
    /// into one that fails to load.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("CODEGRAPH_GRAPH_ENDPOINT") {
            self.graph.endpoint = v;
        }
        if let Some(v) = env_bool("CODEGRAPH_GRAPH_WIPE_BEFORE_IMPORT") {
            self.graph.wipe_before_import = v;
        }
        if let Some(v) = env_usize("CODEGRAPH_IMPORT_PARALLEL_WORKERS") {
            self.import.parallel_workers = v;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.project.languages.is_empty() {
            return Err(anyhow!("project.languages must list at least one language"));
        }
        if self.parsing.max_file_size == 0 {
            return Err(anyhow!("parsing.max_file_size must be greater than 0"));
        }
        if self.import.node_batch == 0 || self.import.relationship_batch == 0 {
            return Err(anyhow!("import batch sizes must be greater than 0"));
        }
        Ok(())
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|s| s.trim().parse::<usize>().ok())
}
