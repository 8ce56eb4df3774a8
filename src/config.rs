//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.mailgraph.toml` files.

use crate::analysis::{CommunitySelector, FilterParams};
use crate::cli::{Args, Command, FilterArgs, OutputFormat};
use crate::dataset::{ALL_PARTITION, DEFAULT_SEARCH_LIMIT};
use crate::store::{StoreConfig, DEFAULT_MIN_BODY_WORDS};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".mailgraph.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset location.
    #[serde(default)]
    pub data: DataConfig,

    /// Default filter values.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Email store proxy settings.
    #[serde(default)]
    pub email_store: EmailStoreConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset root; holds one directory per partition plus `threads/`.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_partition")]
    pub partition: String,

    #[serde(default = "default_threads_file")]
    pub threads_file: String,

    #[serde(default = "default_thread_text_file")]
    pub thread_text_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            partition: default_partition(),
            threads_file: default_threads_file(),
            thread_text_file: default_thread_text_file(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_partition() -> String {
    ALL_PARTITION.to_string()
}

fn default_threads_file() -> String {
    "Threads_internal_multi_9902.json".to_string()
}

fn default_thread_text_file() -> String {
    "ThreadText_internal_multi_9902.json".to_string()
}

/// Filter defaults applied when the command line leaves them unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default = "default_node_limit")]
    pub node_limit: usize,

    #[serde(default)]
    pub community: CommunitySelector,

    #[serde(default)]
    pub min_risk: f64,

    #[serde(default)]
    pub min_sentiment: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            node_limit: default_node_limit(),
            community: CommunitySelector::All,
            min_risk: 0.0,
            min_sentiment: 0.0,
        }
    }
}

fn default_node_limit() -> usize {
    500
}

/// Email store proxy settings.
///
/// Only the name of the environment variable holding the token lives here;
/// the token itself never goes in the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailStoreConfig {
    /// Proxy base URL. Empty disables email fetching.
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Emails with this many body words or fewer are hidden.
    #[serde(default = "default_min_body_words")]
    pub min_body_words: usize,
}

impl Default for EmailStoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            table: default_table(),
            token_env: default_token_env(),
            timeout_seconds: default_timeout(),
            min_body_words: default_min_body_words(),
        }
    }
}

fn default_table() -> String {
    "emails_clean_9902".to_string()
}

fn default_token_env() -> String {
    "MAILGRAPH_STORE_TOKEN".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_min_body_words() -> usize {
    DEFAULT_MIN_BODY_WORDS
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Maximum rows printed by `search`.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Markdown,
            search_limit: default_search_limit(),
        }
    }
}

fn default_search_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.mailgraph.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref data_dir) = args.data_dir {
            self.data.data_dir = data_dir.clone();
        }

        match &args.command {
            Command::Graph(graph) => {
                self.merge_filters(&graph.filters);
                if let Some(format) = graph.format {
                    self.report.format = format;
                }
            }
            Command::Export(export) => self.merge_filters(&export.filters),
            Command::Node { partition, .. } => {
                if let Some(partition) = partition {
                    self.data.partition = partition.clone();
                }
            }
            Command::Search {
                partition, limit, ..
            } => {
                if let Some(partition) = partition {
                    self.data.partition = partition.clone();
                }
                if let Some(limit) = limit {
                    self.report.search_limit = *limit;
                }
            }
            _ => {}
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    fn merge_filters(&mut self, filters: &FilterArgs) {
        if let Some(ref partition) = filters.partition {
            self.data.partition = partition.clone();
        }
        if let Some(limit) = filters.limit {
            self.filters.node_limit = limit;
        }
        if let Some(community) = filters.community {
            self.filters.community = community;
        }
        if let Some(min_risk) = filters.min_risk {
            self.filters.min_risk = min_risk;
        }
        if let Some(min_sentiment) = filters.min_sentiment {
            self.filters.min_sentiment = min_sentiment;
        }
    }

    /// Filter parameters for the aggregator.
    pub fn filter_params(&self) -> FilterParams {
        FilterParams {
            // A zero limit in the file would hide everything.
            node_limit: self.filters.node_limit.max(1),
            community: self.filters.community,
            min_risk: self.filters.min_risk,
            min_sentiment: self.filters.min_sentiment,
        }
    }

    /// Email store client settings, with the token read from the environment.
    pub fn store_config(&self) -> StoreConfig {
        let token = std::env::var(&self.email_store.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty());

        StoreConfig {
            url: self.email_store.url.clone(),
            table: self.email_store.table.clone(),
            token,
            timeout_seconds: self.email_store.timeout_seconds,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::GraphArgs;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.data_dir, PathBuf::from("data"));
        assert_eq!(config.data.partition, "all");
        assert_eq!(config.filters.node_limit, 500);
        assert_eq!(config.filters.community, CommunitySelector::All);
        assert!(config.email_store.url.is_empty());
        assert_eq!(config.email_store.table, "emails_clean_9902");
        assert_eq!(config.report.format, OutputFormat::Markdown);
        assert_eq!(config.report.search_limit, 25);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
verbose = true

[data]
data_dir = "/srv/enron"
partition = "2001"

[filters]
node_limit = 200
community = "nonnull"
min_risk = 0.3

[email_store]
url = "https://mail-proxy.local"
timeout_seconds = 5

[report]
format = "json"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert!(config.general.verbose);
        assert_eq!(config.data.data_dir, PathBuf::from("/srv/enron"));
        assert_eq!(config.data.partition, "2001");
        assert_eq!(config.data.threads_file, "Threads_internal_multi_9902.json");
        assert_eq!(config.filters.node_limit, 200);
        assert_eq!(config.filters.community, CommunitySelector::NonNull);
        assert_eq!(config.filters.min_risk, 0.3);
        assert_eq!(config.filters.min_sentiment, 0.0);
        assert_eq!(config.email_store.url, "https://mail-proxy.local");
        assert_eq!(config.email_store.timeout_seconds, 5);
        assert_eq!(config.email_store.min_body_words, 50);
        assert_eq!(config.report.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_community_id() {
        let config: Config = toml::from_str("[filters]\ncommunity = \"42\"\n").unwrap();
        assert_eq!(config.filters.community, CommunitySelector::Id(42));

        assert!(toml::from_str::<Config>("[filters]\ncommunity = \"largest\"\n").is_err());
    }

    #[test]
    fn test_load_from_dir() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from_dir(dir.path()).unwrap().is_none());

        let mut file = std::fs::File::create(dir.path().join(CONFIG_FILE)).unwrap();
        writeln!(file, "[filters]\nnode_limit = 10").unwrap();
        let config = Config::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.filters.node_limit, 10);

        std::fs::write(dir.path().join(CONFIG_FILE), "[filters\nbroken").unwrap();
        assert!(Config::load_from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.filters.min_sentiment = 0.2;

        let args = Args {
            command: Command::Graph(GraphArgs {
                filters: FilterArgs {
                    partition: Some("2000".to_string()),
                    limit: Some(50),
                    community: Some(CommunitySelector::Id(3)),
                    min_risk: Some(0.5),
                    ..FilterArgs::default()
                },
                format: Some(OutputFormat::Json),
                output: None,
            }),
            config: None,
            data_dir: Some(PathBuf::from("/tmp/enron")),
            verbose: true,
            quiet: false,
        };
        config.merge_with_args(&args);

        assert_eq!(config.data.data_dir, PathBuf::from("/tmp/enron"));
        assert_eq!(config.data.partition, "2000");
        assert_eq!(config.report.format, OutputFormat::Json);
        assert!(config.general.verbose);

        let params = config.filter_params();
        assert_eq!(params.node_limit, 50);
        assert_eq!(params.community, CommunitySelector::Id(3));
        assert_eq!(params.min_risk, 0.5);
        // Not given on the command line, so the file value stays.
        assert_eq!(params.min_sentiment, 0.2);
    }

    #[test]
    fn test_store_config_reads_token_from_env() {
        let mut config = Config::default();
        config.email_store.url = "https://mail-proxy.local".to_string();
        config.email_store.token_env = "MAILGRAPH_TEST_TOKEN_4F2A".to_string();

        std::env::remove_var("MAILGRAPH_TEST_TOKEN_4F2A");
        assert!(config.store_config().token.is_none());

        std::env::set_var("MAILGRAPH_TEST_TOKEN_4F2A", "secret");
        let store = config.store_config();
        assert_eq!(store.token.as_deref(), Some("secret"));
        assert_eq!(store.table, "emails_clean_9902");
        std::env::remove_var("MAILGRAPH_TEST_TOKEN_4F2A");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[data]"));
        assert!(toml_str.contains("[filters]"));
        assert!(toml_str.contains("[email_store]"));
        assert!(toml_str.contains("token_env = \"MAILGRAPH_STORE_TOKEN\""));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.filters.node_limit, 500);
    }
}
