//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::analysis::CommunitySelector;
use crate::dataset::RankKey;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// mailgraph - explore the Enron email network
///
/// Filter the communication graph by community, risk and sentiment,
/// summarize what is left, inspect people and threads, and export the
/// visible graph for rendering.
///
/// Examples:
///   mailgraph graph --partition 2001 --min-risk 0.4
///   mailgraph graph --community nonnull --format json -o report.json
///   mailgraph export --limit 300 --rank-by pagerank -o graph_render.json
///   mailgraph node kenneth.lay
///   mailgraph search skilling
///   mailgraph threads --limit 20
///   mailgraph init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .mailgraph.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Root directory of the dataset
    #[arg(long, value_name = "DIR", env = "MAILGRAPH_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Filter a partition and summarize the visible graph
    Graph(GraphArgs),

    /// Write the visible graph with precomputed styles for rendering
    Export(ExportArgs),

    /// Show one person's profile and emails
    Node {
        /// Person identifier
        id: String,

        /// Partition to read the profile from
        #[arg(short, long)]
        partition: Option<String>,

        /// Skip the email store query
        #[arg(long)]
        no_emails: bool,
    },

    /// Find people by id or alias
    Search {
        /// Case-insensitive substring
        query: String,

        #[arg(short, long)]
        partition: Option<String>,

        /// Maximum number of results
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },

    /// List threads, riskiest first
    Threads {
        /// Maximum number of threads to list
        #[arg(long, value_name = "COUNT")]
        limit: Option<usize>,
    },

    /// Show one thread's metadata and text
    Thread {
        /// Thread identifier
        id: String,
    },

    /// List dataset partitions
    Partitions,

    /// Generate a default .mailgraph.toml configuration file
    InitConfig,
}

/// Filter flags shared by `graph` and `export`.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Dataset partition (`all` or a year)
    #[arg(short, long)]
    pub partition: Option<String>,

    /// Maximum number of visible nodes
    #[arg(short = 'n', long, value_name = "COUNT")]
    pub limit: Option<usize>,

    /// Community filter: all, nonnull, or a community id
    #[arg(long, value_name = "COMMUNITY")]
    pub community: Option<CommunitySelector>,

    /// Minimum risk intensity (0.0 - 1.0)
    #[arg(long, value_name = "SCORE")]
    pub min_risk: Option<f64>,

    /// Minimum sentiment intensity (0.0 - 1.0)
    #[arg(long, value_name = "SCORE")]
    pub min_sentiment: Option<f64>,

    /// Rank nodes before truncation instead of keeping dataset order
    #[arg(long, value_name = "KEY")]
    pub rank_by: Option<RankKey>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GraphArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Output file for the render export
    #[arg(short, long, default_value = "graph_render.json", value_name = "FILE")]
    pub output: PathBuf,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Graph(args) => args.filters.validate(),
            Command::Export(args) => args.filters.validate(),
            Command::Search { limit: Some(0), .. } | Command::Threads { limit: Some(0) } => {
                Err("Limit must be at least 1".to_string())
            }
            Command::Node { id, .. } | Command::Thread { id } if id.trim().is_empty() => {
                Err("Identifier must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

impl FilterArgs {
    fn validate(&self) -> Result<(), String> {
        if self.limit == Some(0) {
            return Err("Node limit must be at least 1".to_string());
        }

        for (name, value) in [("--min-risk", self.min_risk), ("--min-sentiment", self.min_sentiment)]
        {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{} must be a number", name));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            data_dir: None,
            verbose: false,
            quiet: false,
        }
    }

    fn graph_command(filters: FilterArgs) -> Command {
        Command::Graph(GraphArgs {
            filters,
            format: None,
            output: None,
        })
    }

    #[test]
    fn test_parse_graph_flags() {
        let args = Args::try_parse_from([
            "mailgraph",
            "graph",
            "--partition",
            "2001",
            "-n",
            "50",
            "--community",
            "nonnull",
            "--min-risk",
            "0.4",
            "--rank-by",
            "pagerank",
            "--format",
            "json",
        ])
        .unwrap();

        let Command::Graph(graph) = args.command else {
            panic!("expected graph command");
        };
        assert_eq!(graph.filters.partition.as_deref(), Some("2001"));
        assert_eq!(graph.filters.limit, Some(50));
        assert_eq!(graph.filters.community, Some(CommunitySelector::NonNull));
        assert_eq!(graph.filters.min_risk, Some(0.4));
        assert_eq!(graph.filters.rank_by, Some(RankKey::Pagerank));
        assert_eq!(graph.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_parse_rejects_bad_community() {
        assert!(Args::try_parse_from(["mailgraph", "graph", "--community", "big"]).is_err());
    }

    #[test]
    fn test_validation_zero_limit() {
        let args = make_args(graph_command(FilterArgs {
            limit: Some(0),
            ..FilterArgs::default()
        }));
        assert!(args.validate().is_err());

        let args = make_args(Command::Threads { limit: Some(0) });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::Partitions);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::Partitions);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
