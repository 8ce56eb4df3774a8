//! mailgraph - Enron email network explorer
//!
//! A CLI tool that filters the communication graph of one dataset
//! partition, summarizes the visible subgraph, and shows people, threads
//! and their emails.
//!
//! Exit codes:
//!   0 - Success (including "not found" and "no matches")
//!   1 - Runtime error (unreadable dataset, bad config, invalid arguments)

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;
mod store;

use analysis::compute_visible_graph;
use anyhow::{Context, Result};
use clap::ValueEnum;
use cli::{Args, Command, OutputFormat};
use config::{Config, CONFIG_FILE};
use dataset::RankKey;
use indicatif::{ProgressBar, ProgressStyle};
use models::GraphData;
use report::cards;
use report::{GraphReport, ReportMetadata};
use std::path::Path;
use std::time::Duration;
use store::{EmailStoreClient, StoreError};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        return handle_init_config();
    }

    let (config, config_warning) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);
    if let Some(warning) = config_warning {
        warn!("{}", warning);
    }

    debug!("mailgraph v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args, config).await {
        error!("Command failed: {:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle init-config: generate a default .mailgraph.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "{} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("Created {} with default settings.", CONFIG_FILE);
    println!("Set [email_store] url to your email proxy to enable email lookups.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
///
/// An explicit `--config` must load. A broken default file is skipped with a
/// warning, returned so it can be logged once logging is up.
fn load_config(args: &Args) -> Result<(Config, Option<String>)> {
    let mut config;
    let mut warning = None;

    if let Some(ref config_path) = args.config {
        config = Config::load(config_path)?;
    } else {
        config = match Config::load_default() {
            Ok(Some(config)) => config,
            Ok(None) => Config::default(),
            Err(e) => {
                warning = Some(format!("Ignoring {}: {:#}", CONFIG_FILE, e));
                Config::default()
            }
        };
    }

    config.merge_with_args(args);
    Ok((config, warning))
}

/// Dispatch one subcommand.
async fn run(args: Args, config: Config) -> Result<()> {
    match args.command {
        Command::Graph(graph) => {
            let (data, metadata) = load_partition(&config, graph.filters.rank_by)?;
            let filters = config.filter_params();
            let visible = compute_visible_graph(&data.nodes, &data.edges, &filters);
            if visible.stats.is_empty() {
                warn!("No nodes match current filters");
            } else {
                info!(
                    "Visible graph: {} nodes, {} edges",
                    visible.stats.node_count, visible.stats.edge_count
                );
            }

            let report = GraphReport::build(metadata, &data, &filters, &visible);
            let output = match config.report.format {
                OutputFormat::Json => report::generate_json_report(&report)?,
                OutputFormat::Markdown => report::generate_markdown_report(&report),
            };

            match graph.output {
                Some(path) => {
                    std::fs::write(&path, &output)
                        .with_context(|| format!("Failed to write report to {}", path.display()))?;
                    println!("Report saved to: {}", path.display());
                }
                None => print!("{}", output),
            }
        }

        Command::Export(export) => {
            let (data, metadata) = load_partition(&config, export.filters.rank_by)?;
            let filters = config.filter_params();
            let visible = compute_visible_graph(&data.nodes, &data.edges, &filters);

            let render = report::export::build_export(metadata, &data.nodes, &visible);
            let output = report::export::generate_export_json(&render)?;
            std::fs::write(&export.output, &output).with_context(|| {
                format!("Failed to write export to {}", export.output.display())
            })?;

            println!(
                "Exported {} nodes and {} edges to: {}",
                render.nodes.len(),
                render.edges.len(),
                export.output.display()
            );
        }

        Command::Node { id, no_emails, .. } => {
            let data = load_graph(&config)?;
            let Some(node) = dataset::find_node(&data, &id) else {
                println!("Node not found: {}", id);
                return Ok(());
            };

            print!("{}", cards::node_detail(node));

            if !no_emails {
                print!("{}", fetch_email_section(&config, &id, args.quiet).await);
            }
        }

        Command::Search { query, .. } => {
            let data = load_graph(&config)?;
            let matches = dataset::search_nodes(&data, &query, config.report.search_limit);
            debug!("Search '{}' matched {} nodes", query, matches.len());
            print!("{}", cards::search_results(&matches));
        }

        Command::Threads { limit } => {
            let threads = dataset::load_threads(&config.data.data_dir, &config.data.threads_file)
                .context("Failed to load threads")?;
            let mut ranked = dataset::threads_by_risk(&threads);
            if let Some(limit) = limit {
                ranked.truncate(limit);
            }
            print!("{}", cards::thread_table(&ranked));
        }

        Command::Thread { id } => {
            let threads = dataset::load_threads(&config.data.data_dir, &config.data.threads_file)
                .context("Failed to load threads")?;
            let texts =
                dataset::load_thread_texts(&config.data.data_dir, &config.data.thread_text_file)
                    .context("Failed to load thread text")?;

            let meta = dataset::find_thread(&threads, &id);
            let text = dataset::find_thread_text(&texts, &id);
            print!("{}", cards::thread_detail(&id, meta, text));
        }

        Command::Partitions => {
            let partitions = dataset::discover_partitions(&config.data.data_dir)
                .context("Failed to list partitions")?;
            if partitions.is_empty() {
                println!("No partitions found in {}", config.data.data_dir.display());
            }
            for partition in partitions {
                println!("{}", partition);
            }
        }

        Command::InitConfig => handle_init_config()?,
    }

    Ok(())
}

/// Load the configured partition.
fn load_graph(config: &Config) -> Result<GraphData> {
    dataset::load_graph(&config.data.data_dir, &config.data.partition)
        .with_context(|| format!("Failed to load partition '{}'", config.data.partition))
}

/// Load the configured partition, ranked ahead of truncation if asked.
fn load_partition(
    config: &Config,
    rank_by: Option<RankKey>,
) -> Result<(GraphData, ReportMetadata)> {
    let mut data = load_graph(config)?;

    let ranked_by = rank_by.map(|key| {
        dataset::rank_nodes(&mut data.nodes, key);
        key.to_possible_value()
            .map(|v| v.get_name().to_string())
            .unwrap_or_else(|| format!("{:?}", key))
    });

    let metadata = ReportMetadata::new(&config.data.partition, &data, ranked_by);
    Ok((data, metadata))
}

/// Query the email store for a person's sent mail and render it.
///
/// Store failures never abort the command; they become an inline message.
async fn fetch_email_section(config: &Config, person_id: &str, quiet: bool) -> String {
    let client = match EmailStoreClient::new(config.store_config()) {
        Ok(client) => client,
        Err(StoreError::NotConfigured) => {
            info!("Email store not configured, skipping emails");
            return "## Emails\n\nEmail store not configured.\n".to_string();
        }
        Err(e) => {
            warn!("Failed to create email store client: {}", e);
            return "## Emails\n\nError loading emails.\n".to_string();
        }
    };

    let spinner = if quiet {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Loading emails for {}...", person_id));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    };

    let result = client.emails_from(person_id).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(rows) => {
            let total = rows.len();
            let ranked = store::rank_inbox(rows, config.email_store.min_body_words);
            debug!(
                "Kept {} of {} emails above {} words",
                ranked.len(),
                total,
                config.email_store.min_body_words
            );
            cards::email_section(person_id, &ranked)
        }
        Err(e) => {
            warn!("Failed to load emails for {}: {}", person_id, e);
            "## Emails\n\nError loading emails.\n".to_string()
        }
    }
}
