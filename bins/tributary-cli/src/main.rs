//! tributary — citation-weighted revenue attribution CLI.
//!
//! Loads a citation-graph snapshot, runs a distribution from a trigger
//! node, and prints the per-user accounting. Also ranks users by reference
//! weight and reports graph statistics.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{error, warn};

use tributary_core::constants::FACTOR_PRECISION;
use tributary_core::fixed::parse_factor_ppb;
use tributary_core::money::{format_amount, parse_amount};
use tributary_core::traits::WeightModel;
use tributary_engine::{level_stats, summarize, CitationGraph, DistributionEngine, EngineConfig};
use tributary_import::parse_snapshot;
use tributary_weights::ReferenceModel;

/// Tributary — "Revenue flows back to its sources."
#[derive(Parser)]
#[command(
    name = "tributary",
    version,
    about = "Citation-weighted revenue attribution"
)]
struct Cli {
    /// Log level filter (e.g. warn, info, tributary_engine=debug)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Distribute an amount from a trigger node and print the accounting
    Distribute(DistributeArgs),
    /// Rank users by the reference weight of the nodes they authored
    Weights(WeightsArgs),
    /// Show graph statistics
    Stats(StatsArgs),
}

#[derive(Args)]
struct DistributeArgs {
    /// Path to the graph snapshot (JSON)
    #[arg(long)]
    graph: PathBuf,

    /// Trigger/event identifier stamped on every allocation
    #[arg(long)]
    trigger: String,

    /// Entry node id (defaults to the trigger id)
    #[arg(long)]
    node: Option<String>,

    /// Amount to distribute, in decimal currency units
    #[arg(long, default_value = "100.00")]
    amount: String,

    /// Maximum propagation depth
    #[arg(long)]
    depth: Option<u32>,

    /// Minimum pool worth propagating, in decimal currency units
    #[arg(long)]
    min_propagation: Option<String>,

    /// Cap on the difficulty-compensation multiplier (e.g. "1.75")
    #[arg(long)]
    max_retention_multiplier: Option<String>,

    /// Write the full result as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,
}

#[derive(Args)]
struct WeightsArgs {
    /// Path to the graph snapshot (JSON)
    #[arg(long)]
    graph: PathBuf,

    /// Show only the top N users
    #[arg(long, default_value_t = 20)]
    top: usize,
}

#[derive(Args)]
struct StatsArgs {
    /// Path to the graph snapshot (JSON)
    #[arg(long)]
    graph: PathBuf,

    /// Show only the top N most-cited nodes
    #[arg(long, default_value_t = 10)]
    top: usize,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Command::Distribute(args) => cmd_distribute(args),
        Command::Weights(args) => cmd_weights(args),
        Command::Stats(args) => cmd_stats(args),
    };

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

/// Initialize tracing subscriber with the given log level filter.
fn init_logging(level_str: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_level(true))
        .init();
}

fn load_graph(path: &PathBuf) -> Result<CitationGraph> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let imported = parse_snapshot(&json)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    for warning in &imported.warnings {
        warn!("{warning}");
    }
    CitationGraph::new(imported.nodes, imported.edges)
        .context("building citation graph")
}

fn cmd_distribute(args: DistributeArgs) -> Result<()> {
    let graph = Arc::new(load_graph(&args.graph)?);
    let entry = args
        .node
        .clone()
        .unwrap_or_else(|| args.trigger.clone());
    if !graph.contains(&entry) {
        bail!("entry node not found in graph: {entry}");
    }

    let amount = parse_amount(&args.amount).context("parsing --amount")?;

    let mut config = EngineConfig::default();
    if let Some(depth) = args.depth {
        config.max_depth = depth;
    }
    if let Some(min) = &args.min_propagation {
        config.min_propagation_cents = parse_amount(min).context("parsing --min-propagation")?;
    }
    if let Some(cap) = &args.max_retention_multiplier {
        config.max_retention_multiplier_ppb =
            parse_factor_ppb(cap).context("parsing --max-retention-multiplier")?;
    }

    let engine = DistributionEngine::with_clock(graph, Utc::now())
        .with_config(config)
        .context("invalid engine configuration")?;
    let allocations = engine
        .distribute(&args.trigger, &entry, amount)
        .context("distribution failed")?;

    let summaries = summarize(&allocations);
    println!(
        "{:<24} {:>12} {:>12} {:>12} {:>6}",
        "user", "direct", "propagated", "total", "lines"
    );
    println!("{}", "-".repeat(70));
    for summary in &summaries {
        println!(
            "{:<24} {:>12} {:>12} {:>12} {:>6}",
            summary.user_id,
            format_amount(summary.direct),
            format_amount(summary.propagated),
            format_amount(summary.total()),
            summary.allocations,
        );
    }
    println!("{}", "-".repeat(70));

    let distributed: u64 = allocations.iter().map(|a| a.amount).sum();
    println!(
        "{:<24} {:>38} {:>6}",
        "total",
        format_amount(distributed),
        allocations.len()
    );

    println!("\nby level:");
    for stats in level_stats(&allocations) {
        let label = if stats.level == 0 {
            "direct".to_string()
        } else {
            format!("hop {}", stats.level)
        };
        println!(
            "  {:<8} {:>4} lines  {:>12}",
            label,
            stats.count,
            format_amount(stats.total)
        );
    }

    if distributed == amount {
        println!("\nconservation check passed: {}", format_amount(amount));
    } else {
        // Unreachable by construction; loud if it ever happens.
        bail!(
            "conservation check FAILED: distributed {} of {}",
            format_amount(distributed),
            format_amount(amount)
        );
    }

    if let Some(path) = &args.json {
        let levels = level_stats(&allocations);
        let payload = serde_json::json!({
            "trigger_id": &args.trigger,
            "entry_node_id": &entry,
            "amount": format_amount(amount),
            "allocations": &allocations,
            "users": &summaries,
            "levels": &levels,
        });
        fs::write(path, serde_json::to_string_pretty(&payload)?)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("result written to {}", path.display());
    }

    Ok(())
}

struct UserWeight {
    task_count: usize,
    citations: u64,
    weight_ppb: u128,
}

fn cmd_weights(args: WeightsArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let model = ReferenceModel::new();
    let now = Utc::now();

    let mut by_user: BTreeMap<String, UserWeight> = BTreeMap::new();
    for node in graph.nodes() {
        let citation_floor = graph.incoming_citation_count(&node.id);
        let weight = model
            .node_weight_ppb(node, citation_floor, now)
            .context("computing node weight")?;
        let entry = by_user.entry(node.creator_id.clone()).or_insert(UserWeight {
            task_count: 0,
            citations: 0,
            weight_ppb: 0,
        });
        entry.task_count += 1;
        entry.citations += node.citation_count.max(citation_floor) as u64;
        entry.weight_ppb += weight;
    }

    let total_weight: u128 = by_user.values().map(|u| u.weight_ppb).sum();
    let mut ranked: Vec<(String, UserWeight)> = by_user.into_iter().collect();
    ranked.sort_by(|a, b| b.1.weight_ppb.cmp(&a.1.weight_ppb).then(a.0.cmp(&b.0)));

    println!(
        "{:>4} {:<24} {:>6} {:>10} {:>10} {:>12}",
        "rank", "user", "nodes", "citations", "share", "weight"
    );
    println!("{}", "-".repeat(72));
    for (rank, (user, stats)) in ranked.iter().take(args.top).enumerate() {
        println!(
            "{:>4} {:<24} {:>6} {:>10} {:>9} {:>12}",
            rank + 1,
            user,
            stats.task_count,
            stats.citations,
            format_share(stats.weight_ppb, total_weight),
            format_weight(stats.weight_ppb),
        );
    }

    Ok(())
}

fn cmd_stats(args: StatsArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;

    let users: BTreeMap<&str, usize> =
        graph
            .nodes()
            .fold(BTreeMap::new(), |mut users, node| {
                *users.entry(node.creator_id.as_str()).or_insert(0) += 1;
                users
            });
    let uncited = graph
        .nodes()
        .filter(|n| graph.incoming_citation_count(&n.id) == 0)
        .count();
    let citing_nothing = graph
        .nodes()
        .filter(|n| graph.outgoing_edges(&n.id).is_empty())
        .count();

    println!("nodes:          {}", graph.node_count());
    println!("edges:          {}", graph.edge_count());
    println!("users:          {}", users.len());
    println!("uncited nodes:  {uncited}");
    println!("leaf nodes:     {citing_nothing}");

    let mut cited: Vec<(&str, u32)> = graph
        .nodes()
        .map(|n| (n.id.as_str(), graph.incoming_citation_count(&n.id)))
        .filter(|(_, count)| *count > 0)
        .collect();
    cited.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

    println!("\nmost cited:");
    for (id, count) in cited.iter().take(args.top) {
        println!("  {count:>5}  {id}");
    }

    Ok(())
}

/// Format a ppb weight with four fractional digits.
fn format_weight(weight_ppb: u128) -> String {
    let units = weight_ppb / FACTOR_PRECISION as u128;
    let frac = (weight_ppb % FACTOR_PRECISION as u128) / 100_000;
    format!("{units}.{frac:04}")
}

/// Percentage share of `weight` in `total`, to two decimals.
fn format_share(weight_ppb: u128, total_ppb: u128) -> String {
    if total_ppb == 0 {
        return "0.00%".to_string();
    }
    let basis_points = weight_ppb * 10_000 / total_ppb;
    format!("{}.{:02}%", basis_points / 100, basis_points % 100)
}
