//! tiptrie CLI - compare the best chains reported by testnet peers
//!
//! Reads captured peer output (best-chain snapshots, chain records, or cached
//! relay logs), builds a best-tip trie from it and prints where the peers
//! agree and where they fork.

use clap::{ArgAction, Parser, Subcommand};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tiptrie::{ingest, BestTipTrie, Report, ReportConfig, SharedTrie};
use tracing::{info, warn};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "tiptrie")]
#[command(about = "Compare block chains reported by testnet peers")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json")]
    format: OutputFormat,

    /// Config file (defaults to ~/.config/tiptrie/config.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of trailing hash characters to display
    #[arg(long)]
    short_hash_len: Option<usize>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the effective configuration to a config file
    Init {
        /// Where to write it (defaults to ~/.config/tiptrie/config.json)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Compare best-chain snapshots, one file per peer
    Compare {
        /// Snapshot files (GraphQL bestChain responses or arrays of hashes)
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Characters to trim from the end of each peer name
        #[arg(long)]
        label_suffix_trim: Option<usize>,
        /// Write a Graphviz graph to this path
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Compare chains from a JSON-lines file of {"label", "chain"} records
    Chains {
        /// The records file
        file: PathBuf,
        /// Write a Graphviz graph to this path
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Rebuild the block tree from cached rebroadcast logs
    Blocks {
        /// Cached log file, one JSON entry per line
        #[arg(long)]
        in_file: PathBuf,
        /// Maximum number of log entries to load
        #[arg(long)]
        max_entries: Option<usize>,
        /// Best-chain snapshots to overlay as peer tips
        #[arg(long, num_args = 1..)]
        best_tips: Vec<PathBuf>,
        /// Write a Graphviz graph to this path
        #[arg(long)]
        dot: Option<PathBuf>,
    },

    /// Look up a block by its exact path from the root
    Get {
        /// JSON-lines chain records to build the trie from
        #[arg(long)]
        chains: PathBuf,
        /// Hashes from the root down to the block
        #[arg(required = true)]
        path: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = ReportConfig::resolve(cli.config.as_deref())?;
    if let Some(len) = cli.short_hash_len {
        config.short_hash_len = len;
    }

    match cli.command {
        Commands::Init { path, force } => {
            let Some(path) = path.or_else(ReportConfig::default_path) else {
                anyhow::bail!("no config directory on this platform, pass --path");
            };
            if path.exists() && !force {
                anyhow::bail!("{} already exists, pass --force to overwrite", path.display());
            }
            config.save(&path)?;
            output(
                cli.format,
                &serde_json::json!({
                    "status": "ok",
                    "message": format!("Wrote config to {}", path.display())
                }),
            )?;
        }

        Commands::Compare {
            files,
            label_suffix_trim,
            dot,
        } => {
            if let Some(trim) = label_suffix_trim {
                config.label_suffix_trim = trim;
            }
            let shared = SharedTrie::new();
            let summary = ingest::ingest_snapshots(&files, &config, &shared);
            info!(
                inserted = summary.inserted,
                skipped = summary.skipped.len(),
                blocks = shared.with(|trie| trie.len()),
                "loaded snapshots"
            );
            if summary.inserted == 0 {
                warn!("no usable snapshots");
            }
            finish(&shared.into_inner(), &config, cli.format, dot.as_deref())?;
        }

        Commands::Chains { file, dot } => {
            let records = ingest::read_chain_records(BufReader::new(File::open(&file)?))?;
            let mut trie = BestTipTrie::new();
            let count = ingest::ingest_records(records, &mut trie);
            info!("Inserted {} chains", count);
            finish(&trie, &config, cli.format, dot.as_deref())?;
        }

        Commands::Blocks {
            in_file,
            max_entries,
            best_tips,
            dot,
        } => {
            if let Some(max) = max_entries {
                config.max_entries = max;
            }
            let reader = BufReader::new(File::open(&in_file)?);
            let batch = ingest::read_links(reader, config.max_entries)?;
            if batch.skipped > 0 {
                warn!("Skipped {} entries without block hashes", batch.skipped);
            }

            let mut trie = BestTipTrie::new();
            ingest::ingest_links(batch, &mut trie);

            if !best_tips.is_empty() {
                info!("Loading best tips");
                let shared = SharedTrie::from(trie);
                ingest::ingest_snapshots(&best_tips, &config, &shared);
                trie = shared.into_inner();
            }
            finish(&trie, &config, cli.format, dot.as_deref())?;
        }

        Commands::Get { chains, path } => {
            let records = ingest::read_chain_records(BufReader::new(File::open(&chains)?))?;
            let mut trie = BestTipTrie::new();
            ingest::ingest_records(records, &mut trie);

            match trie.node(&path) {
                Ok(block) => {
                    output(
                        cli.format,
                        &serde_json::json!({
                            "path": path,
                            "labels": block.labels(),
                            "value": block.value(),
                            "children": block.child_count()
                        }),
                    )?;
                }
                Err(e) => {
                    output(
                        cli.format,
                        &serde_json::json!({
                            "status": "error",
                            "message": e.to_string()
                        }),
                    )?;
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Print the report and write the graph if one was asked for
fn finish(
    trie: &BestTipTrie,
    config: &ReportConfig,
    format: OutputFormat,
    dot: Option<&Path>,
) -> anyhow::Result<()> {
    if let Some(path) = dot {
        std::fs::write(path, tiptrie::render_dot(trie, config))?;
        info!("Wrote graph to {}", path.display());
    }

    let report = Report::from_trie(trie, config);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&report)?),
        OutputFormat::Text => print!("{}", report),
    }
    Ok(())
}

fn output(format: OutputFormat, value: &serde_json::Value) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(value)?),
        OutputFormat::Text => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}
