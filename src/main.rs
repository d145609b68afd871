//! twinsift - find duplicate files and decide which copies can go.
//!
//! Usage:
//!   twinsift scan [PATH]            Hash every file and write an inventory
//!   twinsift analyze [INVENTORY]    Group, classify and report duplicates
//!   twinsift delete [INVENTORY]     Apply the deletion list (dry run by default)
//!   twinsift --help                 Show help

use std::path::{Path, PathBuf};
use std::thread;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

use twinsift_analyze::{AnalysisReport, AnalyzeConfig, Analyzer, GroupKey, ResolutionCategory};
use twinsift_core::format_size;
use twinsift_ops::{DeletionExecutor, DeletionMode};
use twinsift_scan::{load_inventory, save_inventory, JwalkScanner, ScanConfig, ScanPhase};

#[derive(Parser)]
#[command(
    name = "twinsift",
    version,
    about = "Find duplicate files and decide which copies can go",
    long_about = "twinsift scans a directory tree into a file inventory, groups files \
                  with identical content, and recommends which copies to delete when \
                  the choice is unambiguous.\n\n\
                  Run `twinsift scan PATH`, then `twinsift analyze` on the inventory."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug; RUST_LOG overrides)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and write the file inventory
    Scan {
        /// Path to scan
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Inventory file to write (.json for JSON, anything else CSV)
        #[arg(short, long, default_value = "files_report.csv")]
        output: PathBuf,

        /// Entry names to skip (glob patterns, repeatable)
        #[arg(short, long = "ignore", default_value = ".git")]
        ignore: Vec<String>,

        /// Skip hidden files and directories
        #[arg(long)]
        no_hidden: bool,

        /// Follow symbolic links
        #[arg(short = 'L', long)]
        follow_symlinks: bool,

        /// Maximum depth to descend
        #[arg(short = 'd', long)]
        max_depth: Option<u32>,

        /// Worker threads (0 = one per core)
        #[arg(short = 'j', long, default_value = "0")]
        threads: usize,
    },

    /// Analyze an inventory and report duplicates
    Analyze {
        /// Inventory file produced by `scan`
        #[arg(default_value = "files_report.csv")]
        inventory: PathBuf,

        #[command(flatten)]
        options: AnalyzeArgs,

        /// Number of folder pairs to show (0 = all)
        #[arg(short = 'n', long, default_value = "10")]
        pairs: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete the recommended copies (dry run unless --execute)
    Delete {
        /// Inventory file produced by `scan`
        #[arg(default_value = "files_report.csv")]
        inventory: PathBuf,

        #[command(flatten)]
        options: AnalyzeArgs,

        /// Actually delete files
        #[arg(long)]
        execute: bool,

        /// Move files to the trash instead of removing them
        #[arg(long)]
        trash: bool,
    },
}

/// Options shared by `analyze` and `delete`.
#[derive(clap::Args)]
struct AnalyzeArgs {
    /// How sizes partition groups: exact bytes or the formatted size text
    #[arg(short, long, default_value = "exact")]
    group_key: GroupKey,

    /// Only schedule deletions from this group shape
    #[arg(long)]
    only: Option<ResolutionCategory>,

    /// Folder names whose contents are left out (repeatable)
    #[arg(long = "ignore-folder", default_value = ".git")]
    ignore_folders: Vec<String>,

    /// Treat symbolic links as ordinary files
    #[arg(long)]
    include_symlinks: bool,
}

impl AnalyzeArgs {
    fn to_config(&self, max_pairs: usize) -> Result<AnalyzeConfig> {
        let auto_delete = match self.only {
            Some(category) => vec![category],
            None => ResolutionCategory::ALL.to_vec(),
        };
        AnalyzeConfig::builder()
            .group_key(self.group_key)
            .auto_delete(auto_delete)
            .ignore_folders(self.ignore_folders.clone())
            .include_symlinks(self.include_symlinks)
            .max_pairs(max_pairs)
            .build()
            .context("Invalid analysis options")
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan {
            path,
            output,
            ignore,
            no_hidden,
            follow_symlinks,
            max_depth,
            threads,
        } => {
            let config = ScanConfig::builder()
                .root(path)
                .ignore_patterns(ignore)
                .include_hidden(!no_hidden)
                .follow_symlinks(follow_symlinks)
                .max_depth(max_depth)
                .threads(threads)
                .build()
                .context("Invalid scan options")?;
            run_scan(&config, &output)?;
        }
        Command::Analyze {
            inventory,
            options,
            pairs,
            format,
        } => {
            run_analyze(&inventory, options.to_config(pairs)?, format)?;
        }
        Command::Delete {
            inventory,
            options,
            execute,
            trash,
        } => {
            let mode = match (execute, trash) {
                (false, _) => DeletionMode::DryRun,
                (true, false) => DeletionMode::Remove,
                (true, true) => DeletionMode::Trash,
            };
            run_delete(&inventory, options.to_config(0)?, mode)?;
        }
    }

    Ok(())
}

/// Install the fmt subscriber on stderr.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Scan a tree and write its inventory.
fn run_scan(config: &ScanConfig, output: &Path) -> Result<()> {
    eprintln!("Scanning {}...", config.root.display());

    let scanner = JwalkScanner::new();
    let mut progress_rx = scanner.subscribe();
    let reporter = thread::spawn(move || loop {
        let progress = match progress_rx.blocking_recv() {
            Ok(progress) => progress,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };
        match progress.phase {
            ScanPhase::Walking => eprint!("\r  found {} files", progress.files_found),
            ScanPhase::Hashing => eprint!(
                "\r  hashed {}/{} files ({})",
                progress.files_hashed,
                progress.files_found,
                format_size(progress.bytes_hashed)
            ),
            ScanPhase::Done => eprintln!(),
        }
    });

    let outcome = scanner.scan(config).context("Scan failed");
    drop(scanner);
    let _ = reporter.join();
    let mut outcome = outcome?;

    let skipped =
        save_inventory(output, &outcome.inventory).context("Could not write inventory")?;
    outcome.warnings.extend(skipped);

    println!();
    println!("{}", "─".repeat(70));
    println!(
        " {} - {}",
        outcome.root.display(),
        format_size(outcome.stats.total_bytes)
    );
    println!(
        " {} files, {} directories, {} symlinks",
        outcome.stats.files, outcome.stats.dirs, outcome.stats.symlinks
    );
    println!(
        " {} hashed, {} unreadable",
        outcome.stats.hashed, outcome.stats.unreadable
    );
    println!(" Scanned in {:.2}s", outcome.duration.as_secs_f64());
    println!(" Inventory written to {}", output.display());
    println!("{}", "─".repeat(70));

    if !outcome.warnings.is_empty() {
        println!();
        println!("{} warning(s) during scan", outcome.warnings.len());
        for warning in outcome.warnings.iter().take(10) {
            println!("   {}: {}", warning.path.display(), warning.message);
        }
    }

    Ok(())
}

/// Analyze an inventory and print the report.
fn run_analyze(inventory: &Path, config: AnalyzeConfig, format: OutputFormat) -> Result<()> {
    let report = analyze(inventory, config)?;

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Analyze an inventory and run the resulting deletion list.
fn run_delete(inventory: &Path, config: AnalyzeConfig, mode: DeletionMode) -> Result<()> {
    let report = analyze(inventory, config)?;

    if report.deletion_plan.is_empty() {
        println!(" Nothing to delete.");
        return Ok(());
    }

    let outcome = DeletionExecutor::with_mode(mode).execute(report.deletion_plan.entries());

    for path in &outcome.deleted {
        match mode {
            DeletionMode::DryRun => println!("   would delete {}", path.display()),
            _ => println!("   deleted {}", path.display()),
        }
    }
    for error in &outcome.failed {
        eprintln!("   failed {error}");
    }

    println!();
    println!(" {}", outcome.summary());
    if !mode.is_destructive() {
        println!(" Re-run with --execute to delete these files.");
    }

    Ok(())
}

fn analyze(inventory: &Path, config: AnalyzeConfig) -> Result<AnalysisReport> {
    let inventory = load_inventory(inventory)
        .with_context(|| format!("Could not load inventory {}", inventory.display()))?;
    Analyzer::with_config(config)
        .analyze(&inventory)
        .context("Analysis failed")
}

fn print_report(report: &AnalysisReport) {
    let summary = &report.summary;

    println!();
    println!("{}", "─".repeat(70));
    println!(" Duplicate File Report");
    println!("{}", "─".repeat(70));
    println!();
    println!(
        " {} records, {} analyzed, {} excluded",
        summary.records_total,
        summary.records_analyzed,
        summary.excluded.total()
    );

    if !report.has_duplicates() {
        println!(" No duplicate files found.");
        return;
    }

    println!(
        " Found {} duplicate groups ({} files), {} duplicated",
        summary.group_count, summary.duplicate_files, summary.duplicate_volume
    );
    println!(
        " Resolved: {} same folder, {} same name; {} need review",
        summary.same_folder_groups, summary.diff_folder_groups, summary.unresolved_groups
    );
    println!();

    if !report.deletion_plan.is_empty() {
        println!(
            " Deletion list ({} files, {}):",
            summary.files_to_delete,
            format_size(summary.bytes_to_delete)
        );
        for entry in report.deletion_plan.entries() {
            println!("   {}", entry.path.display());
            println!("     keeps {}", entry.kept.display());
        }
        println!();
    }

    if summary.unresolved_groups > 0 {
        println!(" Needs review:");
        for group in report.unresolved_groups() {
            println!(
                "   {} files, {} each, under {}",
                group.member_count(),
                group.size_human(),
                group.common_ancestor().display()
            );
            for member in group.members() {
                println!("     {}", member.path.display());
            }
        }
        println!();
    }

    if !report.folder_pairs.is_empty() {
        println!(" Folders sharing duplicates:");
        for pair in &report.folder_pairs {
            let (a, b) = pair.absolute_folders();
            println!("   {:>5}  {}  <->  {}", pair.count, a.display(), b.display());
        }
        println!();
    }
}
