// ==========================================
// Inventory Count Automation - command line entry
// ==========================================
// plan      normalize inputs and print the launch plan as JSON
// launch    run the launch plan against the terminal rehearsal
// storages  run the storage-type workflow over a storage-code list
// ==========================================

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use inventory_count_automation::batch::{plan_from_feed, plan_from_files, storage_codes_from_file};
use inventory_count_automation::engine::{Clock, LaunchPlan, ManualClock, SystemClock};
use inventory_count_automation::importer::{parse_storage_codes, RecordNormalizer, SqliteFeed};
use inventory_count_automation::logging::{self, LogOptions};
use inventory_count_automation::{AppConfig, BatchRunner, RunSummary, SimulatedTerminal, ZeroPolicy};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "inventory-count-automation")]
#[command(about = "Reconcile counted stock against UD records and enter counts on the terminal")]
struct Cli {
    /// Configuration file (defaults to ./config.json when present)
    #[arg(long, global = true, env = "INVENTORY_CONFIG")]
    config: Option<PathBuf>,

    /// JSON log lines on the console
    #[arg(long, global = true)]
    json_logs: bool,

    /// Write the per-day run log into this directory
    #[arg(long, global = true, env = "INVENTORY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Write the per-day run log into the user data directory
    #[arg(long, global = true, conflicts_with = "log_dir")]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Counting file (.csv, .xlsx, .xls, .xlsb, .ods)
    #[arg(long, short = 'c', required_unless_present = "feed_db")]
    counting: Option<PathBuf>,

    /// Reference report with UD and stock-total columns
    #[arg(long, short = 'r')]
    reference: Option<PathBuf>,

    /// SQLite database used as data-source feed instead of a counting file
    #[arg(long, conflicts_with = "counting", requires_all = ["feed_query", "reference"])]
    feed_db: Option<PathBuf>,

    /// Query run against the feed database
    #[arg(long)]
    feed_query: Option<String>,

    /// Zero-quantity policy: mark or skip (overrides the configuration)
    #[arg(long)]
    zero_policy: Option<String>,
}

#[derive(Args, Debug)]
struct RehearsalArgs {
    /// Wait in real time instead of on the virtual clock
    #[arg(long)]
    real_time: bool,

    /// Write the run summary as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the launch plan and print it as JSON
    Plan {
        #[command(flatten)]
        input: InputArgs,

        /// Write the plan here instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
    /// Run the launch plan against the terminal rehearsal
    Launch {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        rehearsal: RehearsalArgs,
    },
    /// Run the storage-type workflow
    Storages {
        /// File listing storage codes (newline or ';' separated)
        #[arg(long, short = 'l', required_unless_present = "codes")]
        list: Option<PathBuf>,

        /// Storage codes given inline
        #[arg(conflicts_with = "list")]
        codes: Vec<String>,

        #[command(flatten)]
        rehearsal: RehearsalArgs,
    },
}

fn build_plan(input: &InputArgs, config: &AppConfig) -> Result<LaunchPlan> {
    let zero_policy = input
        .zero_policy
        .as_deref()
        .map(ZeroPolicy::from_str)
        .unwrap_or(config.playback.zero_policy);
    let normalizer = RecordNormalizer::default();

    if let Some(db) = &input.feed_db {
        let (Some(query), Some(template)) = (&input.feed_query, &input.reference) else {
            bail!("--feed-db needs --feed-query and --reference");
        };
        let feed = SqliteFeed::open(db)
            .with_context(|| format!("cannot open feed database {}", db.display()))?;
        let (plan, stats) = plan_from_feed(&normalizer, &feed, query, template, zero_policy)
            .context("building launch plan from the data-source feed")?;
        info!(?stats, "feed rows resolved");
        return Ok(plan);
    }

    let Some(counting) = &input.counting else {
        bail!("a counting file or a feed database is required");
    };
    plan_from_files(&normalizer, counting, input.reference.as_deref(), zero_policy)
        .with_context(|| format!("building launch plan from {}", counting.display()))
}

fn clock_for(args: &RehearsalArgs) -> Box<dyn Clock> {
    if args.real_time {
        Box::new(SystemClock::default())
    } else {
        Box::new(ManualClock::new())
    }
}

fn finish(summary: &RunSummary, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        summary
            .write_json(path)
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }
    for line in summary.lines() {
        println!("{}", line);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = match (&cli.log_dir, cli.log_file) {
        (Some(dir), _) => Some(dir.clone()),
        (None, true) => Some(logging::default_log_dir()),
        (None, false) => None,
    };
    if let Some(path) = logging::init(&LogOptions {
        json: cli.json_logs,
        log_dir,
    }) {
        info!(path = %path.display(), "run log");
    }

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!(
        version = inventory_count_automation::VERSION,
        base_url = %config.terminal.base_url,
        warehouse = %config.terminal.warehouse_number,
        "{}",
        inventory_count_automation::APP_NAME
    );

    match cli.command {
        Commands::Plan { input, output } => {
            let plan = build_plan(&input, &config)?;
            let json = serde_json::to_string_pretty(&plan).context("serializing launch plan")?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("writing plan to {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Launch { input, rehearsal } => {
            // Inputs are checked before a session is opened.
            let plan = build_plan(&input, &config)?;

            let clock = clock_for(&rehearsal);
            let mut terminal = SimulatedTerminal::new();
            let runner = BatchRunner::new(&config, clock.as_ref());

            let summary = runner.run_launch(&mut terminal, &plan).await?;
            finish(&summary, rehearsal.summary.as_deref())?;
        }
        Commands::Storages {
            list,
            codes,
            rehearsal,
        } => {
            let codes = match list {
                Some(path) => storage_codes_from_file(&path)
                    .with_context(|| format!("reading storage list {}", path.display()))?,
                None => parse_storage_codes(&codes.join("\n")),
            };
            let clock = clock_for(&rehearsal);
            let mut terminal = SimulatedTerminal::new();
            let runner = BatchRunner::new(&config, clock.as_ref());

            let summary = runner.run_storages(&mut terminal, &codes).await?;
            finish(&summary, rehearsal.summary.as_deref())?;
        }
    }

    Ok(())
}
