//! FinGuard command-line interface.
//!
//! Drives the risk pipeline from a terminal: score a single transaction,
//! replay a synthetic transaction stream, or dump the active configuration.

use anyhow::Result;
use chrono::Duration;
use clap::{Parser, Subcommand};
use finguard::core::config::FinGuardConfig;
use finguard::core::logging::LogConfig;
use finguard::core::time;
use finguard::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

#[derive(Parser)]
#[command(name = "finguard")]
#[command(about = "Stateful transaction risk scoring engine", version)]
struct Cli {
    /// Use the production configuration preset.
    #[arg(long, global = true)]
    production: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a single transaction and print the outcome as JSON.
    Score {
        /// User the transaction belongs to.
        #[arg(long)]
        user: String,
        /// Transaction amount.
        #[arg(long)]
        amount: f64,
        /// Merchant name.
        #[arg(long)]
        merchant: Option<String>,
        /// Spending category.
        #[arg(long)]
        category: Option<String>,
        /// Originating location.
        #[arg(long)]
        location: Option<String>,
        /// Timestamp (YYYY-MM-DD HH:MM:SS); defaults to now.
        #[arg(long)]
        timestamp: Option<String>,
        /// Score without committing the transaction into the profile.
        #[arg(long)]
        dry_run: bool,
    },
    /// Replay a synthetic transaction stream through the pipeline.
    Simulate {
        /// Number of transactions to generate.
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// RNG seed for a reproducible stream.
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the active configuration as TOML.
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.production {
        LogConfig::production().init();
        FinGuardConfig::production()
    } else {
        LogConfig::development().init();
        FinGuardConfig::development()
    };

    match cli.command {
        Commands::Score {
            user,
            amount,
            merchant,
            category,
            location,
            timestamp,
            dry_run,
        } => {
            let pipeline = RiskPipeline::new(config)?;
            let mut txn = Transaction::new(format!("cli-{}", std::process::id()), user, amount);
            if let Some(merchant) = merchant {
                txn = txn.with_merchant(merchant);
            }
            if let Some(category) = category {
                txn = txn.with_category(category);
            }
            if let Some(location) = location {
                txn = txn.with_location(location);
            }
            let timestamp = timestamp
                .unwrap_or_else(|| time::now().format("%Y-%m-%d %H:%M:%S").to_string());
            txn = txn.with_timestamp(timestamp);

            if dry_run {
                let analysis = pipeline.simulate(&txn);
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                let outcome = pipeline.process(&txn);
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            }
        }
        Commands::Simulate { count, seed } => {
            let pipeline = RiskPipeline::new(config)?;
            run_simulation(&pipeline, count, seed)?;
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

const USERS: [&str; 3] = ["U1", "U2", "U3"];
const LOCATIONS: [&str; 4] = ["New York, NY", "Brooklyn, NY", "Jersey City, NJ", "Lagos, NG"];
const MERCHANTS: [(&str, &str); 6] = [
    ("Whole Foods", "Groceries"),
    ("Amazon", "Shopping"),
    ("Shell", "Fuel"),
    ("Netflix", "Entertainment"),
    ("CityGym", "Fitness"),
    ("QuickWire Transfers", "Transfers"),
];

/// Generate a plausible stream: mostly small routine purchases from known
/// locations, with roughly one in ten transactions a large outlier.
fn run_simulation(pipeline: &RiskPipeline, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut clock = time::now();
    let mut blocked = 0usize;
    let mut verification = 0usize;

    for i in 0..count {
        clock += Duration::seconds(rng.gen_range(5..120));
        let user = USERS[rng.gen_range(0..USERS.len())];
        let (merchant, category) = MERCHANTS[rng.gen_range(0..MERCHANTS.len())];
        let location = LOCATIONS[rng.gen_range(0..LOCATIONS.len() - 1)];

        let outlier = rng.gen_bool(0.1);
        let amount = if outlier {
            rng.gen_range(1_500.0..6_000.0)
        } else {
            rng.gen_range(5.0..180.0)
        };
        let location = if outlier && rng.gen_bool(0.5) {
            LOCATIONS[LOCATIONS.len() - 1]
        } else {
            location
        };

        let txn = Transaction::new(format!("sim-{i}"), user, amount)
            .with_merchant(merchant)
            .with_category(category)
            .with_location(location)
            .with_timestamp(clock.format("%Y-%m-%d %H:%M:%S").to_string());

        let outcome = pipeline.process(&txn);
        match outcome.gate.decision {
            Decision::Blocked => blocked += 1,
            Decision::VerificationRequired => verification += 1,
            Decision::Approved => {}
        }

        println!(
            "{:<8} {:<4} {:>9.2} {:<22} {:>6.1} {:<6} {:<22} {}",
            txn.id,
            user,
            amount,
            merchant,
            outcome.analysis.final_risk_score,
            outcome.analysis.risk_level,
            outcome.analysis.primary_tag,
            outcome.gate.decision,
        );
    }

    info!(
        transactions = count,
        blocked,
        verification_required = verification,
        alerts = pipeline.alerts().len(),
        "simulation finished"
    );

    println!(
        "\n{count} transactions: {blocked} blocked, {verification} held for verification, {} archived alerts",
        pipeline.alerts().len()
    );
    Ok(())
}
