//! CradleWatch CLI
//!
//! Command-line interface for the incubator telemetry and alerting core.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::info;

use cradlewatch::alerting::AlertEngine;
use cradlewatch::models::{Alert, AlertEvent, Reading};
use cradlewatch::telemetry::{Monitor, VitalsSampler};
use cradlewatch::Config;

/// CradleWatch - Incubator telemetry and alerting
#[derive(Parser)]
#[command(name = "cradlewatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CRADLEWATCH_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor, streaming alert lifecycle events until Ctrl+C
    Run {
        /// Seed for the signal generator (random when unset)
        #[arg(long, env = "CRADLEWATCH_SEED")]
        seed: Option<u64>,
    },

    /// Drive a deterministic number of sampling ticks and print the ledger
    Simulate {
        /// Number of vitals ticks to run
        #[arg(long, default_value = "30")]
        ticks: u64,

        /// Seed for the signal generator
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print the configured emergency contacts
    Contacts,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
    if config.logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let result = match cli.command {
        Commands::Run { seed } => {
            if seed.is_some() {
                config.vitals.seed = seed;
            }
            run_monitor(config).await
        }
        Commands::Simulate { ticks, seed } => run_simulate(config, ticks, seed, cli.format),
        Commands::Contacts => run_contacts(&config, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run_monitor(config: Config) -> anyhow::Result<()> {
    let mut monitor = Monitor::new(config);
    let engine = monitor.engine();
    let mut events = engine.subscribe();

    monitor.start();
    info!("Monitor running; streaming alert lifecycle");
    println!("CradleWatch monitor running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => print_event(&event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    eprintln!("(lagged, {skipped} events skipped)");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    monitor.stop().await;

    let stats = engine.stats();
    println!(
        "{} alert(s) in ledger, {} pending high priority",
        stats.total,
        engine.pending_high_priority()
    );

    Ok(())
}

fn print_event(event: &AlertEvent) {
    let (verb, alert) = match event {
        AlertEvent::Raised(a) => ("RAISED", a),
        AlertEvent::Acknowledged(a) => ("ACKNOWLEDGED", a),
        AlertEvent::Dismissed(a) => ("DISMISSED", a),
    };
    println!(
        "[{}] {:12} {:?}/{:?} {}: {}",
        alert.created_at.format("%H:%M:%S"),
        verb,
        alert.kind,
        alert.priority,
        alert.title,
        alert.description
    );
}

fn run_simulate(config: Config, ticks: u64, seed: u64, format: OutputFormat) -> anyhow::Result<()> {
    let engine = Arc::new(AlertEngine::new(
        config.alerting.event_buffer,
        config.audio.crying_threshold,
    ));

    let mut vitals = config.vitals.clone();
    vitals.seed = Some(seed);
    let (readings_tx, _) = watch::channel(Reading::baseline());
    let mut sampler = VitalsSampler::new(engine.clone(), vitals, readings_tx);

    let mut raised: Vec<Alert> = Vec::new();
    for _ in 0..ticks {
        let (_, alerts) = sampler.step();
        raised.extend(alerts);
    }

    let ledger = engine.snapshot();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ledger)?);
        }
        OutputFormat::Text => {
            println!("Ran {ticks} tick(s) with seed {seed}: {} alert(s) raised", raised.len());
            for alert in &ledger {
                println!(
                    "  [{}] {:?}/{:?} {} ({})",
                    alert.created_at.format("%H:%M:%S"),
                    alert.kind,
                    alert.priority,
                    alert.description,
                    alert.source_key
                );
            }
        }
    }

    Ok(())
}

fn run_contacts(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&config.contacts.emergency)?
            );
        }
        OutputFormat::Text => {
            println!("Emergency contacts:");
            for contact in &config.contacts.emergency {
                println!("  {} | {} | {}", contact.name, contact.phone, contact.email);
            }
        }
    }
    Ok(())
}
