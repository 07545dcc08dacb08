//! Command-line runner: loads a configuration, runs every workload size and
//! prints the completion-time statistics.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use procsim::{SimConfig, Summary, load_config, run_experiments, summarize, write_csv};

/// Process scheduling simulator
#[derive(Parser, Debug)]
#[command(name = "procsim", about = "Simulate processes competing for one CPU and bounded RAM.")]
struct Cli {
    /// Path to a TOML config file (defaults are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override the workload sizes (e.g. --sizes 25,50,100)
    #[arg(long, value_delimiter = ',')]
    sizes: Option<Vec<usize>>,

    /// Override K: a process waits on I/O after a tick with probability 1/K
    #[arg(long)]
    wait_denominator: Option<u32>,

    /// Override the instructions consumed per tick
    #[arg(long)]
    tick_capacity: Option<u32>,

    /// Also write per-size summaries to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn load(&self) -> Result<SimConfig, procsim::ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SimConfig::default(),
        };
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(sizes) = &self.sizes {
            config = config.with_workload_sizes(sizes.clone());
        }
        if let Some(k) = self.wait_denominator {
            config = config.with_wait_denominator(k);
        }
        if let Some(n) = self.tick_capacity {
            config = config.with_tick_capacity(n);
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to load configuration: {}", e);
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(1));
        }
    };

    let outcomes = match run_experiments(&config) {
        Ok(outcomes) => outcomes,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(ExitCode::from(1));
        }
    };

    let mut summaries: Vec<Summary> = Vec::with_capacity(outcomes.len());
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => {
                let summary = summarize(result);
                println!("Results for {} processes:", summary.workload_size);
                println!("  Average time: {:.4}", summary.mean);
                println!("  Standard deviation: {:.4}", summary.std_dev);
                summaries.push(summary);
            }
            Err(e) => {
                println!("Results for {} processes:", outcome.workload_size);
                println!("  failed: {}", e);
            }
        }
    }

    if let Some(path) = &cli.csv {
        write_csv(File::create(path)?, &summaries)?;
        tracing::info!(path = %path.display(), rows = summaries.len(), "wrote CSV summary");
    }

    Ok(ExitCode::SUCCESS)
}
