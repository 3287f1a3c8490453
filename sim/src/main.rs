//! plexus-sim: replay a reward-accounting scenario and print the outcome.

mod scenario;

use anyhow::Context;
use clap::Parser;
use plexus_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plexus-sim", about = "Replay a reward-accounting scenario")]
struct Cli {
    /// Path to the TOML scenario file.
    #[arg(long, env = "PLEXUS_SCENARIO")]
    scenario: PathBuf,

    /// Log output format: "human" or "json".
    #[arg(long, default_value = "human", env = "PLEXUS_LOG_FORMAT")]
    log_format: String,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "PLEXUS_LOG_LEVEL")]
    log_level: String,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pretty: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format: LogFormat = cli.log_format.parse()?;
    plexus_utils::init_logging(format, &cli.log_level)?;

    let text = std::fs::read_to_string(&cli.scenario)
        .with_context(|| format!("reading scenario {}", cli.scenario.display()))?;
    let scenario = scenario::Scenario::from_toml_str(&text)
        .with_context(|| format!("parsing scenario {}", cli.scenario.display()))?;
    tracing::info!(
        scenario = %cli.scenario.display(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    let report = scenario::run(&scenario)?;
    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
