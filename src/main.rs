use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use navguard::config::NavigationConfig;
use navguard::logging::init_tracing;
use navguard::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "navguard")]
#[command(about = "Replay navigation scenarios against an in-memory browser tab")]
#[command(version)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario file and print the resulting history
    Replay {
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,

        /// Run on the tokio clock instead of virtual time
        #[arg(long)]
        realtime: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => NavigationConfig::load_from(path),
        None => NavigationConfig::load(),
    }
    .context("Failed to load configuration")?;

    match cli.command {
        Command::Replay {
            scenario,
            realtime,
            json,
        } => {
            let scenario = Scenario::load(&scenario)
                .with_context(|| format!("Failed to load scenario {}", scenario.display()))?;

            let report = if realtime {
                scenario.run_realtime(config).await?
            } else {
                scenario.replay(config)
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }
        Command::Config => {
            let rendered = config.to_toml().context("Failed to render configuration")?;
            print!("{rendered}");
        }
    }

    Ok(())
}
