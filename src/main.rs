//! housing-prep - command-line entry point

use clap::Parser;
use housing_prep::cli::{cmd_inspect, cmd_run, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "housing_prep=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { data, target, output, config, cache, refresh } => {
            cmd_run(&data, &target, &output, config.as_deref(), cache.as_deref(), refresh)?;
        }
        Commands::Inspect { data } => {
            cmd_inspect(&data)?;
        }
    }

    Ok(())
}
