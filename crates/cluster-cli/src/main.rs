//! clusterctl binary entrypoint.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cluster_cli::cli::{Cli, Commands};
use cluster_cli::commands::{
    ClusterCommand, HealthCommand, LogsCommand, MetricsCommand, NodesCommand, OperatorCommand,
    RemoteConfigCommand, connect,
};
use cluster_cli::config::ConfigStore;
use cluster_cli::output::OutputFormat;
use cluster_cli::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout().lock();
    match runtime.block_on(run(cli, &mut stdout)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            for hint in e.hints() {
                eprintln!("{hint}");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run<W: Write>(cli: Cli, out: &mut W) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.format);
    let mut store = ConfigStore::load(cli.config_file.as_deref())?;
    let requested = cli.cluster.as_deref();

    match &cli.command {
        Commands::Clusters => return ClusterCommand::new(&mut store).list(out, &format),
        Commands::Use { name } => return ClusterCommand::new(&mut store).select(out, &format, name),
        Commands::Which => return ClusterCommand::new(&mut store).which(out, &format, requested),
        _ => {}
    }

    let client = connect(store.config(), requested)?;
    match &cli.command {
        Commands::Health => HealthCommand::new(&client).execute(out, &format).await?,
        Commands::Nodes => NodesCommand::new(&client).list(out, &format).await?,
        Commands::Leader => NodesCommand::new(&client).leader(out, &format).await?,
        Commands::Operator { command } => {
            OperatorCommand::new(&client).execute(out, &format, command).await?;
        }
        Commands::Logs(args) => LogsCommand::new(&client).execute(out, &format, args).await?,
        Commands::Metrics => MetricsCommand::new(&client).execute(out, &format).await?,
        Commands::Config { command } => {
            RemoteConfigCommand::new(&client).execute(out, &format, command).await?;
        }
        Commands::Clusters | Commands::Use { .. } | Commands::Which => {}
    }

    Ok(())
}
