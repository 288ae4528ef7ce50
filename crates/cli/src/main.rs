use crate::{
    commands::Commands,
    config::AppConfig,
    error::CliError,
    shutdown::{ExitCode, ShutdownCoordinator},
};
use clap::Parser;
use connectors::{
    destination::DestinationClient,
    mssql::adapter::MssqlAdapter,
    relay::{client::RelayClient, destination::RelayDestination},
    source::SourceReader,
};
use engine::{
    executor::{SyncExecutor, SyncPlan},
    settings::SyncSettings,
};
use std::{sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info};

mod commands;
mod config;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "reportsync",
    version = "0.1.0",
    about = "SQL Server to Supabase reporting sync tool"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(
        long,
        global = true,
        help = "Path to an env file; .env.local is loaded when present"
    )]
    env_file: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logger
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let cli = Cli::parse();

    let coordinator = ShutdownCoordinator::new(CancellationToken::new());
    coordinator.register_handlers();

    let code = match run(cli, &coordinator).await {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            if coordinator.is_shutdown_requested() {
                ExitCode::ShutdownRequested
            } else {
                ExitCode::GeneralError
            }
        }
    };

    std::process::exit(code.as_i32());
}

async fn run(cli: Cli, coordinator: &ShutdownCoordinator) -> Result<ExitCode, CliError> {
    let config = AppConfig::load(cli.env_file.as_deref())?;

    match cli.command {
        Commands::Sync {
            batch_size,
            keep_going,
            parallelism,
            timeout_secs,
            dry_run,
            report,
        } => {
            let settings = SyncSettings {
                batch_size,
                keep_going,
                parallelism,
                timeout: timeout_secs.map(Duration::from_secs),
                dry_run,
            };

            let mut source = MssqlAdapter::connect(&config.source).await?;
            let destination = open_destination(&config)?;

            let executor = SyncExecutor::new(settings, coordinator.cancel_token())?;
            let plan = SyncPlan::executive_monthly(&config.source_table, &config.destination_table);

            let sync_report = executor.run(&mut source, destination, &plan).await?;

            match report {
                Some(path) => output::write_report(&sync_report, path).await?,
                None => output::print_report(&sync_report)?,
            }

            match sync_report.to_result() {
                Ok(()) => Ok(ExitCode::Success),
                Err(err) => {
                    error!("{err}");
                    if coordinator.is_shutdown_requested() {
                        Ok(ExitCode::ShutdownRequested)
                    } else {
                        Ok(ExitCode::GeneralError)
                    }
                }
            }
        }
        Commands::Inspect { table } => {
            let table = table.unwrap_or_else(|| config.source_table.clone());
            let mut source = MssqlAdapter::connect(&config.source).await?;

            let columns = source.table_schema(&table).await?;
            let stats = source.table_stats(&table).await?;
            output::print_schema(&table, &columns, &stats);

            Ok(ExitCode::Success)
        }
        Commands::Tables => {
            let mut source = MssqlAdapter::connect(&config.source).await?;

            let names = source.list_tables().await?;
            let mut tables = Vec::with_capacity(names.len());
            for name in names {
                let rows = source.row_count(&name).await?;
                tables.push((name, rows));
            }
            output::print_tables(&tables);

            Ok(ExitCode::Success)
        }
        Commands::TestConn { target } => {
            match target.as_str() {
                "source" => {
                    let mut source = MssqlAdapter::connect(&config.source).await?;
                    source.ping().await?;
                    info!("Source store is reachable");
                }
                "destination" => {
                    let destination = open_destination(&config)?;
                    destination.ping().await?;
                    info!("Destination store is reachable");
                }
                other => return Err(CliError::InvalidTestTarget(other.to_string())),
            }
            Ok(ExitCode::Success)
        }
        Commands::Verify => {
            let mut source = MssqlAdapter::connect(&config.source).await?;
            let destination = open_destination(&config)?;

            let source_count = source.row_count(&config.source_table).await?;
            let destination_count = destination.row_count(&config.destination_table).await?;

            if source_count != destination_count {
                return Err(CliError::CountMismatch {
                    source_rows: source_count,
                    destination: destination_count,
                });
            }

            info!("Row counts match: {source_count} records in both stores");
            Ok(ExitCode::Success)
        }
    }
}

fn open_destination(config: &AppConfig) -> Result<Arc<dyn DestinationClient>, CliError> {
    let relay = RelayClient::new(&config.relay_command)?;
    Ok(Arc::new(RelayDestination::new(relay, &config.relay_server)))
}
