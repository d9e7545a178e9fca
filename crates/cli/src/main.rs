use crate::{error::CliError, exit::ExitCode};
use clap::Parser;
use commands::Commands;
use engine_config::settings::EtlConfig;
use engine_runtime::{
    execution::{executor, factory::connect_warehouse, preview::preview},
    watermark::WatermarkReader,
};
use env::EnvManager;
use std::path::Path;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod env;
mod error;
mod exit;
mod output;

#[derive(Parser)]
#[command(
    name = "helpdesk-etl",
    version,
    about = "Incremental helpdesk extraction into a warehouse stage"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    // Logs go to stderr so that `preview` can stream CSV on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli.command).await {
        Ok(code) => code.into(),
        Err(err) => {
            error!(error = %err, "Aborted");
            ExitCode::GeneralError.into()
        }
    }
}

async fn dispatch(command: Commands) -> Result<ExitCode, CliError> {
    match command {
        Commands::Run { env_file, report } => {
            let config = load_config(env_file.as_deref())?;
            let run_report = executor::run(&config).await?;

            match report {
                Some(path) => output::write_report(&run_report, &path).await?,
                None => output::print_report(&run_report)?,
            }
            Ok(ExitCode::for_report(&run_report))
        }
        Commands::Watermark { env_file } => {
            let config = load_config(env_file.as_deref())?;
            let warehouse = connect_warehouse(&config.warehouse).await?;
            let mark = WatermarkReader::new(warehouse, config.watermark_query.clone())
                .read()
                .await?;

            match mark {
                Some(mark) => println!("{mark}"),
                None => println!("none"),
            }
            Ok(ExitCode::Success)
        }
        Commands::Preview {
            resource,
            env_file,
            output,
            incremental,
        } => {
            let config = load_config(env_file.as_deref())?;
            info!(resource = %resource, incremental, "Previewing resource");
            let csv = preview(&config, resource, incremental).await?;
            output::write_preview(&csv, output.as_deref()).await?;
            Ok(ExitCode::Success)
        }
    }
}

fn load_config(env_file: Option<&Path>) -> Result<EtlConfig, CliError> {
    let mut env = EnvManager::new();
    if let Some(path) = env_file {
        env.load_from_file(path)?;
    }
    Ok(EtlConfig::from_map(env.all())?)
}
