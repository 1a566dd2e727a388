use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use qd_advisor::cli::{self, Cli, Commands};
use qd_advisor::commands;
use qd_advisor::config::{self, ConfigBuilder, DriverConfigInput};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    initialize_logging(&cli);

    tokio::select! {
        result = run_main(cli) => result,
        _ = wait_for_shutdown_signal() => {
            info!("received shutdown signal; letting the in-flight probe finish its rollback");
            Ok(())
        }
    }
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn initialize_logging(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level)
    };

    fmt().with_env_filter(filter).with_target(false).init();
}

async fn run_main(cli: Cli) -> Result<()> {
    let (file_config, _root_dir) = config::load_config(&cli.config_file)?;

    match cli.command {
        Commands::Analyze(args) => {
            let cli_input: DriverConfigInput = args.driver_args.clone().into();
            let config = ConfigBuilder::new().with_file(file_config).with_cli_args(cli_input).resolve()?;
            info!("running the full pipeline over a statement corpus");
            commands::run_analyze(&config, &args).await
        }
        Commands::Stats { command } => {
            let driver_args = match &command {
                cli::StatsCommands::Dump { driver_args, .. } => driver_args.clone(),
                cli::StatsCommands::Restore { driver_args, .. } => driver_args.clone(),
            };
            let cli_input: DriverConfigInput = driver_args.into();
            let config = ConfigBuilder::new().with_file(file_config).with_cli_args(cli_input).resolve()?;
            info!("driving the statistics store");
            commands::run_stats(&config, &command).await
        }
        Commands::Explain(args) => {
            let cli_input: DriverConfigInput = args.driver_args.clone().into();
            let config = ConfigBuilder::new().with_file(file_config).with_cli_args(cli_input).resolve()?;
            info!("explaining a single ad-hoc statement");
            commands::run_explain(&config, &args).await
        }
    }
}
