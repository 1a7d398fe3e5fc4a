// funnelwatch/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

use funnelwatch_core::FunnelError;
use funnelwatch_core::domain::DomainError;
use funnelwatch_core::infrastructure::error::InfrastructureError;

#[tokio::main]
async fn main() {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug funnelwatch analyze ... to see the details
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        report(err);
        // Exit with error code for schedulers / CI
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Collect { project_dir, date } => {
            commands::collect::execute(project_dir, date).await
        }
        Commands::Analyze {
            project_dir,
            end_date,
            days,
            deliver,
            format,
        } => commands::analyze::execute(project_dir, end_date, days, deliver, format),
        Commands::Status { project_dir } => commands::status::execute(project_dir),
        Commands::Show {
            project_dir,
            date,
            category,
        } => commands::show::execute(project_dir, date, category),
    }
}

/// Core errors carry miette diagnostics (code + help); anything else is printed plainly.
fn report(err: anyhow::Error) {
    let err = match err.downcast::<FunnelError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<DomainError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    match err.downcast::<InfrastructureError>() {
        Ok(e) => eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => eprintln!("❌ {:#}", err),
    }
}
