use crate::scrape::{run_scrape, ScrapeArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use epr_dashboard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "EPR Plastic Dashboard Scraper",
    about = "Fetch PIBO registrations from the CPCB EPR Plastic dashboard and export them",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one scrape from the terminal and optionally write CSV/XLSX files
    Scrape(ScrapeArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args),
        Command::Scrape(args) => run_scrape(args),
    }
}
