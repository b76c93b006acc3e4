mod cli;
mod infra;
mod routes;
mod scrape;
mod server;

use epr_dashboard::error::AppError;

/// Parses the command line and dispatches. Registry calls block, so only
/// `serve` starts an async runtime.
pub fn run() -> Result<(), AppError> {
    cli::run()
}
