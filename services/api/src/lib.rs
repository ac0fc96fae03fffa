mod cli;
mod demo;
mod infra;
mod report;
mod routes;
mod server;

use haken_contracts::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
