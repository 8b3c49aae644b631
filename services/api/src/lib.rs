mod cli;
mod infra;
mod routes;
mod server;

use formation::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
