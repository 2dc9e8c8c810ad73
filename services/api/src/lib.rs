mod batch;
mod cli;
mod infra;
mod routes;
mod server;

use posting_fit::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
