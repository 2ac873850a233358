mod cli;
mod commands;
mod infra;

use estate_portal::PortalError;

pub async fn run() -> Result<(), PortalError> {
    cli::run().await
}
