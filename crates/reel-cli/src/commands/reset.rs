use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_reset(context: &Context) -> Result<(), CliError> {
    let service = context.open_service().await?;
    let removed = service.reset().await?;
    println!("Removed {removed} movies from {}", context.db_path.display());
    Ok(())
}
