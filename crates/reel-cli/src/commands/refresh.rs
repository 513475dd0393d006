use reel_core::MovieFilter;

use crate::commands::common::Context;
use crate::error::CliError;

pub async fn run_refresh(context: &Context) -> Result<(), CliError> {
    let service = context.open_service().await?;
    if !service.refresh().await {
        return Err(CliError::RefreshFailed);
    }

    let stored = service.store().list(MovieFilter::All).await?;
    println!("Refresh completed ({} movies stored)", stored.len());
    Ok(())
}
