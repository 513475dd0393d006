use crate::commands::common::{normalize_title, Context};
use crate::error::CliError;

pub async fn run_add(title: &str, year: i32, context: &Context) -> Result<(), CliError> {
    let title = normalize_title(title)?;
    let service = context.open_service().await?;
    let movie = service.add(&title, year).await.ok_or(CliError::AddFailed)?;

    println!("{}", movie.id);
    Ok(())
}
