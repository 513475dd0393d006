use crate::commands::common::{normalize_search_query, print_movies, Context};
use crate::error::CliError;

pub async fn run_search(query: &str, as_json: bool, context: &Context) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let service = context.open_service().await?;
    let movies = service.search(&normalized_query).await?;

    if movies.is_empty() && !as_json {
        println!("No movies match '{normalized_query}'.");
        return Ok(());
    }

    print_movies(&movies, as_json)
}
