use reel_core::MovieFilter;

use crate::commands::common::{print_movies, Context};
use crate::error::CliError;

pub async fn run_list(filter: MovieFilter, as_json: bool, context: &Context) -> Result<(), CliError> {
    let store = context.open_store().await?;
    let movies = store.list(filter).await?;

    if movies.is_empty() && !as_json {
        match filter {
            MovieFilter::All => println!("No movies stored yet. Run `reel refresh` to fetch the catalogue."),
            MovieFilter::Favorites => println!("No favorite movies."),
            MovieFilter::Watched => println!("No watched movies."),
        }
        return Ok(());
    }

    print_movies(&movies, as_json)
}
