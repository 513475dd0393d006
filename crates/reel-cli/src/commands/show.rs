use reel_core::{Movie, MovieId};

use crate::commands::common::{format_movie_details, Context};
use crate::error::CliError;

pub async fn run_show(
    id: MovieId,
    refresh: bool,
    as_json: bool,
    context: &Context,
) -> Result<(), CliError> {
    let movie = if refresh {
        let service = context.open_service().await?;
        if !service.refresh_movie(id).await {
            eprintln!("Could not refresh movie {id}; showing the stored copy.");
        }
        service.store().get(id).await?
    } else {
        context.open_store().await?.get(id).await?
    };

    let movie = movie.ok_or(CliError::MovieNotFound(id))?;
    print_movie(&movie, as_json)
}

fn print_movie(movie: &Movie, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(movie)?);
    } else {
        for line in format_movie_details(movie) {
            println!("{line}");
        }
    }
    Ok(())
}
