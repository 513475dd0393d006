use reel_core::services::MovieStore;
use reel_core::MovieId;

use crate::commands::common::Context;
use crate::error::CliError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flag {
    Favorite,
    Watched,
}

/// Set or clear a local flag. Flags never touch the movie service.
pub async fn run_set_flag(
    flag: Flag,
    id: MovieId,
    value: bool,
    context: &Context,
) -> Result<(), CliError> {
    let store = context.open_store().await?;
    set_flag(&store, flag, id, value).await?;
    println!("{id}");
    Ok(())
}

pub async fn set_flag(
    store: &MovieStore,
    flag: Flag,
    id: MovieId,
    value: bool,
) -> Result<(), CliError> {
    let updated = match flag {
        Flag::Favorite => store.set_favorite(id, value).await?,
        Flag::Watched => store.set_watched(id, value).await?,
    };

    if updated {
        Ok(())
    } else {
        Err(CliError::MovieNotFound(id))
    }
}
