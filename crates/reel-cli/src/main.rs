//! Reel CLI - keep track of movies from the command line
//!
//! Browses the local movie store and syncs it with the movie service.

mod cli;
mod commands;
mod error;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use crate::cli::{list_filter, Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::Context;
use crate::commands::completions::run_completions;
use crate::commands::flags::{run_set_flag, Flag};
use crate::commands::list::run_list;
use crate::commands::refresh::run_refresh;
use crate::commands::reset::run_reset;
use crate::commands::search::run_search;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help().map_err(CliError::Io)?;
        println!();
        return Ok(());
    };

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }

    let context = Context::resolve(cli.db_path, cli.api_url)?;
    match command {
        Commands::List {
            favorites,
            watched,
            json,
        } => run_list(list_filter(favorites, watched), json, &context).await?,
        Commands::Show { id, refresh, json } => run_show(id, refresh, json, &context).await?,
        Commands::Search { query, json } => run_search(&query, json, &context).await?,
        Commands::Refresh => run_refresh(&context).await?,
        Commands::Add { title, year } => run_add(&title, year, &context).await?,
        Commands::Favorite { id, off } => run_set_flag(Flag::Favorite, id, !off, &context).await?,
        Commands::Watched { id, off } => run_set_flag(Flag::Watched, id, !off, &context).await?,
        Commands::Reset => run_reset(&context).await?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
