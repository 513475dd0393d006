use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use reel_core::{MovieFilter, MovieId};

#[derive(Parser)]
#[command(name = "reel")]
#[command(about = "Keep track of movies you love and movies you have seen")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Movie service base URL (overrides REEL_API_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List locally stored movies
    #[command(alias = "ls")]
    List {
        /// Only show favorites
        #[arg(long, conflicts_with = "watched")]
        favorites: bool,
        /// Only show watched movies
        #[arg(long)]
        watched: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one movie
    Show {
        /// Movie ID
        id: MovieId,
        /// Fetch the latest details from the movie service first
        #[arg(long)]
        refresh: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search the movie service and store the matches
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Fetch the full catalogue from the movie service
    Refresh,
    /// Create a movie on the movie service
    Add {
        /// Movie title
        title: String,
        /// Release year
        year: i32,
    },
    /// Mark a movie as favorite
    Favorite {
        /// Movie ID
        id: MovieId,
        /// Remove the mark instead
        #[arg(long)]
        off: bool,
    },
    /// Mark a movie as watched
    Watched {
        /// Movie ID
        id: MovieId,
        /// Remove the mark instead
        #[arg(long)]
        off: bool,
    },
    /// Remove every locally stored movie, including favorite and watched marks
    Reset,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

pub const fn list_filter(favorites: bool, watched: bool) -> MovieFilter {
    if favorites {
        MovieFilter::Favorites
    } else if watched {
        MovieFilter::Watched
    } else {
        MovieFilter::All
    }
}
