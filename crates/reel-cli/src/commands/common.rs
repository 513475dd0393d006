use std::env;
use std::path::PathBuf;

use reel_core::api::MovieApiClient;
use reel_core::config::ApiConfig;
use reel_core::services::{MovieService, MovieStore};
use reel_core::util::normalize_text_option;
use reel_core::Movie;

use crate::error::CliError;

const DB_PATH_ENV: &str = "REEL_DB_PATH";

/// Where the CLI keeps its data and which movie service it talks to.
pub struct Context {
    pub db_path: PathBuf,
    pub api_url: Option<String>,
}

impl Context {
    pub fn resolve(cli_db_path: Option<PathBuf>, api_url: Option<String>) -> Result<Self, CliError> {
        Ok(Self {
            db_path: resolve_db_path(cli_db_path)?,
            api_url,
        })
    }

    pub async fn open_store(&self) -> Result<MovieStore, CliError> {
        Ok(MovieStore::open_path(self.db_path.clone()).await?)
    }

    pub async fn open_service(&self) -> Result<MovieService<MovieApiClient>, CliError> {
        let client = MovieApiClient::new(self.api_config()?)?;
        let store = self.open_store().await?;
        tracing::debug!(base_url = %client.config().base_url, "movie service configured");
        Ok(MovieService::new(store, client))
    }

    pub fn api_config(&self) -> Result<ApiConfig, CliError> {
        let config = ApiConfig::from_env()?;
        match self.api_url.as_deref() {
            Some(url) => Ok(config.with_base_url(url)?),
            None => Ok(config),
        }
    }
}

pub fn resolve_db_path(cli_db_path: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match cli_db_path.or_else(|| env::var_os(DB_PATH_ENV).map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default_db_path(),
    }
}

pub fn default_db_path() -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("reel").join("reel.db"))
        .ok_or(CliError::NoDataDir)
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    normalize_text_option(Some(query.to_string())).ok_or(CliError::EmptySearchQuery)
}

pub fn normalize_title(title: &str) -> Result<String, CliError> {
    normalize_text_option(Some(title.to_string())).ok_or(CliError::EmptyTitle)
}

pub fn format_movie_lines(movies: &[Movie]) -> Vec<String> {
    movies
        .iter()
        .map(|movie| {
            let id = movie.id.get();
            let marks = flag_marks(movie);
            let title = title_preview(&movie.title, 40);
            format!("{id:>6}  {marks}  {title:<40}  {}", movie.year)
        })
        .collect()
}

pub fn format_movie_details(movie: &Movie) -> Vec<String> {
    vec![
        format!("{} ({})", movie.title, movie.year),
        format!("id:        {}", movie.id),
        format!("favorite:  {}", yes_no(movie.is_favorite)),
        format!("watched:   {}", yes_no(movie.is_watched)),
        format!("image:     {}", movie.image_url),
    ]
}

/// Two-column marker: `*` for favorite, `w` for watched.
pub fn flag_marks(movie: &Movie) -> String {
    let favorite = if movie.is_favorite { '*' } else { ' ' };
    let watched = if movie.is_watched { 'w' } else { ' ' };
    format!("{favorite}{watched}")
}

pub fn title_preview(title: &str, max_chars: usize) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

const fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

pub fn print_movies(movies: &[Movie], as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(movies)?);
    } else {
        for line in format_movie_lines(movies) {
            println!("{line}");
        }
    }
    Ok(())
}
