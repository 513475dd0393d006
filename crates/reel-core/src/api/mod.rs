//! Remote movie service client.
//!
//! `RemoteSource` is the seam the synchronizer talks to; `MovieApiClient` is
//! the reqwest-backed implementation of the service's JSON endpoints:
//!
//! - `GET  movies`             all movies
//! - `GET  movies?search=...`  movies matching a query
//! - `GET  movies/{id}`        one movie
//! - `POST movies`             create a movie, returns the canonical record

use std::future::Future;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::config::ApiConfig;
use crate::models::{MovieId, NewMovie, RemoteMovie};
use crate::util::compact_text;

#[cfg(test)]
pub(crate) mod testing;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Movie API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Movie API error: {0}")]
    Api(String),
    #[error("Invalid movie payload: {0}")]
    InvalidPayload(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Read/create access to the remote movie catalogue.
pub trait RemoteSource: Send + Sync {
    fn fetch_all(&self) -> impl Future<Output = ApiResult<Vec<RemoteMovie>>> + Send;

    fn search(&self, query: &str) -> impl Future<Output = ApiResult<Vec<RemoteMovie>>> + Send;

    fn fetch_by_id(&self, id: MovieId) -> impl Future<Output = ApiResult<RemoteMovie>> + Send;

    fn add(&self, movie: &NewMovie) -> impl Future<Output = ApiResult<RemoteMovie>> + Send;
}

#[derive(Clone)]
pub struct MovieApiClient {
    config: ApiConfig,
    client: reqwest::Client,
}

impl MovieApiClient {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        if config.timeout.is_zero() {
            return Err(ApiError::InvalidConfiguration(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    async fn decode<T: DeserializeOwned>(&self, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        if self.config.log_bodies {
            tracing::debug!(%url, status = status.as_u16(), body = %body, "movie API response");
        }

        if !status.is_success() {
            return Err(ApiError::Api(parse_api_error(status, &body)));
        }

        serde_json::from_str(&body).map_err(|error| {
            ApiError::InvalidPayload(format!("{error}: {}", compact_text(&body)))
        })
    }
}

impl RemoteSource for MovieApiClient {
    async fn fetch_all(&self) -> ApiResult<Vec<RemoteMovie>> {
        let url = self.config.endpoint("movies");
        tracing::debug!(%url, "fetching all movies");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        self.decode(response).await
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<RemoteMovie>> {
        let url = self.config.endpoint("movies");
        tracing::debug!(%url, query, "searching movies");
        let response = self
            .client
            .get(&url)
            .query(&[("search", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        self.decode(response).await
    }

    async fn fetch_by_id(&self, id: MovieId) -> ApiResult<RemoteMovie> {
        let url = self.config.endpoint(&format!("movies/{id}"));
        tracing::debug!(%url, "fetching movie");
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        self.decode(response).await
    }

    async fn add(&self, movie: &NewMovie) -> ApiResult<RemoteMovie> {
        let url = self.config.endpoint("movies");
        if self.config.log_bodies {
            tracing::debug!(%url, title = %movie.title, year = movie.year, "creating movie");
        }
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(movie)
            .send()
            .await?;
        self.decode(response).await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}
