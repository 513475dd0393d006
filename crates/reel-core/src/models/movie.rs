//! Movie model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier shared by the remote service and the local store.
///
/// Assigned by the server and never reassigned, so it is the only join key
/// between remote records and local rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(i64);

impl MovieId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for MovieId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MovieId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

/// A movie as stored locally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Server-assigned identifier
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Release year
    pub year: i32,
    /// Poster image URI
    pub image_url: String,
    /// Local-only favorite flag
    pub is_favorite: bool,
    /// Local-only watched flag
    pub is_watched: bool,
}

impl Movie {
    /// Materialize a remote record with both local-only flags cleared.
    #[must_use]
    pub fn from_remote(remote: RemoteMovie) -> Self {
        Self::from_remote_with_flags(remote, false, false)
    }

    /// Materialize a remote record carrying forward the given local flags.
    #[must_use]
    pub fn from_remote_with_flags(remote: RemoteMovie, is_favorite: bool, is_watched: bool) -> Self {
        Self {
            id: remote.id,
            title: remote.title,
            year: remote.year,
            image_url: remote.image_url,
            is_favorite,
            is_watched,
        }
    }
}

/// A movie record as the remote service transfers it.
///
/// The service has no notion of favorite/watched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMovie {
    pub id: MovieId,
    pub title: String,
    pub year: i32,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Request body for creating a movie on the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
}

impl NewMovie {
    pub fn new(title: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }
}

/// Which slice of the local store a list read returns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovieFilter {
    #[default]
    All,
    Favorites,
    Watched,
}
