//! Movie repository implementation

use std::collections::HashMap;

use crate::error::Result;
use crate::models::{Movie, MovieFilter, MovieId};
use libsql::Connection;

const MOVIE_COLUMNS: &str = "id, title, year, image_url, is_favorite, is_watched";

/// Local-only flag state keyed by movie id, read in one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSnapshot {
    flags: HashMap<MovieId, (bool, bool)>,
}

impl FlagSnapshot {
    /// `(is_favorite, is_watched)` for `id`, or `(false, false)` if the id was
    /// not stored when the snapshot was taken.
    pub fn flags_for(&self, id: MovieId) -> (bool, bool) {
        self.flags.get(&id).copied().unwrap_or((false, false))
    }

    pub fn contains(&self, id: MovieId) -> bool {
        self.flags.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

impl FromIterator<(MovieId, (bool, bool))> for FlagSnapshot {
    fn from_iter<I: IntoIterator<Item = (MovieId, (bool, bool))>>(iter: I) -> Self {
        Self {
            flags: iter.into_iter().collect(),
        }
    }
}

/// Trait for movie storage operations (async)
#[allow(async_fn_in_trait)]
pub trait MovieRepository {
    /// List movies passing `filter`, in insertion order
    async fn list(&self, filter: MovieFilter) -> Result<Vec<Movie>>;

    /// Get a movie by ID
    async fn get(&self, id: MovieId) -> Result<Option<Movie>>;

    /// Read the favorite/watched flags of every stored movie
    async fn flag_snapshot(&self) -> Result<FlagSnapshot>;

    /// Insert or replace a single movie
    async fn upsert(&self, movie: &Movie) -> Result<()>;

    /// Insert or replace many movies atomically
    async fn upsert_many(&self, movies: &[Movie]) -> Result<()>;

    /// Set the favorite flag; returns whether a row matched
    async fn set_favorite(&self, id: MovieId, is_favorite: bool) -> Result<bool>;

    /// Set the watched flag; returns whether a row matched
    async fn set_watched(&self, id: MovieId, is_watched: bool) -> Result<bool>;

    /// Delete a single movie; returns whether a row matched
    async fn delete(&self, id: MovieId) -> Result<bool>;

    /// Delete every movie; returns the number of rows removed
    async fn clear(&self) -> Result<u64>;
}

/// libSQL implementation of `MovieRepository`
pub struct LibSqlMovieRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlMovieRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Parse a movie from a database row
    fn parse_movie(row: &libsql::Row) -> Result<Movie> {
        Ok(Movie {
            id: MovieId::new(row.get::<i64>(0)?),
            title: row.get(1)?,
            year: row.get(2)?,
            image_url: row.get(3)?,
            is_favorite: row.get::<i32>(4)? != 0,
            is_watched: row.get::<i32>(5)? != 0,
        })
    }

    async fn insert_or_replace(&self, movie: &Movie) -> Result<()> {
        // Replace every column except position, so a refreshed movie keeps its
        // place in list order
        self.conn
            .execute(
                "INSERT INTO movies (id, title, year, image_url, is_favorite, is_watched, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, (SELECT COALESCE(MAX(position), 0) + 1 FROM movies))
                 ON CONFLICT(id) DO UPDATE SET
                    title = excluded.title,
                    year = excluded.year,
                    image_url = excluded.image_url,
                    is_favorite = excluded.is_favorite,
                    is_watched = excluded.is_watched",
                libsql::params![
                    movie.id.get(),
                    movie.title.as_str(),
                    movie.year,
                    movie.image_url.as_str(),
                    i32::from(movie.is_favorite),
                    i32::from(movie.is_watched)
                ],
            )
            .await?;
        Ok(())
    }

    async fn set_flag(&self, column: &str, id: MovieId, value: bool) -> Result<bool> {
        let sql = format!("UPDATE movies SET {column} = ? WHERE id = ?");
        let rows = self
            .conn
            .execute(&sql, libsql::params![i32::from(value), id.get()])
            .await?;
        Ok(rows > 0)
    }
}

impl MovieRepository for LibSqlMovieRepository<'_> {
    async fn list(&self, filter: MovieFilter) -> Result<Vec<Movie>> {
        let predicate = match filter {
            MovieFilter::All => "",
            MovieFilter::Favorites => "WHERE is_favorite = 1",
            MovieFilter::Watched => "WHERE is_watched = 1",
        };
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies {predicate} ORDER BY position ASC");

        let mut rows = self.conn.query(&sql, ()).await?;
        let mut movies = Vec::new();
        while let Some(row) = rows.next().await? {
            movies.push(Self::parse_movie(&row)?);
        }
        Ok(movies)
    }

    async fn get(&self, id: MovieId) -> Result<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = ?");
        let mut rows = self.conn.query(&sql, libsql::params![id.get()]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_movie(&row)?)),
            None => Ok(None),
        }
    }

    async fn flag_snapshot(&self) -> Result<FlagSnapshot> {
        let mut rows = self
            .conn
            .query("SELECT id, is_favorite, is_watched FROM movies", ())
            .await?;

        let mut flags = Vec::new();
        while let Some(row) = rows.next().await? {
            let id = MovieId::new(row.get::<i64>(0)?);
            flags.push((id, (row.get::<i32>(1)? != 0, row.get::<i32>(2)? != 0)));
        }
        Ok(flags.into_iter().collect())
    }

    async fn upsert(&self, movie: &Movie) -> Result<()> {
        self.insert_or_replace(movie).await
    }

    async fn upsert_many(&self, movies: &[Movie]) -> Result<()> {
        if movies.is_empty() {
            return Ok(());
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for movie in movies {
            if let Err(e) = self.insert_or_replace(movie).await {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }

    async fn set_favorite(&self, id: MovieId, is_favorite: bool) -> Result<bool> {
        self.set_flag("is_favorite", id, is_favorite).await
    }

    async fn set_watched(&self, id: MovieId, is_watched: bool) -> Result<bool> {
        self.set_flag("is_watched", id, is_watched).await
    }

    async fn delete(&self, id: MovieId) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM movies WHERE id = ?", libsql::params![id.get()])
            .await?;
        Ok(rows > 0)
    }

    async fn clear(&self) -> Result<u64> {
        Ok(self.conn.execute("DELETE FROM movies", ()).await?)
    }
}
