//! Repository for the `movies` table.

use greenlight_core::filters::{calculate_metadata, Filters, Metadata};
use greenlight_core::types::DbId;
use sqlx::FromRow;

use crate::error::DbError;
use crate::models::movie::{CreateMovie, Movie};
use crate::Db;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, created_at, title, year, runtime, genres, version";

/// A movie row plus the window count of all rows matching the filter.
#[derive(FromRow)]
struct MoviePageRow {
    total_records: i64,
    #[sqlx(flatten)]
    movie: Movie,
}

/// Provides CRUD and listing operations for movies.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a new movie, returning the created row with its assigned id,
    /// creation time and version 1.
    pub async fn insert(db: &Db, input: &CreateMovie) -> Result<Movie, DbError> {
        let query = format!(
            "INSERT INTO movies (title, year, runtime, genres)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let movie = db
            .run(
                sqlx::query_as::<_, Movie>(&query)
                    .bind(&input.title)
                    .bind(input.year)
                    .bind(input.runtime.minutes())
                    .bind(&input.genres)
                    .fetch_one(db.pool()),
            )
            .await?;
        tracing::debug!(movie_id = movie.id, "Movie inserted");
        Ok(movie)
    }

    /// Fetch one movie by id. Ids below 1 never exist and short-circuit to
    /// [`DbError::NotFound`] without touching the database.
    pub async fn get(db: &Db, id: DbId) -> Result<Movie, DbError> {
        if id < 1 {
            return Err(DbError::NotFound);
        }
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = $1");
        db.run(
            sqlx::query_as::<_, Movie>(&query)
                .bind(id)
                .fetch_optional(db.pool()),
        )
        .await?
        .ok_or(DbError::NotFound)
    }

    /// List movies matching `title` and `genres`, sorted and paginated by
    /// `filters`.
    ///
    /// An empty `title` matches every title; otherwise it is matched as a
    /// full-text query against the title. A non-empty `genres` keeps only
    /// movies whose genres contain every requested genre. Ordering is
    /// `filters.sort` with `id ASC` as the tiebreaker in both directions.
    ///
    /// # Panics
    ///
    /// Panics if `filters.sort` is outside its safelist; validate filters
    /// before calling.
    pub async fn get_all(
        db: &Db,
        title: &str,
        genres: &[String],
        filters: &Filters,
    ) -> Result<(Vec<Movie>, Metadata), DbError> {
        let query = format!(
            "SELECT count(*) OVER() AS total_records, {COLUMNS}
             FROM movies
             WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
               AND (genres @> $2 OR $2 = '{{}}')
             ORDER BY {column} {direction}, id ASC
             LIMIT $3 OFFSET $4",
            column = filters.sort_column(),
            direction = filters.sort_direction().as_sql(),
        );
        let rows = db
            .run(
                sqlx::query_as::<_, MoviePageRow>(&query)
                    .bind(title)
                    .bind(genres)
                    .bind(filters.limit())
                    .bind(filters.offset())
                    .fetch_all(db.pool()),
            )
            .await?;

        let total_records = rows.first().map_or(0, |row| row.total_records);
        let metadata = calculate_metadata(total_records, filters.page, filters.page_size);
        let movies = rows.into_iter().map(|row| row.movie).collect();
        Ok((movies, metadata))
    }

    /// Overwrite the mutable fields of `movie` if its version still matches
    /// the stored one. Returns the new version.
    ///
    /// A stale version, or a row deleted since it was read, yields
    /// [`DbError::EditConflict`].
    pub async fn update(db: &Db, movie: &Movie) -> Result<i32, DbError> {
        let version = db
            .run(
                sqlx::query_scalar::<_, i32>(
                    "UPDATE movies
                     SET title = $1, year = $2, runtime = $3, genres = $4, version = version + 1
                     WHERE id = $5 AND version = $6
                     RETURNING version",
                )
                .bind(&movie.title)
                .bind(movie.year)
                .bind(movie.runtime.minutes())
                .bind(&movie.genres)
                .bind(movie.id)
                .bind(movie.version)
                .fetch_optional(db.pool()),
            )
            .await?;

        match version {
            Some(version) => {
                tracing::debug!(movie_id = movie.id, version, "Movie updated");
                Ok(version)
            }
            None => {
                tracing::warn!(
                    movie_id = movie.id,
                    expected_version = movie.version,
                    "Movie update lost an edit conflict"
                );
                Err(DbError::EditConflict)
            }
        }
    }

    /// Delete a movie by id.
    pub async fn delete(db: &Db, id: DbId) -> Result<(), DbError> {
        if id < 1 {
            return Err(DbError::NotFound);
        }
        let result = db
            .run(
                sqlx::query("DELETE FROM movies WHERE id = $1")
                    .bind(id)
                    .execute(db.pool()),
            )
            .await?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        tracing::debug!(movie_id = id, "Movie deleted");
        Ok(())
    }
}
