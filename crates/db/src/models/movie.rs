//! Movie entity model and DTOs.

use greenlight_core::movie::{validate_movie, Runtime};
use greenlight_core::types::{DbId, Timestamp};
use greenlight_core::validator::Validator;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full movie row from the `movies` table.
///
/// `version` is the optimistic-concurrency stamp: it starts at 1 and every
/// successful update increments it.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    #[serde(skip)]
    pub created_at: Timestamp,
    pub title: String,
    pub year: i32,
    #[sqlx(try_from = "i32")]
    pub runtime: Runtime,
    pub genres: Vec<String>,
    pub version: i32,
}

impl Movie {
    pub fn validate(&self, v: &mut Validator) {
        validate_movie(v, &self.title, self.year, self.runtime, &self.genres);
    }
}

/// DTO for inserting a movie. Identity, creation time and version are
/// assigned by the database.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMovie {
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub genres: Vec<String>,
}

impl CreateMovie {
    pub fn validate(&self, v: &mut Validator) {
        validate_movie(v, &self.title, self.year, self.runtime, &self.genres);
    }
}
