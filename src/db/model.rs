use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImdbInfo {
    pub rating: Option<f64>,
    pub votes: Option<i64>,
    pub id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Awards {
    pub wins: Option<i64>,
    pub nominations: Option<i64>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ViewerInfo {
    pub fresh: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CriticInfo {
    pub rotten: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TomatoesInfo {
    pub viewer: Option<ViewerInfo>,
    pub critic: Option<CriticInfo>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// A movie document. Unknown stored fields are dropped on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub runtime: Option<i64>,
    #[serde(default)]
    pub cast: Option<Vec<String>>,
    #[serde(default)]
    pub poster: Option<String>,
    pub title: String,
    #[serde(default)]
    pub fullplot: Option<String>,
    #[serde(default)]
    pub languages: Option<Vec<String>>,
    #[serde(default)]
    pub released: Option<DateTime<Utc>>,
    #[serde(default)]
    pub directors: Option<Vec<String>>,
    #[serde(default)]
    pub rated: Option<String>,
    #[serde(default)]
    pub awards: Option<Awards>,
    #[serde(default)]
    pub lastupdated: Option<String>,
    #[serde(default)]
    pub year: Option<i64>,
    #[serde(default)]
    pub imdb: Option<ImdbInfo>,
    #[serde(default)]
    pub countries: Option<Vec<String>>,
    #[serde(default, rename = "type")]
    pub movie_type: Option<String>,
    #[serde(default)]
    pub tomatoes: Option<TomatoesInfo>,
    #[serde(default)]
    pub num_mflix_comments: Option<i64>,
}

impl MovieRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            plot: None,
            genres: None,
            runtime: None,
            cast: None,
            poster: None,
            title: title.into(),
            fullplot: None,
            languages: None,
            released: None,
            directors: None,
            rated: None,
            awards: None,
            lastupdated: None,
            year: None,
            imdb: None,
            countries: None,
            movie_type: None,
            tomatoes: None,
            num_mflix_comments: None,
        }
    }

    /// Overwrite every field present in `update`. Returns true if the record
    /// changed.
    pub fn apply(&mut self, update: &MovieUpdate) -> bool {
        let before = self.clone();

        macro_rules! set {
            ($($field:ident),*) => {
                $(
                    if let Some(ref value) = update.$field {
                        self.$field = Some(value.clone());
                    }
                )*
            };
        }

        set!(
            plot, genres, runtime, cast, poster, fullplot, languages, released, directors, rated,
            awards, lastupdated, year, imdb, countries, movie_type, tomatoes, num_mflix_comments
        );
        if let Some(ref title) = update.title {
            self.title = title.clone();
        }

        *self != before
    }
}

/// Partial update for a movie. Absent and null fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MovieUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullplot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub released: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub awards: Option<Awards>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lastupdated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<ImdbInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<String>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub movie_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tomatoes: Option<TomatoesInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_mflix_comments: Option<i64>,
}

impl MovieUpdate {
    pub fn is_empty(&self) -> bool {
        *self == MovieUpdate::default()
    }
}

/// A rating as stored on a REVIEWED edge, integer or float.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rating {
    Int(i64),
    Float(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub person: Option<String>,
    pub rating: Option<Rating>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RatedMovies {
    pub count: u64,
    pub titles: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),
    #[error("Neo4j error: {0}")]
    Neo4j(#[from] neo4rs::Error),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("{0}")]
    NotFound(String),
}

impl DbError {
    pub fn movie_not_found(title: &str) -> Self {
        DbError::NotFound(format!("Movie with title {} not found", title))
    }
}

pub type DbResult<T> = Result<T, DbError>;
