use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use tracing::debug;

use super::error::ApiError;
use super::types::*;
use crate::correlation::{MovieRatings, UserRatings};
use crate::db::{MovieRecord, MovieUpdate};
use crate::server::AppState;

pub const LIST_LIMIT: i64 = 100;
pub const MAX_QUERY_LENGTH: usize = 100;

pub async fn list_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieRecord>>, ApiError> {
    let movies = state.movies.list_movies(LIST_LIMIT).await?;
    Ok(Json(movies))
}

pub async fn search_movies(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<MovieRecord>>, ApiError> {
    check_length("movie_name", params.movie_name.as_deref())?;
    check_length("actor_name", params.actor_name.as_deref())?;

    let movies = state
        .movies
        .search_movies(params.movie_name.as_deref(), params.actor_name.as_deref())
        .await?;

    debug!("Search matched {} movies", movies.len());
    Ok(Json(movies))
}

pub async fn update_movie(
    State(state): State<AppState>,
    Path(title): Path<String>,
    body: Result<Json<MovieUpdate>, JsonRejection>,
) -> Result<Json<MovieRecord>, ApiError> {
    let Json(update) = body?;
    let movie = state.movies.update_movie_by_title(&title, &update).await?;
    Ok(Json(movie))
}

pub async fn common_movies(State(state): State<AppState>) -> Result<Json<CommonMoviesResponse>, ApiError> {
    let count = state.correlation.count_common_titles().await?;
    Ok(Json(CommonMoviesResponse {
        common_movies_count: count,
    }))
}

pub async fn movie_ratings(
    State(state): State<AppState>,
    Query(params): Query<MovieRatingsParams>,
) -> Result<Json<MovieRatingsResponse>, ApiError> {
    let title = required("movie_title", params.movie_title)?;

    let ratings = state.correlation.movie_ratings(&title).await?;
    let response = match ratings {
        MovieRatings::Found(ratings) => MovieRatingsResponse::Ratings {
            movie: title,
            ratings,
        },
        MovieRatings::NoRatings => MovieRatingsResponse::no_ratings(&title),
    };

    Ok(Json(response))
}

pub async fn user_movie_ratings(
    State(state): State<AppState>,
    Query(params): Query<UserRatingsParams>,
) -> Result<Json<UserRatingsResponse>, ApiError> {
    let name = required("user_name", params.user_name)?;

    let rated = state.correlation.user_ratings(&name).await?;
    let response = match rated {
        UserRatings::Found { count, titles } => UserRatingsResponse::User {
            user: UserSummary {
                person: name,
                rated_movies_count: count,
                rated_movies: titles,
            },
        },
        UserRatings::NoRatings => UserRatingsResponse::no_ratings(&name),
    };

    Ok(Json(response))
}

fn check_length(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if v.chars().count() > MAX_QUERY_LENGTH => Err(ApiError::Validation(format!(
            "{} must be at most {} characters",
            field, MAX_QUERY_LENGTH
        ))),
        _ => Ok(()),
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("Missing query parameter: {}", field)))
}
