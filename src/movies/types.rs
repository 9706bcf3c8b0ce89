use serde::{Deserialize, Serialize};

use crate::db::Review;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SearchParams {
    pub movie_name: Option<String>,
    pub actor_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct MovieRatingsParams {
    pub movie_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct UserRatingsParams {
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonMoviesResponse {
    pub common_movies_count: usize,
}

/// Either the ratings for a movie or a "no ratings" message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MovieRatingsResponse {
    Ratings { movie: String, ratings: Vec<Review> },
    Message { message: String },
}

impl MovieRatingsResponse {
    pub fn no_ratings(title: &str) -> Self {
        MovieRatingsResponse::Message {
            message: format!("No ratings found for movie: {}", title),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub person: String,
    pub rated_movies_count: u64,
    pub rated_movies: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRatingsResponse {
    User { user: UserSummary },
    Message { message: String },
}

impl UserRatingsResponse {
    pub fn no_ratings(name: &str) -> Self {
        UserRatingsResponse::Message {
            message: format!("No ratings found for user: {}", name),
        }
    }
}
