use std::collections::HashSet;

use async_trait::async_trait;

use super::model::*;

/// Document-store side: the movie collection.
#[async_trait]
pub trait MovieRepo: Send + Sync {
    async fn list_movies(&self, limit: i64) -> DbResult<Vec<MovieRecord>>;
    async fn search_movies(
        &self,
        title_pattern: Option<&str>,
        actor_pattern: Option<&str>,
    ) -> DbResult<Vec<MovieRecord>>;
    async fn update_movie_by_title(&self, title: &str, update: &MovieUpdate) -> DbResult<MovieRecord>;
    async fn list_distinct_titles(&self) -> DbResult<HashSet<String>>;
    async fn close(&self) {}
}

/// Graph-store side: Person-[:REVIEWED]->Movie. Read only.
#[async_trait]
pub trait ReviewGraphRepo: Send + Sync {
    async fn list_distinct_movie_titles(&self) -> DbResult<HashSet<String>>;
    async fn reviews_for_movie(&self, title: &str) -> DbResult<Vec<Review>>;
    async fn movies_rated_by_person(&self, name: &str) -> DbResult<RatedMovies>;
    async fn close(&self) {}
}

/// Case-insensitive substring match, the semantics both store
/// implementations follow for search.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Empty search patterns count as absent.
pub fn non_empty(pattern: Option<&str>) -> Option<&str> {
    pattern.filter(|p| !p.is_empty())
}
