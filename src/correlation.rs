//! Cross-store queries over the movie catalog and the review graph.
//!
//! The two stores share no key. Movies are joined by title string only, with
//! exact and case-sensitive matching: "Matrix" and "matrix" are different
//! movies here, and so are titles differing in whitespace.

use std::sync::Arc;

use tracing::debug;

use crate::db::{DbResult, MovieRepo, Review, ReviewGraphRepo};

/// Reviews for a movie title. `NoRatings` covers both a movie without
/// reviews and a title the graph does not know.
#[derive(Debug, Clone, PartialEq)]
pub enum MovieRatings {
    Found(Vec<Review>),
    NoRatings,
}

/// Movies rated by a person. `NoRatings` covers both an unknown person and a
/// person without reviews.
#[derive(Debug, Clone, PartialEq)]
pub enum UserRatings {
    Found { count: u64, titles: Vec<String> },
    NoRatings,
}

#[derive(Clone)]
pub struct CorrelationService {
    movies: Arc<dyn MovieRepo>,
    graph: Arc<dyn ReviewGraphRepo>,
}

impl CorrelationService {
    pub fn new(movies: Arc<dyn MovieRepo>, graph: Arc<dyn ReviewGraphRepo>) -> Self {
        Self { movies, graph }
    }

    /// Number of titles present in both stores. Duplicates on either side
    /// count once.
    pub async fn count_common_titles(&self) -> DbResult<usize> {
        let (catalog, graph) = tokio::try_join!(
            self.movies.list_distinct_titles(),
            self.graph.list_distinct_movie_titles(),
        )?;

        let common = catalog.intersection(&graph).count();
        debug!(
            catalog = catalog.len(),
            graph = graph.len(),
            common,
            "Correlated movie titles"
        );
        Ok(common)
    }

    pub async fn movie_ratings(&self, title: &str) -> DbResult<MovieRatings> {
        let reviews = self.graph.reviews_for_movie(title).await?;
        if reviews.is_empty() {
            return Ok(MovieRatings::NoRatings);
        }
        Ok(MovieRatings::Found(reviews))
    }

    pub async fn user_ratings(&self, name: &str) -> DbResult<UserRatings> {
        let rated = self.graph.movies_rated_by_person(name).await?;
        if rated.count == 0 {
            return Ok(UserRatings::NoRatings);
        }
        Ok(UserRatings::Found {
            count: rated.count,
            titles: rated.titles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{MemoryRepository, MovieRecord, Rating};

    async fn service_with(
        catalog_titles: &[&str],
        graph_titles: &[&str],
    ) -> (CorrelationService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        for (i, title) in catalog_titles.iter().enumerate() {
            repo.insert_movie(MovieRecord::new(i.to_string(), *title)).await;
        }
        for title in graph_titles {
            repo.insert_graph_movie(title).await;
        }
        (CorrelationService::new(repo.clone(), repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_count_common_titles() {
        let (service, _) = service_with(&["Inception", "Matrix"], &["Matrix", "Avatar"]).await;
        assert_eq!(service.count_common_titles().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_common_titles_dedupes_both_sides() {
        let (service, _) = service_with(
            &["Matrix", "Matrix", "Inception"],
            &["Matrix", "Matrix", "Inception", "Avatar"],
        )
        .await;
        assert_eq!(service.count_common_titles().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_count_common_titles_is_case_and_whitespace_sensitive() {
        let (service, _) = service_with(&["matrix", "Inception "], &["Matrix", "Inception"]).await;
        assert_eq!(service.count_common_titles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_common_titles_empty_stores() {
        let (service, _) = service_with(&[], &[]).await;
        assert_eq!(service.count_common_titles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_movie_ratings() {
        let (service, repo) = service_with(&[], &[]).await;
        repo.insert_review("Jessica Thompson", "Cloud Atlas", Some(Rating::Int(95)), Some("An amazing journey"))
            .await;
        repo.insert_review("Angela Scope", "Cloud Atlas", Some(Rating::Float(62.5)), None)
            .await;

        match service.movie_ratings("Cloud Atlas").await.unwrap() {
            MovieRatings::Found(reviews) => {
                assert_eq!(reviews.len(), 2);
                assert_eq!(reviews[0].person.as_deref(), Some("Jessica Thompson"));
                assert_eq!(reviews[0].rating, Some(Rating::Int(95)));
                assert_eq!(reviews[1].summary, None);
            }
            MovieRatings::NoRatings => panic!("expected ratings"),
        }
    }

    #[tokio::test]
    async fn test_movie_without_reviews_and_unknown_movie_look_the_same() {
        let (service, _) = service_with(&[], &["The Matrix"]).await;
        assert_eq!(service.movie_ratings("The Matrix").await.unwrap(), MovieRatings::NoRatings);
        assert_eq!(service.movie_ratings("Nonexistent").await.unwrap(), MovieRatings::NoRatings);
    }

    #[tokio::test]
    async fn test_user_ratings() {
        let (service, repo) = service_with(&[], &[]).await;
        repo.insert_review("Jessica Thompson", "Cloud Atlas", Some(Rating::Int(95)), None).await;
        repo.insert_review("Jessica Thompson", "The Replacements", Some(Rating::Int(65)), None)
            .await;

        assert_eq!(
            service.user_ratings("Jessica Thompson").await.unwrap(),
            UserRatings::Found {
                count: 2,
                titles: vec!["Cloud Atlas".to_string(), "The Replacements".to_string()],
            }
        );
        assert_eq!(service.user_ratings("jessica thompson").await.unwrap(), UserRatings::NoRatings);
    }
}
