use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::model::*;
use super::repo::*;

#[derive(Debug, Clone)]
struct ReviewedEdge {
    person: String,
    title: String,
    rating: Option<Rating>,
    summary: Option<String>,
}

/// Both stores held in process memory. Matches the MongoDB and Neo4j
/// implementations' semantics, including exact title matching and the
/// zero-modified-documents rule on update.
#[derive(Default)]
pub struct MemoryRepository {
    movies: RwLock<Vec<MovieRecord>>,
    graph_movies: RwLock<Vec<String>>,
    reviews: RwLock<Vec<ReviewedEdge>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_movie(&self, movie: MovieRecord) {
        self.movies.write().await.push(movie);
    }

    pub async fn insert_graph_movie(&self, title: &str) {
        self.graph_movies.write().await.push(title.to_string());
    }

    /// Adds a REVIEWED edge, creating the Movie node if needed.
    pub async fn insert_review(
        &self,
        person: &str,
        title: &str,
        rating: Option<Rating>,
        summary: Option<&str>,
    ) {
        {
            let mut graph_movies = self.graph_movies.write().await;
            if !graph_movies.iter().any(|t| t == title) {
                graph_movies.push(title.to_string());
            }
        }
        self.reviews.write().await.push(ReviewedEdge {
            person: person.to_string(),
            title: title.to_string(),
            rating,
            summary: summary.map(str::to_string),
        });
    }
}

#[async_trait]
impl MovieRepo for MemoryRepository {
    async fn list_movies(&self, limit: i64) -> DbResult<Vec<MovieRecord>> {
        let movies = self.movies.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(movies.iter().take(limit).cloned().collect())
    }

    async fn search_movies(
        &self,
        title_pattern: Option<&str>,
        actor_pattern: Option<&str>,
    ) -> DbResult<Vec<MovieRecord>> {
        let title_pattern = non_empty(title_pattern);
        let actor_pattern = non_empty(actor_pattern);

        let movies = self.movies.read().await;
        let found = movies
            .iter()
            .filter(|m| title_pattern.map_or(true, |p| contains_ignore_case(&m.title, p)))
            .filter(|m| {
                actor_pattern.map_or(true, |p| {
                    m.cast
                        .as_ref()
                        .is_some_and(|cast| cast.iter().any(|actor| contains_ignore_case(actor, p)))
                })
            })
            .cloned()
            .collect();

        Ok(found)
    }

    async fn update_movie_by_title(&self, title: &str, update: &MovieUpdate) -> DbResult<MovieRecord> {
        let mut movies = self.movies.write().await;
        let movie = movies
            .iter_mut()
            .find(|m| m.title == title)
            .ok_or_else(|| DbError::movie_not_found(title))?;

        if update.is_empty() {
            return Ok(movie.clone());
        }

        if !movie.apply(update) {
            return Err(DbError::movie_not_found(title));
        }

        Ok(movie.clone())
    }

    async fn list_distinct_titles(&self) -> DbResult<HashSet<String>> {
        let movies = self.movies.read().await;
        Ok(movies.iter().map(|m| m.title.clone()).collect())
    }
}

#[async_trait]
impl ReviewGraphRepo for MemoryRepository {
    async fn list_distinct_movie_titles(&self) -> DbResult<HashSet<String>> {
        let graph_movies = self.graph_movies.read().await;
        Ok(graph_movies.iter().cloned().collect())
    }

    async fn reviews_for_movie(&self, title: &str) -> DbResult<Vec<Review>> {
        let reviews = self.reviews.read().await;
        Ok(reviews
            .iter()
            .filter(|edge| edge.title == title)
            .map(|edge| Review {
                person: Some(edge.person.clone()),
                rating: edge.rating,
                summary: edge.summary.clone(),
            })
            .collect())
    }

    async fn movies_rated_by_person(&self, name: &str) -> DbResult<RatedMovies> {
        let reviews = self.reviews.read().await;
        let titles: Vec<String> = reviews
            .iter()
            .filter(|edge| edge.person == name)
            .map(|edge| edge.title.clone())
            .collect();

        Ok(RatedMovies {
            count: titles.len() as u64,
            titles,
        })
    }
}
