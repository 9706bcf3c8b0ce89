use std::collections::HashSet;

use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph, Query, Row};
use tracing::{debug, info};

use super::model::*;
use super::repo::*;

const MOVIE_TITLES: &str = "MATCH (m:Movie) RETURN m.title AS title";

const MOVIE_REVIEWS: &str = "
    MATCH (p:Person)-[r:REVIEWED]->(m:Movie {title: $movie_title})
    RETURN p.name AS person, r.rating AS rating, r.summary AS summary";

const PERSON_RATED_MOVIES: &str = "
    MATCH (p:Person {name: $user_name})-[:REVIEWED]->(m:Movie)
    RETURN p.name AS person, count(m) AS rated_movies_count, collect(m.title) AS rated_movies";

pub struct Neo4jRepository {
    graph: Graph,
}

impl Neo4jRepository {
    pub async fn new(uri: &str, username: &str, password: &str) -> DbResult<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(username)
            .password(password)
            .build()?;
        let graph = Graph::connect(config).await?;
        graph.run(query("RETURN 1")).await?;

        info!("Connected to Neo4j at {}", uri);

        Ok(Self { graph })
    }

    /// Run `q` on a connection borrowed from the driver pool and drain it.
    /// The connection is returned when the stream drops, including on error.
    async fn fetch_rows(&self, q: Query) -> DbResult<Vec<Row>> {
        let mut stream = self.graph.execute(q).await?;
        let mut rows = Vec::new();
        while let Some(row) = stream.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }
}

#[async_trait]
impl ReviewGraphRepo for Neo4jRepository {
    async fn list_distinct_movie_titles(&self) -> DbResult<HashSet<String>> {
        let rows = self.fetch_rows(query(MOVIE_TITLES)).await?;

        let titles: HashSet<String> = rows
            .iter()
            .filter_map(|row| row.get::<String>("title").ok())
            .collect();

        debug!("Neo4j holds {} distinct movie titles", titles.len());
        Ok(titles)
    }

    async fn reviews_for_movie(&self, title: &str) -> DbResult<Vec<Review>> {
        let rows = self
            .fetch_rows(query(MOVIE_REVIEWS).param("movie_title", title))
            .await?;

        Ok(rows.iter().map(review_from_row).collect())
    }

    async fn movies_rated_by_person(&self, name: &str) -> DbResult<RatedMovies> {
        let rows = self
            .fetch_rows(query(PERSON_RATED_MOVIES).param("user_name", name))
            .await?;

        // Aggregation yields no row at all when the person has no REVIEWED edge.
        let Some(row) = rows.first() else {
            return Ok(RatedMovies::default());
        };

        let count = row
            .get::<i64>("rated_movies_count")
            .map_err(|e| DbError::Decode(e.to_string()))?;
        let titles = row
            .get::<Vec<String>>("rated_movies")
            .map_err(|e| DbError::Decode(e.to_string()))?;

        Ok(RatedMovies {
            count: count.max(0) as u64,
            titles,
        })
    }
}

/// Missing or null properties come back as `None` rather than failing the
/// whole result.
fn review_from_row(row: &Row) -> Review {
    let rating = row
        .get::<i64>("rating")
        .map(Rating::Int)
        .or_else(|_| row.get::<f64>("rating").map(Rating::Float))
        .ok();

    Review {
        person: row.get::<String>("person").ok(),
        rating,
        summary: row.get::<String>("summary").ok(),
    }
}
