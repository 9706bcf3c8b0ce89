use std::collections::HashSet;

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::TryStreamExt;
use mongodb::{Client, Collection, Cursor};
use tracing::{debug, info};

use super::model::*;
use super::repo::*;

pub struct MongoRepository {
    client: Client,
    movies: Collection<Document>,
}

impl MongoRepository {
    pub async fn new(url: &str, database: &str, collection: &str) -> DbResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;

        info!("Connected to MongoDB database {} (collection {})", database, collection);

        Ok(Self {
            client,
            movies: db.collection(collection),
        })
    }

    async fn collect_movies(&self, cursor: Cursor<Document>) -> DbResult<Vec<MovieRecord>> {
        let docs: Vec<Document> = cursor.try_collect().await?;
        docs.into_iter().map(decode_movie).collect()
    }
}

#[async_trait]
impl MovieRepo for MongoRepository {
    async fn list_movies(&self, limit: i64) -> DbResult<Vec<MovieRecord>> {
        let cursor = self.movies.find(doc! {}).limit(limit).await?;
        self.collect_movies(cursor).await
    }

    async fn search_movies(
        &self,
        title_pattern: Option<&str>,
        actor_pattern: Option<&str>,
    ) -> DbResult<Vec<MovieRecord>> {
        let filter = search_filter(title_pattern, actor_pattern);
        debug!(filter = %filter, "Searching movies");
        let cursor = self.movies.find(filter).await?;
        self.collect_movies(cursor).await
    }

    async fn update_movie_by_title(&self, title: &str, update: &MovieUpdate) -> DbResult<MovieRecord> {
        let existing = self
            .movies
            .find_one(doc! { "title": title })
            .await?
            .ok_or_else(|| DbError::movie_not_found(title))?;

        if update.is_empty() {
            return decode_movie(existing);
        }

        let id = existing
            .get("_id")
            .cloned()
            .ok_or_else(|| DbError::Decode(format!("Movie {} has no _id", title)))?;

        let set = set_document(update)?;
        let result = self
            .movies
            .update_one(doc! { "_id": id.clone() }, doc! { "$set": set })
            .await?;

        if result.modified_count == 0 {
            return Err(DbError::movie_not_found(title));
        }

        let updated = self
            .movies
            .find_one(doc! { "_id": id })
            .await?
            .ok_or_else(|| DbError::movie_not_found(title))?;

        decode_movie(updated)
    }

    async fn list_distinct_titles(&self) -> DbResult<HashSet<String>> {
        let mut cursor = self
            .movies
            .find(doc! {})
            .projection(doc! { "title": 1, "_id": 0 })
            .await?;

        let mut titles = HashSet::new();
        while let Some(doc) = cursor.try_next().await? {
            if let Ok(title) = doc.get_str("title") {
                titles.insert(title.to_string());
            }
        }

        debug!("MongoDB holds {} distinct titles", titles.len());
        Ok(titles)
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client closed");
    }
}

/// Build the `find` filter for a search. Patterns are matched literally and
/// case-insensitively; `cast` matches if any entry matches.
pub fn search_filter(title_pattern: Option<&str>, actor_pattern: Option<&str>) -> Document {
    let mut filter = Document::new();

    if let Some(title) = non_empty(title_pattern) {
        filter.insert("title", doc! { "$regex": regex::escape(title), "$options": "i" });
    }
    if let Some(actor) = non_empty(actor_pattern) {
        filter.insert("cast", doc! { "$regex": regex::escape(actor), "$options": "i" });
    }

    filter
}

/// Build the `$set` document for a partial update. Timestamps are written as
/// BSON dates rather than strings, and integers that fit in 32 bits as Int32,
/// matching how the collection stores them. A value-identical update then
/// leaves the document unmodified.
pub fn set_document(update: &MovieUpdate) -> DbResult<Document> {
    let doc = bson::to_document(update).map_err(|e| DbError::Decode(e.to_string()))?;
    let mut set = narrow_ints_document(doc);

    if let Some(released) = update.released {
        set.insert("released", bson::DateTime::from_chrono(released));
    }
    if let Some(last_updated) = update.tomatoes.as_ref().and_then(|t| t.last_updated) {
        if let Ok(tomatoes) = set.get_document_mut("tomatoes") {
            tomatoes.insert("lastUpdated", bson::DateTime::from_chrono(last_updated));
        }
    }

    Ok(set)
}

fn narrow_ints_document(doc: Document) -> Document {
    doc.into_iter().map(|(key, value)| (key, narrow_ints(value))).collect()
}

fn narrow_ints(value: Bson) -> Bson {
    match value {
        Bson::Int64(n) => match i32::try_from(n) {
            Ok(small) => Bson::Int32(small),
            Err(_) => Bson::Int64(n),
        },
        Bson::Document(doc) => Bson::Document(narrow_ints_document(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(narrow_ints).collect()),
        other => other,
    }
}

pub fn decode_movie(doc: Document) -> DbResult<MovieRecord> {
    bson::from_document(normalize_document(doc)).map_err(|e| DbError::Decode(e.to_string()))
}

/// ObjectIds become hex strings and dates become RFC 3339 strings, at any
/// depth.
fn normalize_document(doc: Document) -> Document {
    doc.into_iter().map(|(key, value)| (key, normalize(value))).collect()
}

fn normalize(value: Bson) -> Bson {
    match value {
        Bson::ObjectId(oid) => Bson::String(oid.to_hex()),
        Bson::DateTime(dt) => Bson::String(dt.to_chrono().to_rfc3339()),
        Bson::Document(doc) => Bson::Document(normalize_document(doc)),
        Bson::Array(items) => Bson::Array(items.into_iter().map(normalize).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::oid::ObjectId;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_search_filter_combines_patterns() {
        let filter = search_filter(Some("train"), Some("barnes"));
        assert_eq!(
            filter,
            doc! {
                "title": { "$regex": "train", "$options": "i" },
                "cast": { "$regex": "barnes", "$options": "i" },
            }
        );
    }

    #[test]
    fn test_search_filter_empty() {
        assert_eq!(search_filter(None, Some("")), Document::new());
    }

    #[test]
    fn test_search_filter_escapes_metacharacters() {
        let filter = search_filter(Some("Se7en (1995)"), None);
        let title = filter.get_document("title").unwrap();
        assert_eq!(title.get_str("$regex").unwrap(), r"Se7en \(1995\)");
    }

    #[test]
    fn test_decode_movie_normalizes_ids_and_dates() {
        let oid = ObjectId::parse_str("573a1390f29313caabcd42e8").unwrap();
        let released = Utc.with_ymd_and_hms(1903, 12, 1, 0, 0, 0).unwrap();
        let doc = doc! {
            "_id": oid,
            "title": "The Great Train Robbery",
            "cast": ["A.C. Abadie", "George Barnes"],
            "released": bson::DateTime::from_chrono(released),
            "runtime": 11_i32,
            "imdb": { "rating": 7.4, "votes": 9847_i32, "id": 439_i32 },
            "unknown_field": "ignored",
        };

        let movie = decode_movie(doc).unwrap();
        assert_eq!(movie.id, "573a1390f29313caabcd42e8");
        assert_eq!(movie.released, Some(released));
        assert_eq!(movie.runtime, Some(11));
        assert_eq!(movie.imdb.unwrap().votes, Some(9847));
        assert_eq!(movie.cast.unwrap().len(), 2);
    }

    #[test]
    fn test_decode_movie_requires_title() {
        let doc = doc! { "_id": ObjectId::new() };
        assert!(matches!(decode_movie(doc), Err(DbError::Decode(_))));
    }

    #[test]
    fn test_set_document_only_present_fields() {
        let released = Utc.with_ymd_and_hms(2010, 7, 16, 0, 0, 0).unwrap();
        let update = MovieUpdate {
            plot: Some("Dreams within dreams".to_string()),
            runtime: Some(148),
            released: Some(released),
            ..Default::default()
        };

        let set = set_document(&update).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.get_str("plot").unwrap(), "Dreams within dreams");
        assert_eq!(set.get("runtime"), Some(&Bson::Int32(148)));
        assert_eq!(
            set.get_datetime("released").unwrap(),
            &bson::DateTime::from_chrono(released)
        );
    }

    #[test]
    fn test_set_document_matches_stored_int_types() {
        let stored = doc! {
            "runtime": 11_i32,
            "imdb": { "rating": 7.4, "votes": 9847_i32, "id": 439_i32 },
        };
        let update = MovieUpdate {
            runtime: Some(11),
            imdb: Some(ImdbInfo {
                rating: Some(7.4),
                votes: Some(9847),
                id: Some(439),
            }),
            ..Default::default()
        };

        let set = set_document(&update).unwrap();
        assert_eq!(set.get("runtime"), stored.get("runtime"));
        assert_eq!(set.get_document("imdb").unwrap(), stored.get_document("imdb").unwrap());
    }

    #[test]
    fn test_set_document_keeps_wide_ints() {
        let update = MovieUpdate {
            num_mflix_comments: Some(5_000_000_000),
            ..Default::default()
        };
        let set = set_document(&update).unwrap();
        assert_eq!(set.get("num_mflix_comments"), Some(&Bson::Int64(5_000_000_000)));
    }
}
