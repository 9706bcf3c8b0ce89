use serde::{Deserialize, Serialize};

pub const ENV_MONGODB_URL: &str = "MONGODB_URL";
pub const ENV_MONGODB_NAME: &str = "MONGODB_NAME";
pub const ENV_BOLT_URI: &str = "BOLT_URI";
pub const ENV_USERNAME: &str = "USERNAME";
pub const ENV_PASSWORD: &str = "PASSWORD";

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub mongodb: MongoConfig,
    #[serde(default)]
    pub neo4j: Neo4jConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MongoConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: None,
            database: None,
            collection: default_collection(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Neo4jConfig {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn default_port() -> String {
    "8000".to_string()
}

fn default_collection() -> String {
    "movies".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    /// Load the optional config file, then apply `.env` and the process
    /// environment on top of it. Variables already set in the environment
    /// win over `.env`.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ConfigError::DotEnv(e));
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_MONGODB_URL) {
            self.mongodb.url = Some(url);
        }
        if let Some(name) = lookup(ENV_MONGODB_NAME) {
            self.mongodb.database = Some(name);
        }
        if let Some(uri) = lookup(ENV_BOLT_URI) {
            self.neo4j.uri = Some(uri);
        }
        if let Some(username) = lookup(ENV_USERNAME) {
            self.neo4j.username = Some(username);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.neo4j.password = Some(password);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mongodb_url()?;
        self.mongodb_database()?;
        self.neo4j_uri()?;
        Ok(())
    }

    pub fn mongodb_url(&self) -> Result<&str, ConfigError> {
        required(&self.mongodb.url, "mongodb.url", ENV_MONGODB_URL)
    }

    pub fn mongodb_database(&self) -> Result<&str, ConfigError> {
        required(&self.mongodb.database, "mongodb.database", ENV_MONGODB_NAME)
    }

    pub fn neo4j_uri(&self) -> Result<&str, ConfigError> {
        required(&self.neo4j.uri, "neo4j.uri", ENV_BOLT_URI)
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    env: &'static str,
) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::Missing(field, env))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("Failed to load .env file: {0}")]
    DotEnv(dotenvy::Error),
    #[error("Missing {0} (set it in the config file or via {1})")]
    Missing(&'static str, &'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
listen:
  address: 127.0.0.1
  port: "9000"
mongodb:
  url: mongodb://localhost:27017
  database: sample_mflix
neo4j:
  uri: bolt://localhost:7687
  username: neo4j
"#
        )
        .unwrap();

        let config = Config::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.listen.address.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.listen.port, "9000");
        assert_eq!(config.mongodb.database.as_deref(), Some("sample_mflix"));
        assert_eq!(config.mongodb.collection, "movies");
        assert_eq!(config.neo4j.username.as_deref(), Some("neo4j"));
        assert_eq!(config.neo4j.password, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.listen.port, "8000");
        assert_eq!(config.mongodb.collection, "movies");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("mongodb.url", ENV_MONGODB_URL))
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config: Config =
            serde_yaml::from_str("mongodb:\n  url: mongodb://file\n  database: filedb\n").unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_MONGODB_URL, "mongodb://env"),
            (ENV_BOLT_URI, "bolt://env:7687"),
            (ENV_USERNAME, "neo4j"),
            (ENV_PASSWORD, "secret"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.mongodb.url.as_deref(), Some("mongodb://env"));
        assert_eq!(config.mongodb.database.as_deref(), Some("filedb"));
        assert_eq!(config.neo4j.uri.as_deref(), Some("bolt://env:7687"));
        assert_eq!(config.neo4j.password.as_deref(), Some("secret"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/movie-catalog.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_, _)));
    }
}
