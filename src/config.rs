use crate::errors::QueryError;

pub const DEFAULT_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_DATABASE: &str = "plp_bookstore";
pub const DEFAULT_COLLECTION: &str = "books";

/// Connection settings handed to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub uri: String,
    pub database: String,
    pub collection: String,
    /// Reset the collection to the sample data set before running.
    pub seed: bool,
}

impl Config {
    pub fn new(uri: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            collection: DEFAULT_COLLECTION.to_string(),
            seed: false,
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_seed(mut self, seed: bool) -> Self {
        self.seed = seed;
        self
    }

    /// Load configuration from `MONGODB_URI`, `MONGODB_DATABASE`,
    /// `MONGODB_COLLECTION` and `SEED_BOOKS`.
    pub fn from_env() -> Result<Self, QueryError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, QueryError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = required(&lookup, "MONGODB_URI", DEFAULT_URI)?;
        let database = required(&lookup, "MONGODB_DATABASE", DEFAULT_DATABASE)?;
        let collection = required(&lookup, "MONGODB_COLLECTION", DEFAULT_COLLECTION)?;

        let seed = lookup("SEED_BOOKS")
            .unwrap_or_else(|| "false".to_string())
            .trim()
            .to_lowercase() == "true";

        let config = Self {
            uri,
            database,
            collection,
            seed,
        };

        tracing::debug!(
            "Resolved config: database={} collection={} seed={}",
            config.database,
            config.collection,
            config.seed
        );

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_URI, DEFAULT_DATABASE)
    }
}

fn required<F>(lookup: &F, key: &str, default: &str) -> Result<String, QueryError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default.to_string()),
        Some(value) if value.trim().is_empty() => {
            Err(QueryError::Config(format!("{} is set but empty", key)))
        }
        Some(value) => Ok(value.trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_constants() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.uri, "mongodb://localhost:27017");
        assert_eq!(config.database, "plp_bookstore");
        assert_eq!(config.collection, "books");
        assert!(!config.seed);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("MONGODB_URI", "mongodb://db.internal:27018"),
            ("MONGODB_DATABASE", "shop"),
            ("MONGODB_COLLECTION", "inventory"),
            ("SEED_BOOKS", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.uri, "mongodb://db.internal:27018");
        assert_eq!(config.database, "shop");
        assert_eq!(config.collection, "inventory");
        assert!(config.seed);
    }

    #[test]
    fn test_empty_value_rejected() {
        let err = Config::from_lookup(lookup_from(&[("MONGODB_DATABASE", "  ")])).unwrap_err();
        assert!(matches!(err, QueryError::Config(ref msg) if msg.contains("MONGODB_DATABASE")));
    }

    #[test]
    fn test_seed_only_on_true() {
        let config = Config::from_lookup(lookup_from(&[("SEED_BOOKS", "yes")])).unwrap();
        assert!(!config.seed);
    }

    #[test]
    fn test_builder() {
        let config = Config::new("mongodb://localhost:27017", "scratch")
            .with_collection("novels")
            .with_seed(true);
        assert_eq!(config.database, "scratch");
        assert_eq!(config.collection, "novels");
        assert!(config.seed);
    }
}
