#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use bookstore_queries::db_mongo;
use bookstore_queries::seed;
use mongodb::{bson::Document, Client, Collection, Database};

pub const TEST_URI_VAR: &str = "MONGODB_TEST_URI";

/// A throwaway database on the test deployment, dropped by [`TestDb::cleanup`].
pub struct TestDb {
    pub uri: String,
    pub client: Client,
    pub db: Database,
}

impl TestDb {
    /// Connect to `MONGODB_TEST_URI`, or return `None` so the caller can skip.
    pub async fn connect(label: &str) -> Option<Self> {
        let Ok(uri) = std::env::var(TEST_URI_VAR) else {
            eprintln!("skipping {}: {} is not set", label, TEST_URI_VAR);
            return None;
        };

        let client = db_mongo::create_client(&uri)
            .await
            .expect("test deployment should be reachable");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let name = format!("bq_{}_{}_{}", label, std::process::id(), nanos);
        let db = client.database(&name);

        Some(Self { uri, client, db })
    }

    pub fn name(&self) -> &str {
        self.db.name()
    }

    pub fn books(&self) -> Collection<Document> {
        db_mongo::books_collection(&self.db, "books")
    }

    pub async fn seeded_books(&self) -> Collection<Document> {
        let books = self.books();
        seed::seed_books(&books).await.expect("seeding should succeed");
        books
    }

    pub async fn cleanup(self) {
        self.db.drop().await.expect("test database should drop");
        self.client.shutdown().await;
    }
}
