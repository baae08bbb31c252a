pub mod models;
pub mod queries;

use mongodb::{
    bson::{doc, Document},
    Client, Collection, Database,
};

use crate::errors::{QueryError, StepContext};

/// Build a client handle. Only the URI is parsed here; no server is contacted.
pub async fn connect(uri: &str) -> Result<Client, QueryError> {
    Client::with_uri_str(uri).await.step("connect")
}

/// Round trip to the server to verify the connection
pub async fn ping(client: &Client) -> Result<(), QueryError> {
    let admin = client.database("admin");
    admin.run_command(doc! { "ping": 1 }).await.step("ping")?;

    tracing::info!("Successfully connected to MongoDB");
    Ok(())
}

/// Create MongoDB connection
pub async fn create_client(uri: &str) -> Result<Client, QueryError> {
    let client = connect(uri).await?;
    ping(&client).await?;
    Ok(client)
}

/// Get database handle
pub fn get_database(client: &Client, db_name: &str) -> Database {
    client.database(db_name)
}

pub fn books_collection(db: &Database, name: &str) -> Collection<Document> {
    db.collection::<Document>(name)
}
