use mongodb::{
    bson::{doc, Document},
    Collection, Cursor, Database, IndexModel,
};

use super::models::{DeleteOutcome, UpdateOutcome};
use crate::errors::{QueryError, StepContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    fn as_i32(self) -> i32 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }
}

// ----------------------
// Query documents
// ----------------------

pub fn genre_filter(genre: &str) -> Document {
    doc! { "genre": genre }
}

pub fn published_after_filter(year: i32) -> Document {
    doc! { "published_year": { "$gt": year } }
}

pub fn author_filter(author: &str) -> Document {
    doc! { "author": author }
}

pub fn title_filter(title: &str) -> Document {
    doc! { "title": title }
}

pub fn in_stock_published_after_filter(year: i32) -> Document {
    doc! { "in_stock": true, "published_year": { "$gt": year } }
}

pub fn price_update(price: f64) -> Document {
    doc! { "$set": { "price": price } }
}

pub fn summary_projection() -> Document {
    doc! { "title": 1, "author": 1, "price": 1, "_id": 0 }
}

pub fn price_sort(direction: SortDirection) -> Document {
    doc! { "price": direction.as_i32() }
}

pub fn average_price_by_genre_pipeline() -> Vec<Document> {
    vec![doc! { "$group": { "_id": "$genre", "avgPrice": { "$avg": "$price" } } }]
}

/// Authors ordered by number of books, keeping the first `limit`.
/// Ties are returned in whatever order the server's sort produces.
pub fn top_authors_pipeline(limit: i64) -> Vec<Document> {
    vec![
        doc! { "$group": { "_id": "$author", "bookCount": { "$sum": 1 } } },
        doc! { "$sort": { "bookCount": -1 } },
        doc! { "$limit": limit },
    ]
}

pub fn books_by_decade_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": { "$floor": { "$divide": ["$published_year", 10] } },
                "count": { "$sum": 1 }
            }
        },
        doc! {
            "$project": {
                "decade": { "$multiply": ["$_id", 10] },
                "count": 1,
                "_id": 0
            }
        },
        doc! { "$sort": { "decade": 1 } },
    ]
}

pub fn title_index() -> IndexModel {
    IndexModel::builder().keys(doc! { "title": 1 }).build()
}

pub fn author_year_index() -> IndexModel {
    IndexModel::builder()
        .keys(doc! { "author": 1, "published_year": -1 })
        .build()
}

pub fn explain_find_command(collection: &str, filter: Document) -> Document {
    doc! {
        "explain": { "find": collection, "filter": filter },
        "verbosity": "executionStats",
    }
}

// ----------------------
// Operations
// ----------------------

async fn drain(
    mut cursor: Cursor<Document>,
    step: &'static str,
) -> Result<Vec<Document>, QueryError> {
    let mut documents = Vec::new();
    while cursor.advance().await.step(step)? {
        documents.push(cursor.deserialize_current().step(step)?);
    }
    Ok(documents)
}

async fn aggregate(
    collection: &Collection<Document>,
    pipeline: Vec<Document>,
    step: &'static str,
) -> Result<Vec<Document>, QueryError> {
    let cursor = collection.aggregate(pipeline).await.step(step)?;
    drain(cursor, step).await
}

pub async fn find_books(
    collection: &Collection<Document>,
    filter: Document,
    step: &'static str,
) -> Result<Vec<Document>, QueryError> {
    let cursor = collection.find(filter).await.step(step)?;
    drain(cursor, step).await
}

pub async fn count_books(
    collection: &Collection<Document>,
    filter: Document,
) -> Result<u64, QueryError> {
    collection.count_documents(filter).await.step("count")
}

pub async fn update_price(
    collection: &Collection<Document>,
    title: &str,
    price: f64,
) -> Result<UpdateOutcome, QueryError> {
    let result = collection
        .update_one(title_filter(title), price_update(price))
        .await
        .step("update price")?;

    if result.matched_count == 0 {
        tracing::debug!("No book titled {:?} to update", title);
    }

    Ok(UpdateOutcome {
        matched_count: result.matched_count,
        modified_count: result.modified_count,
    })
}

pub async fn delete_by_title(
    collection: &Collection<Document>,
    title: &str,
) -> Result<DeleteOutcome, QueryError> {
    let result = collection.delete_one(title_filter(title)).await.step("delete by title")?;

    if result.deleted_count == 0 {
        tracing::debug!("No book titled {:?} to delete", title);
    }

    Ok(DeleteOutcome {
        deleted_count: result.deleted_count,
    })
}

/// Every book reduced to title, author and price, without `_id`.
pub async fn project_summaries(
    collection: &Collection<Document>,
) -> Result<Vec<Document>, QueryError> {
    let cursor = collection
        .find(doc! {})
        .projection(summary_projection())
        .await
        .step("projection")?;

    drain(cursor, "projection").await
}

pub async fn sorted_by_price(
    collection: &Collection<Document>,
    direction: SortDirection,
) -> Result<Vec<Document>, QueryError> {
    let cursor = collection
        .find(doc! {})
        .sort(price_sort(direction))
        .await
        .step("sort by price")?;

    drain(cursor, "sort by price").await
}

/// One page of the collection in `_id` order.
pub async fn page(
    collection: &Collection<Document>,
    skip: u64,
    limit: i64,
) -> Result<Vec<Document>, QueryError> {
    let cursor = collection
        .find(doc! {})
        .sort(doc! { "_id": 1 })
        .skip(skip)
        .limit(limit)
        .await
        .step("pagination")?;

    drain(cursor, "pagination").await
}

pub async fn average_price_by_genre(
    collection: &Collection<Document>,
) -> Result<Vec<Document>, QueryError> {
    aggregate(collection, average_price_by_genre_pipeline(), "average price by genre").await
}

pub async fn top_author(
    collection: &Collection<Document>,
) -> Result<Option<Document>, QueryError> {
    let mut authors = aggregate(collection, top_authors_pipeline(1), "top author").await?;
    Ok(authors.pop())
}

pub async fn books_by_decade(
    collection: &Collection<Document>,
) -> Result<Vec<Document>, QueryError> {
    aggregate(collection, books_by_decade_pipeline(), "books by decade").await
}

/// Create an index, returning its name. Creating an existing index is a no-op.
pub async fn create_index(
    collection: &Collection<Document>,
    index: IndexModel,
) -> Result<String, QueryError> {
    let result = collection.create_index(index).await.step("create index")?;
    tracing::debug!("Index ready: {}", result.index_name);
    Ok(result.index_name)
}

pub async fn index_names(collection: &Collection<Document>) -> Result<Vec<String>, QueryError> {
    collection.list_index_names().await.step("list indexes")
}

/// Run `explain` with `executionStats` for a find on `collection`.
pub async fn explain_find(
    db: &Database,
    collection: &str,
    filter: Document,
) -> Result<Document, QueryError> {
    db.run_command(explain_find_command(collection, filter)).await.step("explain")
}
