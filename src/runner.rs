use mongodb::{bson::Document, Client, Database};

use crate::config::Config;
use crate::db_mongo::{self, models::*, queries::{self, SortDirection}};
use crate::errors::QueryError;
use crate::report;
use crate::seed;

/// Literal inputs of the query catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueParams {
    pub genre: String,
    pub published_after: i32,
    pub author: String,
    pub update_title: String,
    pub new_price: f64,
    pub delete_title: String,
    pub in_stock_published_after: i32,
    pub page_size: i64,
    pub explain_title: String,
}

impl Default for CatalogueParams {
    fn default() -> Self {
        Self {
            genre: "Fiction".to_string(),
            published_after: 1950,
            author: "George Orwell".to_string(),
            update_title: "1984".to_string(),
            new_price: 15.99,
            delete_title: "Moby Dick".to_string(),
            in_stock_published_after: 2010,
            page_size: 5,
            explain_title: "1984".to_string(),
        }
    }
}

/// Every result the catalogue printed, in step order.
///
/// Query results are the documents exactly as the server returned them.
#[derive(Debug, Clone)]
pub struct CatalogueReport {
    pub seeded: Option<usize>,
    pub by_genre: Vec<Document>,
    pub published_after: Vec<Document>,
    pub by_author: Vec<Document>,
    pub price_update: UpdateOutcome,
    pub deletion: DeleteOutcome,
    pub in_stock_recent: Vec<Document>,
    pub summaries: Vec<Document>,
    pub price_ascending: Vec<Document>,
    pub price_descending: Vec<Document>,
    pub page_one: Vec<Document>,
    pub page_two: Vec<Document>,
    pub average_by_genre: Vec<Document>,
    pub top_author: Option<Document>,
    pub by_decade: Vec<Document>,
    pub title_index: String,
    pub author_year_index: String,
    pub explain: Document,
    pub explain_summary: ExplainSummary,
}

impl CatalogueReport {
    pub fn genre_averages(&self) -> Vec<GenreAveragePrice> {
        self.average_by_genre.iter().map(GenreAveragePrice::from_document).collect()
    }

    pub fn top_author_count(&self) -> Option<AuthorBookCount> {
        self.top_author.as_ref().map(AuthorBookCount::from_document)
    }

    pub fn decade_counts(&self) -> Vec<DecadeCount> {
        self.by_decade.iter().map(DecadeCount::from_document).collect()
    }
}

pub struct QueryRunner {
    config: Config,
    params: CatalogueParams,
}

impl QueryRunner {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            params: CatalogueParams::default(),
        }
    }

    pub fn with_params(mut self, params: CatalogueParams) -> Self {
        self.params = params;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connect, run the whole catalogue, and shut the client down.
    pub async fn run(&self) -> Result<CatalogueReport, QueryError> {
        let client = db_mongo::connect(&self.config.uri).await?;
        self.run_with_client(client).await
    }

    /// Verify the connection, run the catalogue, and shut `client` down.
    ///
    /// Shutdown happens on every exit path, a failed ping included; the
    /// first failure is returned after it completes.
    pub async fn run_with_client(&self, client: Client) -> Result<CatalogueReport, QueryError> {
        let outcome = self.ping_and_run(&client).await;

        client.shutdown().await;
        println!("\nConnection closed");

        if outcome.is_ok() {
            tracing::info!("Query catalogue finished");
        }

        outcome
    }

    async fn ping_and_run(&self, client: &Client) -> Result<CatalogueReport, QueryError> {
        db_mongo::ping(client).await?;
        println!("Connected to MongoDB\n");

        let db = db_mongo::get_database(client, &self.config.database);
        self.run_catalogue(&db).await
    }

    /// Run the catalogue against an already connected database.
    pub async fn run_catalogue(&self, db: &Database) -> Result<CatalogueReport, QueryError> {
        let params = &self.params;
        let books = db_mongo::books_collection(db, &self.config.collection);

        let seeded = if self.config.seed {
            Some(seed::seed_books(&books).await?)
        } else {
            None
        };

        // ----------------------
        // Basic CRUD
        // ----------------------

        let by_genre =
            queries::find_books(&books, queries::genre_filter(&params.genre), "Task 2.1").await?;
        report::print_documents(&format!("Task 2.1 - {} Books", params.genre), &by_genre);

        let published_after = queries::find_books(
            &books,
            queries::published_after_filter(params.published_after),
            "Task 2.2",
        )
        .await?;
        report::print_documents(
            &format!("Task 2.2 - Books after {}", params.published_after),
            &published_after,
        );

        let by_author =
            queries::find_books(&books, queries::author_filter(&params.author), "Task 2.3").await?;
        report::print_documents(&format!("Task 2.3 - Books by {}", params.author), &by_author);

        let price_update =
            queries::update_price(&books, &params.update_title, params.new_price).await?;
        report::print_message(&format!("Task 2.4 - Updated price for {}", params.update_title));
        tracing::debug!(
            "matched={} modified={}",
            price_update.matched_count,
            price_update.modified_count
        );

        let deletion = queries::delete_by_title(&books, &params.delete_title).await?;
        report::print_message(&format!("Task 2.5 - Deleted {}", params.delete_title));
        tracing::debug!("deleted={}", deletion.deleted_count);

        // ----------------------
        // Advanced queries
        // ----------------------

        let in_stock_recent = queries::find_books(
            &books,
            queries::in_stock_published_after_filter(params.in_stock_published_after),
            "Task 3.1",
        )
        .await?;
        report::print_documents(
            &format!("Task 3.1 - In-stock books after {}", params.in_stock_published_after),
            &in_stock_recent,
        );

        let summaries = queries::project_summaries(&books).await?;
        report::print_documents("Task 3.2 - Projection (title, author, price)", &summaries);

        let price_ascending = queries::sorted_by_price(&books, SortDirection::Ascending).await?;
        report::print_documents("Task 3.3 - Books sorted by price ascending", &price_ascending);

        let price_descending = queries::sorted_by_price(&books, SortDirection::Descending).await?;
        report::print_documents("Task 3.3 - Books sorted by price descending", &price_descending);

        let page_size = params.page_size;
        let page_one = queries::page(&books, 0, page_size).await?;
        report::print_documents(
            &format!("Task 3.4 - Page 1 (first {} books)", page_size),
            &page_one,
        );

        let page_two = queries::page(&books, page_size.max(0) as u64, page_size).await?;
        report::print_documents(
            &format!("Task 3.4 - Page 2 (next {} books)", page_size),
            &page_two,
        );

        // ----------------------
        // Aggregation pipelines
        // ----------------------

        let average_by_genre = queries::average_price_by_genre(&books).await?;
        report::print_documents("Task 4.1 - Average price by genre", &average_by_genre);

        let top_author = queries::top_author(&books).await?;
        report::print_document("Task 4.2 - Author with most books", top_author.as_ref());

        let by_decade = queries::books_by_decade(&books).await?;
        report::print_documents("Task 4.3 - Books grouped by decade", &by_decade);

        // ----------------------
        // Indexing
        // ----------------------

        let title_index = queries::create_index(&books, queries::title_index()).await?;
        report::print_message("Task 5.1 - Index created on title");

        let author_year_index = queries::create_index(&books, queries::author_year_index()).await?;
        report::print_message("Task 5.2 - Compound index created on author + published_year");

        let explain = queries::explain_find(
            db,
            &self.config.collection,
            queries::title_filter(&params.explain_title),
        )
        .await?;
        report::print_document("Task 5.3 - Explain output for title search", Some(&explain));

        let explain_summary = ExplainSummary::from_explain(&explain);
        tracing::info!(
            "Title lookup plan: {} (docs examined: {:?})",
            explain_summary.stages.join(" <- "),
            explain_summary.total_docs_examined
        );

        Ok(CatalogueReport {
            seeded,
            by_genre,
            published_after,
            by_author,
            price_update,
            deletion,
            in_stock_recent,
            summaries,
            price_ascending,
            price_descending,
            page_one,
            page_two,
            average_by_genre,
            top_author,
            by_decade,
            title_index,
            author_year_index,
            explain,
            explain_summary,
        })
    }
}
